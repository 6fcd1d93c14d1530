//! Request extractors that reject with problem-detail bodies
//!
//! axum's own rejections answer with plain text; these wrap them so a
//! malformed body or path parameter produces the same JSON error shape as
//! every other failure.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::config::ValidationPlacement;
use crate::domain::{Anime, AnimePayload};
use crate::error::Error;
use crate::state::AppState;

/// JSON body
///
/// Unparseable or mistyped input becomes [`Error::BadRequest`]; a missing
/// content type (415) or an oversized body (413) keeps its own status.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(json_rejection)?;
        Ok(Self(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> Error {
    match rejection.status() {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Error::BadRequest(rejection.body_text())
        }
        status => Error::Rejected {
            status,
            message: rejection.body_text(),
        },
    }
}

/// A single anime from the request body
///
/// With `validation.placement = "boundary"` a missing, null or empty name is
/// rejected here, before the service is called.
#[derive(Debug, Clone)]
pub struct AnimeBody(pub Anime);

impl FromRequest<AppState> for AnimeBody {
    type Rejection = Error;

    async fn from_request(request: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let JsonBody(payload) = JsonBody::<AnimePayload>::from_request(request, state).await?;

        if state.animes().placement() == ValidationPlacement::Boundary {
            payload.validate()?;
        }

        Ok(Self(payload.into_anime()))
    }
}

/// Numeric `{id}` path parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
        Ok(Self(id))
    }
}
