//! Anime endpoints

use axum::{extract::State, Json};
use futures::TryStreamExt;

use super::extract::{AnimeBody, JsonBody, PathId};
use crate::domain::{Anime, AnimePayload};
use crate::error::Result;
#[cfg(feature = "openapi")]
use crate::error::ProblemDetails;
use crate::responses::{Created, NoContent};
use crate::state::AppState;

/// `GET /anime`
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/anime",
    tag = "anime",
    responses(
        (status = 200, description = "Every anime in id order", body = Vec<Anime>),
        (status = 401, description = "Missing or invalid credentials", body = ProblemDetails),
        (status = 403, description = "Caller lacks the USER role", body = ProblemDetails),
    ),
    security(("basic_auth" = []))
))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Anime>>> {
    let animes = state.animes().list_all().try_collect().await?;
    Ok(Json(animes))
}

/// `GET /anime/{id}`
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/anime/{id}",
    tag = "anime",
    params(("id" = i64, Path, description = "Anime id")),
    responses(
        (status = 200, description = "The anime", body = Anime),
        (status = 400, description = "Non-numeric id", body = ProblemDetails),
        (status = 401, description = "Missing or invalid credentials", body = ProblemDetails),
        (status = 404, description = "No anime with this id", body = ProblemDetails),
    ),
    security(("basic_auth" = []))
))]
pub async fn get(State(state): State<AppState>, PathId(id): PathId) -> Result<Json<Anime>> {
    Ok(Json(state.animes().find_by_id(id).await?))
}

/// `POST /anime`
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/anime",
    tag = "anime",
    request_body = AnimePayload,
    responses(
        (status = 201, description = "Saved with its assigned id", body = Anime,
            headers(("Location" = String, description = "Path of the new anime"))),
        (status = 400, description = "Missing or empty name", body = ProblemDetails),
        (status = 401, description = "Missing or invalid credentials", body = ProblemDetails),
        (status = 403, description = "Caller lacks the ADMIN role", body = ProblemDetails),
    ),
    security(("basic_auth" = []))
))]
pub async fn create(
    State(state): State<AppState>,
    AnimeBody(anime): AnimeBody,
) -> Result<Created<Anime>> {
    let saved = state.animes().create(anime).await?;
    let location = format!("/{}/{}", Anime::COLLECTION, saved.id);
    Ok(Created::new(saved).with_location(location))
}

/// `POST /anime/batch`
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/anime/batch",
    tag = "anime",
    request_body = Vec<AnimePayload>,
    responses(
        (status = 201, description = "Every saved anime in request order", body = Vec<Anime>),
        (status = 400, description = "An item has a missing or empty name", body = ProblemDetails),
        (status = 401, description = "Missing or invalid credentials", body = ProblemDetails),
        (status = 403, description = "Caller lacks the ADMIN role", body = ProblemDetails),
    ),
    security(("basic_auth" = []))
))]
///
/// Items are persisted before their names are checked; see
/// [`AnimeService::create_batch`](crate::service::AnimeService::create_batch).
pub async fn create_batch(
    State(state): State<AppState>,
    JsonBody(payloads): JsonBody<Vec<AnimePayload>>,
) -> Result<Created<Vec<Anime>>> {
    let animes = payloads.into_iter().map(Anime::from).collect();
    let saved = state.animes().create_batch(animes).try_collect().await?;
    Ok(Created::new(saved))
}

/// `PUT /anime`
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/anime",
    tag = "anime",
    request_body = AnimePayload,
    responses(
        (status = 204, description = "Name replaced"),
        (status = 400, description = "Missing or empty name", body = ProblemDetails),
        (status = 401, description = "Missing or invalid credentials", body = ProblemDetails),
        (status = 403, description = "Caller lacks the ADMIN role", body = ProblemDetails),
        (status = 404, description = "No anime with this id", body = ProblemDetails),
    ),
    security(("basic_auth" = []))
))]
pub async fn replace(
    State(state): State<AppState>,
    AnimeBody(anime): AnimeBody,
) -> Result<NoContent> {
    state.animes().update(anime).await?;
    Ok(NoContent)
}

/// `DELETE /anime/{id}`
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/anime/{id}",
    tag = "anime",
    params(("id" = i64, Path, description = "Anime id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Non-numeric id", body = ProblemDetails),
        (status = 401, description = "Missing or invalid credentials", body = ProblemDetails),
        (status = 403, description = "Caller lacks the ADMIN role", body = ProblemDetails),
        (status = 404, description = "No anime with this id", body = ProblemDetails),
    ),
    security(("basic_auth" = []))
))]
pub async fn delete(State(state): State<AppState>, PathId(id): PathId) -> Result<NoContent> {
    state.animes().delete(id).await?;
    Ok(NoContent)
}
