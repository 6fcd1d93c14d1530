//! OpenAPI document and Swagger UI
//!
//! The document is generated from the handler annotations in
//! [`handlers::anime`](crate::handlers::anime). Both routes are public and
//! are registered through [`docs_routes`](crate::handlers::docs_routes).

use std::sync::Arc;

use axum::{
    extract::Path,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use crate::domain::{Anime, AnimePayload};
use crate::error::{Error, ProblemDetails};
use crate::handlers::anime;

/// Where the JSON document is served
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Swagger UI assets, e.g. `/swagger-ui/index.html`
pub const SWAGGER_UI_PATH: &str = "/swagger-ui/{*file}";

/// Name of the HTTP Basic scheme referenced by every anime operation
pub const BASIC_AUTH_SCHEME: &str = "basic_auth";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "anime-service",
        description = "Role-guarded CRUD backend for an anime catalogue"
    ),
    paths(
        anime::list,
        anime::get,
        anime::create,
        anime::create_batch,
        anime::replace,
        anime::delete,
    ),
    components(schemas(Anime, AnimePayload, ProblemDetails)),
    modifiers(&BasicSecurity),
    tags((name = "anime", description = "Anime catalogue"))
)]
pub struct ApiDoc;

struct BasicSecurity;

impl Modify for BasicSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi
            .components
            .get_or_insert_with(Default::default)
            .add_security_scheme(
                BASIC_AUTH_SCHEME,
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
    }
}

/// `GET /api-docs/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// `GET /swagger-ui/{*file}`
pub async fn swagger_ui(Path(file): Path<String>) -> Response {
    let config = Arc::new(utoipa_swagger_ui::Config::new([OPENAPI_JSON_PATH]));

    match utoipa_swagger_ui::serve(&file, config) {
        Ok(Some(asset)) => (
            [(header::CONTENT_TYPE, asset.content_type)],
            asset.bytes.into_owned(),
        )
            .into_response(),
        Ok(None) => Error::RouteNotFound.into_response(),
        Err(e) => Error::Internal(format!("Swagger UI asset '{}' failed: {}", file, e))
            .into_response(),
    }
}
