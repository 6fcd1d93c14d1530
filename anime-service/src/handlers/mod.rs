//! HTTP routes
//!
//! Every route is declared once in a [`RouteEntry`] table together with the
//! [`Access`] rule that guards it. [`build_router`] folds the table into an
//! axum router, and the same table seeds the [`AccessPolicy`]
//! (see [`access_rules`]), so a route cannot be added without deciding who
//! may call it.
//!
//! [`AccessPolicy`]: crate::middleware::AccessPolicy

pub mod anime;
pub mod extract;

pub use extract::{AnimeBody, JsonBody, PathId};

use axum::{
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    routing::{self, MethodRouter},
    Router,
};

use crate::error::Error;
use crate::health;
use crate::middleware::{detect_blocking, problem_details, Access, BasicAuth, RouteAuthorization};
use crate::state::AppState;

/// One route: where it lives, who may call it, and what serves it
pub struct RouteEntry {
    pub method: Method,
    pub path: &'static str,
    pub access: Access,
    handler: MethodRouter<AppState>,
}

impl RouteEntry {
    pub fn new(
        method: Method,
        path: &'static str,
        access: Access,
        handler: MethodRouter<AppState>,
    ) -> Self {
        Self {
            method,
            path,
            access,
            handler,
        }
    }

    /// Policy pattern and rule, e.g. `("DELETE /anime/{id}", Role("ADMIN"))`
    pub fn rule(&self) -> (String, Access) {
        (format!("{} {}", self.method, self.path), self.access.clone())
    }
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// The anime resource
pub fn anime_routes() -> Vec<RouteEntry> {
    let user = Access::role("USER");
    let admin = Access::role("ADMIN");

    vec![
        RouteEntry::new(Method::GET, "/anime", user, routing::get(anime::list)),
        RouteEntry::new(
            Method::GET,
            "/anime/{id}",
            Access::Authenticated,
            routing::get(anime::get),
        ),
        RouteEntry::new(Method::POST, "/anime", admin.clone(), routing::post(anime::create)),
        RouteEntry::new(
            Method::POST,
            "/anime/batch",
            admin.clone(),
            routing::post(anime::create_batch),
        ),
        RouteEntry::new(Method::PUT, "/anime", admin.clone(), routing::put(anime::replace)),
        RouteEntry::new(
            Method::DELETE,
            "/anime/{id}",
            admin,
            routing::delete(anime::delete),
        ),
    ]
}

/// Liveness and readiness probes
pub fn health_routes() -> Vec<RouteEntry> {
    vec![
        RouteEntry::new(Method::GET, "/health", Access::Public, routing::get(health::health)),
        RouteEntry::new(Method::GET, "/ready", Access::Public, routing::get(health::readiness)),
    ]
}

/// OpenAPI document and Swagger UI
#[cfg(feature = "openapi")]
pub fn docs_routes() -> Vec<RouteEntry> {
    use crate::openapi;

    vec![
        RouteEntry::new(
            Method::GET,
            openapi::OPENAPI_JSON_PATH,
            Access::Public,
            routing::get(openapi::openapi_json),
        ),
        RouteEntry::new(
            Method::GET,
            openapi::SWAGGER_UI_PATH,
            Access::Public,
            routing::get(openapi::swagger_ui),
        ),
    ]
}

/// Every route the service exposes
pub fn route_table() -> Vec<RouteEntry> {
    let mut routes = anime_routes();
    routes.extend(health_routes());
    #[cfg(feature = "openapi")]
    routes.extend(docs_routes());
    routes
}

/// Access rules derived from the route table
pub fn access_rules() -> Vec<(String, Access)> {
    route_table().iter().map(RouteEntry::rule).collect()
}

/// Assemble the application router with authentication, authorization and
/// error-body middleware
///
/// Transport concerns (CORS, compression, timeouts, request ids) are added
/// by [`Server::serve`](crate::server::Server::serve).
pub fn build_router(state: AppState) -> Router {
    let realm = state.config().security.realm.clone();
    let authentication = BasicAuth::new(state.users(), state.hasher().clone(), &realm);
    let authorization = RouteAuthorization::new(state.policy(), &realm);

    let router = route_table()
        .into_iter()
        .fold(Router::new(), |router, entry| {
            tracing::debug!(method = %entry.method, path = entry.path, access = %entry.access, "route");
            router.route(entry.path, entry.handler)
        })
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        // Last added runs first
        .layer(from_fn_with_state(authorization, RouteAuthorization::middleware))
        .layer(from_fn_with_state(authentication, BasicAuth::middleware))
        .layer(from_fn(problem_details));

    let router = if state.config().detect_blocking() {
        tracing::info!("Blocking-call detection enabled");
        router.layer(from_fn(detect_blocking))
    } else {
        router
    };

    router.with_state(state)
}

async fn route_not_found() -> Error {
    Error::RouteNotFound
}

async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_has_a_rule() {
        let rules = access_rules();
        assert_eq!(rules.len(), route_table().len());
        assert!(rules.contains(&("GET /anime".to_string(), Access::role("USER"))));
        assert!(rules.contains(&("GET /anime/{id}".to_string(), Access::Authenticated)));
        assert!(rules.contains(&("DELETE /anime/{id}".to_string(), Access::role("ADMIN"))));
        assert!(rules.contains(&("GET /ready".to_string(), Access::Public)));
    }

    #[test]
    fn test_write_routes_require_admin() {
        for entry in anime_routes() {
            if entry.method != Method::GET {
                assert_eq!(entry.access, Access::role("ADMIN"), "{:?}", entry);
            }
        }
    }
}
