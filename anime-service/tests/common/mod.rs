#![allow(dead_code)]

use std::sync::Arc;

use anime_service::auth::{PasswordConfig, PasswordHasher, SeedUser};
use anime_service::config::{Config, ValidationPlacement};
use anime_service::domain::Anime;
use anime_service::handlers::build_router;
use anime_service::repository::MemoryAnimeStore;
use anime_service::server::Server;
use anime_service::state::AppState;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

/// A running app plus a handle on its store
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryAnimeStore>,
}

impl TestApp {
    pub async fn new(animes: Vec<Anime>) -> Self {
        Self::with_placement(animes, ValidationPlacement::Boundary).await
    }

    /// Full stack: transport middleware, auth, blocking detection on
    pub async fn with_placement(animes: Vec<Anime>, placement: ValidationPlacement) -> Self {
        let mut config = Config::default();
        config.validation.placement = placement;
        config.middleware.detect_blocking = Some(true);
        config.security.password = PasswordConfig {
            memory_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
            min_password_length: 8,
        };

        let hash = PasswordHasher::new(&config.security.password)
            .unwrap()
            .hash(PASSWORD)
            .unwrap();
        config.security.users = vec![
            SeedUser {
                username: "admin".to_string(),
                name: Some("Administrator".to_string()),
                password_hash: hash.clone(),
                roles: vec!["ADMIN".to_string(), "USER".to_string()],
            },
            SeedUser {
                username: "user".to_string(),
                name: None,
                password_hash: hash,
                roles: vec!["USER".to_string()],
            },
        ];

        let store = Arc::new(MemoryAnimeStore::with_animes(animes));
        let state = AppState::builder()
            .config(config.clone())
            .anime_store(store.clone())
            .build()
            .await
            .unwrap();

        let router = Server::new(config).apply_middleware(build_router(state));
        Self { router, store }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// Build a request, optionally authenticated as `user` with [`PASSWORD`]
pub fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, basic(user, PASSWORD));
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
