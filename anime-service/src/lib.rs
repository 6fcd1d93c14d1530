//! # anime-service
//!
//! Role-guarded CRUD backend for an anime catalogue, built on axum.
//!
//! ## Features
//!
//! - **Resource**: list, fetch, create, batch-create, replace and delete anime
//! - **Security**: HTTP Basic authentication with Argon2id hashes, per-route role policy
//! - **Storage**: in-memory by default, PostgreSQL with the `database` feature
//! - **Errors**: JSON problem bodies with path and request id
//! - **Operations**: health and readiness probes, request ids, graceful shutdown
//! - **Docs**: OpenAPI document and Swagger UI with the `openapi` feature
//!
//! ## Example
//!
//! ```rust,no_run
//! use anime_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::builder().config(config.clone()).build().await?;
//!     let app = build_router(state);
//!
//!     Server::new(config).serve(app).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod blocking;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod middleware;
pub mod observability;
pub mod repository;
pub mod responses;
pub mod server;
pub mod service;
pub mod state;

#[cfg(feature = "database")]
pub mod database;

#[cfg(feature = "openapi")]
pub mod openapi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::auth::{PasswordHasher, Principal, SecurityConfig, SeedUser};
    pub use crate::blocking::{non_blocking, offload, BlockingOperationError};
    pub use crate::config::{Config, ValidationPlacement};
    pub use crate::domain::{Anime, AnimePayload, AnimeUser, Role};
    pub use crate::error::{Error, ProblemDetails, Result};
    pub use crate::handlers::{anime_routes, build_router, RouteEntry};
    pub use crate::health::{health, readiness};
    pub use crate::ids::{MakeTypedRequestId, RequestId, RequestIdError};
    pub use crate::middleware::{Access, AccessPolicy, BasicAuth, RouteAuthorization};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        AnimeStore, MemoryAnimeStore, MemoryUserStore, RepositoryError, UserStore,
    };
    pub use crate::responses::{Created, NoContent};
    pub use crate::server::Server;
    pub use crate::service::{AnimeService, UserLookup, UserService};
    pub use crate::state::{AppState, AppStateBuilder};

    #[cfg(feature = "database")]
    pub use crate::repository::{PgAnimeStore, PgUserStore};

    #[cfg(feature = "openapi")]
    pub use crate::openapi::ApiDoc;

    pub use axum::{
        extract::{Path, State},
        routing::{delete, get, post, put},
        Json, Router,
    };
}
