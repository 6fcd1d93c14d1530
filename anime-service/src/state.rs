//! Application state management

use std::sync::Arc;

use crate::auth::PasswordHasher;
use crate::config::Config;
use crate::error::Result;
use crate::handlers;
use crate::middleware::AccessPolicy;
use crate::repository::{AnimeStore, MemoryAnimeStore, MemoryUserStore, UserStore};
use crate::service::{AnimeService, UserLookup, UserService};

/// Application state shared across handlers
///
/// Every field is cheap to clone; services hold their stores behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    animes: AnimeService,
    users: Arc<dyn UserLookup>,
    hasher: PasswordHasher,
    policy: Arc<AccessPolicy>,
}

impl AppState {
    /// Create a new builder for AppState
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn animes(&self) -> &AnimeService {
        &self.animes
    }

    pub fn users(&self) -> Arc<dyn UserLookup> {
        self.users.clone()
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// The compiled route access policy
    pub fn policy(&self) -> Arc<AccessPolicy> {
        self.policy.clone()
    }
}

/// Builder for AppState
///
/// Stores passed explicitly win. Otherwise a configured database supplies
/// both stores (feature `database`), and the in-memory stores are the
/// fallback, with users seeded from `security.users`.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<Config>,
    anime_store: Option<Arc<dyn AnimeStore>>,
    user_store: Option<Arc<dyn UserStore>>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this anime store instead of the configured one
    pub fn anime_store(mut self, store: Arc<dyn AnimeStore>) -> Self {
        self.anime_store = Some(store);
        self
    }

    /// Use this user store instead of the configured one
    pub fn user_store(mut self, store: Arc<dyn UserStore>) -> Self {
        self.user_store = Some(store);
        self
    }

    /// Build the AppState, connecting to the database when one is configured
    pub async fn build(self) -> Result<AppState> {
        let config = self.config.unwrap_or_default();
        #[cfg_attr(not(feature = "database"), allow(unused_mut))]
        let mut anime_store = self.anime_store;
        #[cfg_attr(not(feature = "database"), allow(unused_mut))]
        let mut user_store = self.user_store;

        #[cfg(feature = "database")]
        if let Some(db_config) = &config.database {
            if anime_store.is_none() || user_store.is_none() {
                let pool = crate::database::create_pool(db_config).await?;
                if db_config.run_migrations {
                    crate::database::run_migrations(&pool).await?;
                }
                crate::database::seed_users(&pool, &config.security.users).await?;

                if anime_store.is_none() {
                    anime_store = Some(Arc::new(crate::repository::PgAnimeStore::new(pool.clone())));
                }
                if user_store.is_none() {
                    user_store = Some(Arc::new(crate::repository::PgUserStore::new(pool)));
                }
            }
        }

        let anime_store = anime_store.unwrap_or_else(|| {
            tracing::info!("Using in-memory anime store");
            Arc::new(MemoryAnimeStore::new())
        });
        let user_store = user_store.unwrap_or_else(|| {
            if config.security.users.is_empty() {
                tracing::warn!("No users configured; every protected route will answer 401");
            }
            Arc::new(MemoryUserStore::from_seed(&config.security.users))
        });

        let hasher = PasswordHasher::new(&config.security.password)?;
        let policy =
            AccessPolicy::with_overrides(handlers::access_rules(), &config.security.policies)?;

        Ok(AppState {
            animes: AnimeService::new(anime_store, config.validation.placement),
            users: Arc::new(UserService::new(user_store)),
            hasher,
            policy: Arc::new(policy),
            config: Arc::new(config),
        })
    }
}
