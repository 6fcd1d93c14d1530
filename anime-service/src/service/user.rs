use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::Credentials;
use crate::error::{Error, Result};
use crate::repository::UserStore;

/// Resolves a username to what authentication needs
///
/// Implementations only supply the record; hashing and comparison happen
/// in the authentication layer.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Fails with `NotFound` for an unknown username
    async fn find_credentials(&self, username: &str) -> Result<Credentials>;
}

/// [`UserLookup`] backed by a [`UserStore`]
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserLookup for UserService {
    async fn find_credentials(&self, username: &str) -> Result<Credentials> {
        self.store
            .find_by_username(username)
            .await?
            .map(|user| user.credentials())
            .ok_or_else(|| Error::not_found("User", "users", username))
    }
}
