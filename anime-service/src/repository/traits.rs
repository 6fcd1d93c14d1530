//! Store traits
//!
//! Both traits are object safe so the service layer can hold an
//! `Arc<dyn AnimeStore>` and swap backends at startup.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use super::error::RepositoryError;
use crate::domain::{Anime, AnimeUser};

/// Result type for store operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// The anime collection
#[async_trait]
pub trait AnimeStore: Send + Sync {
    /// Stream every record in store iteration order
    ///
    /// Nothing is read until the stream is first polled.
    fn find_all(&self) -> BoxStream<'_, RepositoryResult<Anime>>;

    /// Find a record by id
    ///
    /// Returns `Ok(None)` when no record has that id.
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Anime>>;

    /// Insert or update one record
    ///
    /// A transient record (id 0) is inserted under a fresh id; any other id
    /// is written in place, replacing what was stored there.
    async fn save(&self, anime: Anime) -> RepositoryResult<Anime>;

    /// Save a sequence of records one at a time
    ///
    /// Each record is written when the stream is polled for it, so dropping
    /// the stream stops the remaining writes. Earlier writes stay committed.
    fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'_, RepositoryResult<Anime>> {
        stream::iter(animes)
            .then(move |anime| self.save(anime))
            .boxed()
    }

    /// Remove a record; removing an absent record is not an error
    async fn delete(&self, anime: &Anime) -> RepositoryResult<()>;

    /// Check the backing store is reachable
    async fn ping(&self) -> RepositoryResult<()>;
}

/// User accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<AnimeUser>>;
}
