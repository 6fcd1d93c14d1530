//! In-memory stores
//!
//! Used when no database is configured, and by the test suite.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::traits::{AnimeStore, RepositoryResult, UserStore};
use crate::auth::SeedUser;
use crate::domain::{Anime, AnimeUser, Role};

/// Anime records held in an id-ordered map
///
/// Ids are handed out from a counter that never goes backwards, so a deleted
/// id is never reused.
#[derive(Debug)]
pub struct MemoryAnimeStore {
    animes: RwLock<BTreeMap<i64, Anime>>,
    next_id: AtomicI64,
}

impl Default for MemoryAnimeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAnimeStore {
    pub fn new() -> Self {
        Self {
            animes: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Start with the given records; transient ones get fresh ids
    pub fn with_animes(animes: impl IntoIterator<Item = Anime>) -> Self {
        let mut store = Self::new();
        let mut map = BTreeMap::new();
        for anime in animes {
            let anime = store.assign_id(anime);
            map.insert(anime.id, anime);
        }
        store.animes = RwLock::new(map);
        store
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.animes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.animes.read().await.is_empty()
    }

    fn assign_id(&self, anime: Anime) -> Anime {
        if anime.is_transient() {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            anime.with_id(id)
        } else {
            self.next_id.fetch_max(anime.id.saturating_add(1), Ordering::SeqCst);
            anime
        }
    }
}

#[async_trait]
impl AnimeStore for MemoryAnimeStore {
    fn find_all(&self) -> BoxStream<'_, RepositoryResult<Anime>> {
        stream::once(async move {
            let snapshot: Vec<Anime> = self.animes.read().await.values().cloned().collect();
            stream::iter(snapshot.into_iter().map(Ok))
        })
        .flatten()
        .boxed()
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Anime>> {
        Ok(self.animes.read().await.get(&id).cloned())
    }

    async fn save(&self, anime: Anime) -> RepositoryResult<Anime> {
        let anime = self.assign_id(anime);
        self.animes.write().await.insert(anime.id, anime.clone());
        tracing::trace!(id = anime.id, "saved anime");
        Ok(anime)
    }

    async fn delete(&self, anime: &Anime) -> RepositoryResult<()> {
        self.animes.write().await.remove(&anime.id);
        Ok(())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

/// User accounts keyed by username
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, AnimeUser>>,
}

impl MemoryUserStore {
    pub fn new(users: impl IntoIterator<Item = AnimeUser>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    /// Build from the `security.users` configuration list
    pub fn from_seed(seed: &[SeedUser]) -> Self {
        Self::new(seed.iter().zip(1..).map(|(user, id)| {
            let roles: Vec<Role> = user.roles.iter().map(Role::new).collect();
            AnimeUser {
                id,
                name: user.name.clone().unwrap_or_else(|| user.username.clone()),
                username: user.username.clone(),
                password: user.password_hash.clone(),
                authorities: AnimeUser::authorities_from(&roles),
            }
        }))
    }

    /// Add or replace a user
    pub async fn insert(&self, user: AnimeUser) {
        self.users.write().await.insert(user.username.clone(), user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<AnimeUser>> {
        Ok(self.users.read().await.get(username).cloned())
    }
}
