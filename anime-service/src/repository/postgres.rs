//! PostgreSQL stores
//!
//! Tables are created by [`crate::database::MIGRATOR`].

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::PgPool;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{AnimeStore, RepositoryResult, UserStore};
use crate::domain::{Anime, AnimeUser};

/// Anime records in the `anime` table
#[derive(Debug, Clone)]
pub struct PgAnimeStore {
    pool: PgPool,
}

impl PgAnimeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnimeStore for PgAnimeStore {
    fn find_all(&self) -> BoxStream<'_, RepositoryResult<Anime>> {
        sqlx::query_as::<_, Anime>("SELECT id, name FROM anime ORDER BY id")
            .fetch(&self.pool)
            .map(|row| row.map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::FindAll, e)))
            .boxed()
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Anime>> {
        sqlx::query_as::<_, Anime>("SELECT id, name FROM anime WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_sqlx(RepositoryOperation::FindById, e)
                    .with_entity(Anime::ENTITY, id.to_string())
            })
    }

    async fn save(&self, anime: Anime) -> RepositoryResult<Anime> {
        let query = if anime.is_transient() {
            sqlx::query_as::<_, Anime>("INSERT INTO anime (name) VALUES ($1) RETURNING id, name")
                .bind(anime.name)
        } else {
            sqlx::query_as::<_, Anime>(
                "INSERT INTO anime (id, name) VALUES ($1, $2) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name \
                 RETURNING id, name",
            )
            .bind(anime.id)
            .bind(anime.name)
        };

        query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::Save, e))
    }

    async fn delete(&self, anime: &Anime) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM anime WHERE id = $1")
            .bind(anime.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_sqlx(RepositoryOperation::Delete, e)
                    .with_entity(Anime::ENTITY, anime.id.to_string())
            })?;
        Ok(())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::Ping, e))?;
        Ok(())
    }
}

/// User accounts in the `anime_user` table
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<AnimeUser>> {
        sqlx::query_as::<_, AnimeUser>(
            "SELECT id, name, username, password, authorities FROM anime_user WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::FindByUsername, e))
    }
}
