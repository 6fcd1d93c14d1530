use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::config::ValidationPlacement;
use crate::domain::Anime;
use crate::error::{Error, Result};
use crate::repository::AnimeStore;

/// Rejection message for a persisted batch item without a name
pub const INVALID_NAME_MESSAGE: &str = "Invalid Name";

/// Business rules over the anime store
///
/// Absence becomes [`Error::NotFound`] and empty names become
/// [`Error::InvalidArgument`]. Store failures pass through unchanged and are
/// never retried here.
#[derive(Clone)]
pub struct AnimeService {
    store: Arc<dyn AnimeStore>,
    placement: ValidationPlacement,
}

impl AnimeService {
    pub fn new(store: Arc<dyn AnimeStore>, placement: ValidationPlacement) -> Self {
        Self { store, placement }
    }

    pub fn placement(&self) -> ValidationPlacement {
        self.placement
    }

    /// Every record in store order; an empty store yields an empty stream
    pub fn list_all(&self) -> BoxStream<'_, Result<Anime>> {
        self.store.find_all().map_err(Error::from).boxed()
    }

    /// The record with `id`, or `NotFound`
    pub async fn find_by_id(&self, id: i64) -> Result<Anime> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(Anime::ENTITY, Anime::COLLECTION, id))
    }

    /// Persist a new record and return it with its assigned id
    ///
    /// Any id on the incoming record is discarded.
    pub async fn create(&self, anime: Anime) -> Result<Anime> {
        self.check_name(&anime)?;

        let saved = self.store.save(anime.with_id(0)).await?;
        tracing::debug!(id = saved.id, "anime created");
        Ok(saved)
    }

    /// Persist each record, then reject the first saved one without a name
    ///
    /// The check runs after the write: records up to and including the
    /// offending one stay committed. The stream stops at the first failure,
    /// and dropping it stops the remaining writes.
    pub fn create_batch(&self, animes: Vec<Anime>) -> BoxStream<'_, Result<Anime>> {
        tracing::debug!(count = animes.len(), "saving anime batch");

        let saved = self
            .store
            .save_all(animes.into_iter().map(|anime| anime.with_id(0)).collect())
            .map_err(Error::from)
            .and_then(|anime| async move {
                if anime.has_name() {
                    Ok(anime)
                } else {
                    tracing::warn!(id = anime.id, "batch item persisted without a name");
                    Err(Error::InvalidArgument(INVALID_NAME_MESSAGE.to_string()))
                }
            });

        stop_after_error(saved.boxed()).boxed()
    }

    /// Replace every field of an existing record except its id
    ///
    /// `anime.id` is only used for the lookup; the stored id is kept.
    pub async fn update(&self, anime: Anime) -> Result<()> {
        self.check_name(&anime)?;

        let existing = self.find_by_id(anime.id).await?;
        let merged = Anime::new(existing.id, anime.name);
        self.store.save(merged).await?;
        tracing::debug!(id = existing.id, "anime updated");
        Ok(())
    }

    /// Remove an existing record
    pub async fn delete(&self, id: i64) -> Result<()> {
        let existing = self.find_by_id(id).await?;
        self.store.delete(&existing).await?;
        tracing::debug!(id, "anime deleted");
        Ok(())
    }

    /// Readiness of the backing store
    pub async fn ping(&self) -> Result<()> {
        Ok(self.store.ping().await?)
    }

    fn check_name(&self, anime: &Anime) -> Result<()> {
        match self.placement {
            ValidationPlacement::Service => anime.validate(),
            ValidationPlacement::Boundary => Ok(()),
        }
    }
}

/// Yield items up to and including the first error, then end without
/// polling the source again
fn stop_after_error<'a, T: Send + 'a>(
    source: BoxStream<'a, Result<T>>,
) -> impl Stream<Item = Result<T>> + Send + 'a {
    stream::unfold(Some(source), |state| async move {
        let mut source = state?;
        let item = source.next().await?;
        let rest = if item.is_ok() { Some(source) } else { None };
        Some((item, rest))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{
        MemoryAnimeStore, RepositoryError, RepositoryOperation, RepositoryResult,
    };
    use async_trait::async_trait;

    fn valid_anime() -> Anime {
        Anime::new(1, "mehedi hasan")
    }

    fn service_with(animes: Vec<Anime>) -> (AnimeService, Arc<MemoryAnimeStore>) {
        let store = Arc::new(MemoryAnimeStore::with_animes(animes));
        let service = AnimeService::new(store.clone(), ValidationPlacement::Boundary);
        (service, store)
    }

    struct FailingStore;

    #[async_trait]
    impl AnimeStore for FailingStore {
        fn find_all(&self) -> BoxStream<'_, RepositoryResult<Anime>> {
            stream::iter([Err(RepositoryError::connection_failed("down"))]).boxed()
        }

        async fn find_by_id(&self, _id: i64) -> RepositoryResult<Option<Anime>> {
            Err(RepositoryError::timeout(RepositoryOperation::FindById, "slow"))
        }

        async fn save(&self, _anime: Anime) -> RepositoryResult<Anime> {
            Err(RepositoryError::database_error(RepositoryOperation::Save, "disk full"))
        }

        async fn delete(&self, _anime: &Anime) -> RepositoryResult<()> {
            Ok(())
        }

        async fn ping(&self) -> RepositoryResult<()> {
            Err(RepositoryError::connection_failed("down"))
        }
    }

    #[tokio::test]
    async fn test_list_all_returns_every_record() {
        let (service, _) = service_with(vec![valid_anime()]);
        let all: Vec<Anime> = service.list_all().try_collect().await.unwrap();
        assert_eq!(all, vec![valid_anime()]);
    }

    #[tokio::test]
    async fn test_list_all_empty_store_is_not_an_error() {
        let (service, _) = service_with(vec![]);
        let all: Vec<Anime> = service.list_all().try_collect().await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_returns_stored_record() {
        let (service, _) = service_with(vec![valid_anime()]);
        assert_eq!(service.find_by_id(1).await.unwrap(), valid_anime());
    }

    #[tokio::test]
    async fn test_find_by_id_absent_is_not_found() {
        let (service, _) = service_with(vec![valid_anime()]);
        for id in [0, 2, 99, -1] {
            let err = service.find_by_id(id).await.unwrap_err();
            assert_eq!(err.resource_path(), Some(format!("/anime/{}", id)));
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let (service, store) = service_with(vec![valid_anime()]);
        let created = service
            .create(Anime::transient("mehedi hasan"))
            .await
            .unwrap();

        assert_eq!(created, Anime::new(2, "mehedi hasan"));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_ignores_client_id() {
        let (service, store) = service_with(vec![valid_anime()]);
        let created = service.create(Anime::new(1, "Overwrite?")).await.unwrap();

        assert_eq!(created.id, 2);
        assert_eq!(store.find_by_id(1).await.unwrap(), Some(valid_anime()));
    }

    #[tokio::test]
    async fn test_create_with_service_placement_rejects_empty_name() {
        let store = Arc::new(MemoryAnimeStore::new());
        let service = AnimeService::new(store.clone(), ValidationPlacement::Service);

        let err = service.create(Anime::transient("")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_with_boundary_placement_trusts_caller() {
        let (service, _) = service_with(vec![]);
        assert!(service.create(Anime::transient("")).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_batch_saves_all() {
        let (service, store) = service_with(vec![]);
        let saved: Vec<Anime> = service
            .create_batch(vec![Anime::transient("a"), Anime::transient("b")])
            .try_collect()
            .await
            .unwrap();

        assert_eq!(saved, vec![Anime::new(1, "a"), Anime::new(2, "b")]);
        assert_eq!(store.len().await, 2);
    }

    // Validation runs after persistence: the invalid item and everything
    // before it are committed when the failure surfaces.
    #[tokio::test]
    async fn test_create_batch_partially_commits_before_failing() {
        let (service, store) = service_with(vec![]);
        let result: Result<Vec<Anime>> = service
            .create_batch(vec![
                Anime::transient("a"),
                Anime::transient(""),
                Anime::transient("c"),
            ])
            .try_collect()
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref msg) if msg == INVALID_NAME_MESSAGE));
        assert_eq!(store.len().await, 2);
        assert_eq!(store.find_by_id(2).await.unwrap(), Some(Anime::new(2, "")));
    }

    #[tokio::test]
    async fn test_create_batch_ends_after_first_failure() {
        let (service, store) = service_with(vec![]);
        let items: Vec<Result<Anime>> = service
            .create_batch(vec![
                Anime::transient(""),
                Anime::transient("b"),
            ])
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_keeps_existing_id() {
        let (service, store) = service_with(vec![valid_anime()]);
        service.update(Anime::new(1, "Naruto")).await.unwrap();

        assert_eq!(store.find_by_id(1).await.unwrap(), Some(Anime::new(1, "Naruto")));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_absent_is_not_found_without_write() {
        let (service, store) = service_with(vec![valid_anime()]);
        let err = service.update(Anime::new(99, "x")).await.unwrap_err();

        assert_eq!(err.resource_path(), Some("/anime/99".to_string()));
        assert_eq!(store.len().await, 1);
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_with_service_placement_validates_before_lookup() {
        let store = Arc::new(MemoryAnimeStore::new());
        let service = AnimeService::new(store, ValidationPlacement::Service);

        let err = service.update(Anime::new(99, "")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_that_record() {
        let (service, store) =
            service_with(vec![valid_anime(), Anime::new(2, "Bleach")]);
        service.delete(1).await.unwrap();

        assert!(store.find_by_id(1).await.unwrap().is_none());
        assert!(store.find_by_id(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_absent_is_not_found_without_write() {
        let (service, store) = service_with(vec![valid_anime()]);
        let err = service.delete(5).await.unwrap_err();

        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_failures_surface_unchanged() {
        let service = AnimeService::new(Arc::new(FailingStore), ValidationPlacement::Boundary);

        let err = service.find_by_id(1).await.unwrap_err();
        assert!(matches!(err, Error::Repository(ref e) if e.is_retriable()));

        let err = service.create(valid_anime()).await.unwrap_err();
        assert!(matches!(err, Error::Repository(ref e) if e.message == "disk full"));

        let listed: Result<Vec<Anime>> = service.list_all().try_collect().await;
        assert!(matches!(listed, Err(Error::Repository(_))));

        assert!(service.ping().await.is_err());
    }
}
