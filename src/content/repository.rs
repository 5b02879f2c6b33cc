use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::cache::ListCache;
use super::entity::{Entity, Orderable};
use super::model::{Intent, OrderUpdate};
use super::ordering::renumber;
use super::run_blocking;
use crate::error::ContentError;
use crate::storage::{Storage, StorageTx, StorageWrite};

/// Typed CRUD for one content collection.
///
/// Validation runs before the store is touched. Writes run in a single store
/// transaction and, once committed, invalidate the registered [`ListCache`].
pub struct Repository<S, E> {
    storage: Arc<S>,
    cache: Option<ListCache<E>>,
    revision: Arc<AtomicU64>,
    _entity: PhantomData<fn() -> E>,
}

impl<S, E> Clone for Repository<S, E> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            cache: self.cache.clone(),
            revision: self.revision.clone(),
            _entity: PhantomData,
        }
    }
}

impl<S, E> Repository<S, E>
where
    S: Storage + Send + Sync + 'static,
    E: Entity,
{
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            cache: None,
            revision: Arc::new(AtomicU64::new(0)),
            _entity: PhantomData,
        }
    }

    pub fn with_cache(mut self, cache: ListCache<E>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Number of committed writes made through this repository and its clones.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Fresh list straight from the store.
    pub async fn list(&self) -> Result<Vec<E>, ContentError> {
        let storage = self.storage.clone();
        run_blocking(move || E::list(storage.as_ref()).map_err(ContentError::store)).await
    }

    /// List served from the cache while it is fresh.
    pub async fn cached_list(&self) -> Result<Vec<E>, ContentError> {
        let Some(cache) = &self.cache else {
            return self.list().await;
        };
        if let Some(items) = cache.fresh() {
            return Ok(items.as_ref().clone());
        }
        let generation = cache.generation();
        let items = self.list().await?;
        if !cache.store(generation, items.clone()) {
            log::debug!("discarding {} list loaded before a write", E::KIND);
        }
        Ok(items)
    }

    pub async fn get(&self, id: i64) -> Result<E, ContentError> {
        let storage = self.storage.clone();
        run_blocking(move || {
            E::load(storage.as_ref(), id)
                .map_err(ContentError::store)?
                .ok_or(ContentError::NotFound { kind: E::KIND, id })
        })
        .await
    }

    pub async fn count(&self) -> Result<u64, ContentError> {
        let storage = self.storage.clone();
        run_blocking(move || storage.count(E::KIND).map_err(ContentError::store)).await
    }

    pub async fn create(&self, draft: E::Draft) -> Result<E, ContentError> {
        let draft = E::validate(draft, Intent::Create)?;
        let storage = self.storage.clone();
        let created = run_blocking(move || {
            let tx = storage.begin_tx().map_err(ContentError::store)?;
            let id = E::insert(&tx, &draft).map_err(ContentError::store)?;
            let row = E::load(&tx, id)
                .map_err(ContentError::store)?
                .ok_or(ContentError::NotFound { kind: E::KIND, id })?;
            tx.commit().map_err(ContentError::store)?;
            Ok(row)
        })
        .await?;

        self.written();
        log::info!("➕ created {} {}", E::KIND, created.id());
        Ok(created)
    }

    pub async fn update(&self, id: i64, draft: E::Draft) -> Result<E, ContentError> {
        let draft = E::validate(draft, Intent::Update)?;
        let storage = self.storage.clone();
        let updated = run_blocking(move || {
            let tx = storage.begin_tx().map_err(ContentError::store)?;
            if !E::replace(&tx, id, &draft).map_err(ContentError::store)? {
                return Err(ContentError::NotFound { kind: E::KIND, id });
            }
            let row = E::load(&tx, id)
                .map_err(ContentError::store)?
                .ok_or(ContentError::NotFound { kind: E::KIND, id })?;
            tx.commit().map_err(ContentError::store)?;
            Ok(row)
        })
        .await?;

        self.written();
        log::info!("✏️ updated {} {}", E::KIND, id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ContentError> {
        let storage = self.storage.clone();
        run_blocking(move || {
            let tx = storage.begin_tx().map_err(ContentError::store)?;
            if !tx.delete(E::KIND, id).map_err(ContentError::store)? {
                return Err(ContentError::NotFound { kind: E::KIND, id });
            }
            tx.commit().map_err(ContentError::store)
        })
        .await?;

        self.written();
        log::info!("🗑️ deleted {} {}", E::KIND, id);
        Ok(())
    }

    fn written(&self) {
        self.revision.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = &self.cache {
            cache.invalidate();
        }
    }
}

impl<S, E> Repository<S, E>
where
    S: Storage + Send + Sync + 'static,
    E: Orderable,
{
    /// Renumbers the given ids `0..N-1` in the order given. `ids` must name
    /// every row of the collection exactly once.
    pub async fn reorder(&self, ids: Vec<i64>) -> Result<(), ContentError> {
        self.apply_order(renumber(&ids)).await
    }

    /// Writes a batch of display orders in one transaction.
    ///
    /// The batch has to cover the whole collection with orders `0..N-1`. An id
    /// the store does not hold fails with `NotFound`, a row left out fails
    /// validation; either way nothing is written.
    pub async fn apply_order(&self, updates: Vec<OrderUpdate>) -> Result<(), ContentError> {
        check_dense(&updates)?;
        let count = updates.len();
        let storage = self.storage.clone();
        run_blocking(move || {
            let tx = storage.begin_tx().map_err(ContentError::store)?;
            let mut left_out: HashSet<i64> = E::list(&tx)
                .map_err(ContentError::store)?
                .iter()
                .map(Entity::id)
                .collect();
            for update in updates {
                if !tx
                    .set_display_order(E::KIND, update)
                    .map_err(ContentError::store)?
                {
                    return Err(ContentError::NotFound {
                        kind: E::KIND,
                        id: update.id,
                    });
                }
                left_out.remove(&update.id);
            }
            if !left_out.is_empty() {
                let mut missing: Vec<i64> = left_out.into_iter().collect();
                missing.sort_unstable();
                return Err(ContentError::validation(
                    "ids",
                    format!("order must list every {}; missing {missing:?}", E::KIND),
                ));
            }
            tx.commit().map_err(ContentError::store)
        })
        .await?;

        self.written();
        log::info!("↕️ reordered {} {} rows", count, E::KIND);
        Ok(())
    }
}

/// Ids appear once and the orders are exactly `0..N-1`.
fn check_dense(updates: &[OrderUpdate]) -> Result<(), ContentError> {
    let mut seen = HashSet::with_capacity(updates.len());
    if let Some(dup) = updates.iter().find(|u| !seen.insert(u.id)) {
        return Err(ContentError::validation(
            "ids",
            format!("id {} appears more than once", dup.id),
        ));
    }
    let mut orders: Vec<i64> = updates.iter().map(|u| u.display_order).collect();
    orders.sort_unstable();
    if orders.iter().zip(0..).any(|(order, want)| *order != want) {
        return Err(ContentError::validation(
            "display_order",
            "display orders must run 0..N-1 without gaps",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Experience, ExperienceDraft, Project, ProjectDraft, Skills};
    use crate::storage::MemoryStorage;
    use std::time::Duration;

    fn experiences(storage: &MemoryStorage) -> Repository<MemoryStorage, Experience> {
        Repository::new(Arc::new(storage.clone()))
    }

    fn projects(storage: &MemoryStorage) -> Repository<MemoryStorage, Project> {
        Repository::new(Arc::new(storage.clone()))
    }

    fn job(period: &str) -> ExperienceDraft {
        ExperienceDraft {
            period: period.into(),
            company: "Digital Agency".into(),
            job_title: "Frontend Developer".into(),
            ..Default::default()
        }
    }

    fn project(title: &str, skills: &str) -> ProjectDraft {
        ProjectDraft {
            title: title.into(),
            description: "desc".into(),
            image: Some("/placeholder.svg".into()),
            skills: Skills::parse(skills),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_then_list_round_trips_skills_in_order() {
        let storage = MemoryStorage::new();
        let repo = projects(&storage);
        let created = repo
            .create(project("Smart Attendance", "Python,OpenCV,Computer Vision"))
            .await
            .unwrap();
        assert_eq!(created.display_order, 0);

        let listed = repo.list().await.unwrap();
        assert_eq!(listed, vec![created]);
        assert_eq!(
            listed[0].skills.as_slice(),
            ["Python", "OpenCV", "Computer Vision"]
        );
    }

    #[tokio::test]
    async fn validation_failure_never_touches_store() {
        let storage = MemoryStorage::new();
        let repo = projects(&storage);

        let err = repo.create(project("  ", "A")).await.unwrap_err();
        assert!(matches!(err, ContentError::Validation { field: "title", .. }));
        let err = repo.update(1, project("X", " , ")).await.unwrap_err();
        assert!(matches!(err, ContentError::Validation { field: "skills", .. }));

        assert_eq!(storage.operations(), 0);
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_id_are_not_found() {
        let storage = MemoryStorage::new();
        let repo = experiences(&storage);

        let err = repo.update(42, job("2020")).await.unwrap_err();
        assert_eq!(
            err,
            ContentError::NotFound {
                kind: crate::content::ContentKind::Experience,
                id: 42
            }
        );
        assert!(repo.delete(42).await.unwrap_err().is_not_found());
        assert!(repo.get(42).await.unwrap_err().is_not_found());
        assert_eq!(repo.revision(), 0);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_identity() {
        let storage = MemoryStorage::new();
        let repo = experiences(&storage);
        let created = repo.create(job("2021 - 2022")).await.unwrap();

        let mut draft = job("2021 - 2023");
        draft.description = Some("Built responsive web applications".into());
        let updated = repo.update(created.id, draft).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.period, "2021 - 2023");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn reorder_with_current_order_is_idempotent() {
        let storage = MemoryStorage::new();
        let repo = experiences(&storage);
        for period in ["a", "b", "c"] {
            repo.create(job(period)).await.unwrap();
        }
        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|e| e.id).collect();

        repo.reorder(ids.clone()).await.unwrap();
        let first: Vec<(i64, i64)> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|e| (e.id, e.display_order))
            .collect();
        repo.reorder(ids.clone()).await.unwrap();
        let second: Vec<(i64, i64)> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|e| (e.id, e.display_order))
            .collect();

        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            ids
        );
        assert_eq!(
            first.iter().map(|(_, order)| *order).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn reorder_with_unknown_id_writes_nothing() {
        let storage = MemoryStorage::new();
        let repo = experiences(&storage);
        let a = repo
            .create(ExperienceDraft {
                display_order: Some(5),
                ..job("a")
            })
            .await
            .unwrap();

        let err = repo.reorder(vec![a.id, 999]).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(repo.get(a.id).await.unwrap().display_order, 5);
    }

    fn orders(rows: &[Experience]) -> Vec<(i64, i64)> {
        rows.iter().map(|e| (e.id, e.display_order)).collect()
    }

    #[tokio::test]
    async fn reorder_of_partial_list_writes_nothing() {
        let storage = MemoryStorage::new();
        let repo = experiences(&storage);
        for (i, period) in ["a", "b", "c"].into_iter().enumerate() {
            repo.create(ExperienceDraft {
                display_order: Some(i as i64),
                ..job(period)
            })
            .await
            .unwrap();
        }
        let before = repo.list().await.unwrap();

        let err = repo.reorder(vec![before[2].id]).await.unwrap_err();
        assert!(matches!(err, ContentError::Validation { field: "ids", .. }));
        assert_eq!(orders(&repo.list().await.unwrap()), orders(&before));
        assert_eq!(repo.revision(), 3);
    }

    #[tokio::test]
    async fn apply_order_rejects_gaps_before_touching_store() {
        let storage = MemoryStorage::new();
        let repo = experiences(&storage);
        let err = repo
            .apply_order(vec![
                OrderUpdate { id: 1, display_order: 0 },
                OrderUpdate { id: 2, display_order: 2 },
            ])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContentError::Validation {
                field: "display_order",
                ..
            }
        ));
        assert_eq!(storage.operations(), 0);
    }

    #[tokio::test]
    async fn reorder_rejects_duplicate_ids() {
        let storage = MemoryStorage::new();
        let repo = experiences(&storage);
        let err = repo.reorder(vec![1, 1]).await.unwrap_err();
        assert!(matches!(err, ContentError::Validation { field: "ids", .. }));
        assert_eq!(storage.operations(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_store_unavailable() {
        let storage = MemoryStorage::new();
        storage.set_unavailable(true);
        let err = experiences(&storage).list().await.unwrap_err();
        assert!(matches!(err, ContentError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn cached_list_is_invalidated_by_writes() {
        let storage = MemoryStorage::new();
        let repo = experiences(&storage).with_cache(ListCache::new(Duration::from_secs(300)));

        assert!(repo.cached_list().await.unwrap().is_empty());
        let ops = storage.operations();
        assert!(repo.cached_list().await.unwrap().is_empty());
        assert_eq!(storage.operations(), ops, "second read served from cache");

        repo.create(job("2024")).await.unwrap();
        assert_eq!(repo.cached_list().await.unwrap().len(), 1);
    }
}
