//! Operator-facing console over the three collections.
//!
//! Each collection keeps the last list the store confirmed. Writes require a
//! logged-in session, run one at a time per collection and end with a
//! refetch, so the local list never drifts from the store for long.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::content::{
    plan_move, BlogPost, Entity, Experience, OrderingController, Orderable, Project,
    ReorderOutcome, Repository,
};
use crate::error::ContentError;
use crate::session::SessionGuard;
use crate::storage::Storage;

/// Result of a submission that may have been dropped as a duplicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission<T> {
    Completed(T),
    /// Another submission on the same collection was still running.
    Ignored,
}

impl<T> Submission<T> {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Submission::Ignored)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Submission::Completed(value) => Some(value),
            Submission::Ignored => None,
        }
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AdminCollection<S, E> {
    repo: Repository<S, E>,
    session: Arc<SessionGuard>,
    items: Arc<RwLock<Vec<E>>>,
    in_flight: Arc<AtomicBool>,
}

impl<S, E> Clone for AdminCollection<S, E> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            session: self.session.clone(),
            items: self.items.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<S, E> AdminCollection<S, E>
where
    S: Storage + Send + Sync + 'static,
    E: Entity,
{
    fn new(repo: Repository<S, E>, session: Arc<SessionGuard>) -> Self {
        Self {
            repo,
            session,
            items: Arc::new(RwLock::new(Vec::new())),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Last list confirmed by the store.
    pub fn items(&self) -> Vec<E> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn refresh(&self) -> Result<Vec<E>, ContentError> {
        let items = self.repo.list().await?;
        self.set_items(items.clone());
        Ok(items)
    }

    pub async fn create(&self, draft: E::Draft) -> Result<Submission<E>, ContentError> {
        self.submit(|repo| async move { repo.create(draft).await })
            .await
    }

    pub async fn update(&self, id: i64, draft: E::Draft) -> Result<Submission<E>, ContentError> {
        self.submit(|repo| async move { repo.update(id, draft).await })
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<Submission<()>, ContentError> {
        self.submit(|repo| async move { repo.delete(id).await })
            .await
    }

    async fn submit<T, F, Fut>(&self, op: F) -> Result<Submission<T>, ContentError>
    where
        F: FnOnce(Repository<S, E>) -> Fut,
        Fut: Future<Output = Result<T, ContentError>>,
    {
        self.require_session()?;
        let Some(_permit) = InFlight::acquire(&self.in_flight) else {
            log::debug!("{} submission already running, ignoring", E::KIND);
            return Ok(Submission::Ignored);
        };

        match op(self.repo.clone()).await {
            Ok(value) => {
                self.refetch().await;
                Ok(Submission::Completed(value))
            }
            Err(err) => {
                if err.is_not_found() {
                    self.refetch().await;
                }
                Err(err)
            }
        }
    }

    fn require_session(&self) -> Result<(), ContentError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ContentError::Unauthorized)
        }
    }

    async fn refetch(&self) {
        if let Err(err) = self.refresh().await {
            log::warn!("refetching {} list failed: {}", E::KIND, err);
        }
    }

    fn set_items(&self, items: Vec<E>) {
        *self.items.write().unwrap_or_else(PoisonError::into_inner) = items;
    }
}

impl<S, E> AdminCollection<S, E>
where
    S: Storage + Send + Sync + 'static,
    E: Orderable,
{
    /// Drops `dragged` onto `target` in the current list.
    ///
    /// The list shows the new order right away and falls back to the previous
    /// one if the store refuses the batch. Yields `false` when the drop was a
    /// no-op.
    pub async fn drop_item(
        &self,
        dragged: i64,
        target: i64,
    ) -> Result<Submission<bool>, ContentError> {
        self.require_session()?;
        let Some(_permit) = InFlight::acquire(&self.in_flight) else {
            return Ok(Submission::Ignored);
        };

        let previous = self.items();
        let Some(plan) = plan_move(&previous, dragged, target) else {
            return Ok(Submission::Completed(false));
        };
        self.set_items(plan.items);

        let controller = OrderingController::new(self.repo.clone());
        match controller.drop_onto(&previous, dragged, target).await {
            Ok(ReorderOutcome::Applied(items)) => {
                self.set_items(items);
                Ok(Submission::Completed(true))
            }
            Ok(ReorderOutcome::Unchanged) => {
                self.set_items(previous);
                Ok(Submission::Completed(false))
            }
            Err(err) => {
                log::warn!("{} reorder failed, restoring previous order: {}", E::KIND, err);
                self.set_items(previous);
                Err(err)
            }
        }
    }
}

/// Admin entry point holding the injected session guard.
pub struct AdminConsole<S> {
    session: Arc<SessionGuard>,
    experiences: AdminCollection<S, Experience>,
    projects: AdminCollection<S, Project>,
    blogs: AdminCollection<S, BlogPost>,
}

impl<S> AdminConsole<S>
where
    S: Storage + Send + Sync + 'static,
{
    pub fn new(storage: Arc<S>, session: Arc<SessionGuard>) -> Self {
        Self::from_repositories(
            session,
            Repository::new(storage.clone()),
            Repository::new(storage.clone()),
            Repository::new(storage),
        )
    }

    /// Builds the console over repositories whose caches the public side reads,
    /// so admin writes invalidate what visitors see.
    pub fn from_repositories(
        session: Arc<SessionGuard>,
        experiences: Repository<S, Experience>,
        projects: Repository<S, Project>,
        blogs: Repository<S, BlogPost>,
    ) -> Self {
        Self {
            experiences: AdminCollection::new(experiences, session.clone()),
            projects: AdminCollection::new(projects, session.clone()),
            blogs: AdminCollection::new(blogs, session.clone()),
            session,
        }
    }

    pub fn session(&self) -> &SessionGuard {
        &self.session
    }

    pub fn experiences(&self) -> &AdminCollection<S, Experience> {
        &self.experiences
    }

    pub fn projects(&self) -> &AdminCollection<S, Project> {
        &self.projects
    }

    pub fn blogs(&self) -> &AdminCollection<S, BlogPost> {
        &self.blogs
    }

    /// Loads all three collections. Stops at the first failure.
    pub async fn refresh(&self) -> Result<(), ContentError> {
        self.experiences.refresh().await?;
        self.projects.refresh().await?;
        self.blogs.refresh().await?;
        Ok(())
    }
}
