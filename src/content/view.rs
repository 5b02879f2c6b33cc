use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;

use super::entity::Entity;
use super::repository::Repository;
use crate::storage::Storage;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState<E> {
    Idle,
    Loading,
    Ready(Vec<E>),
    Failed(String),
}

impl<E> ViewState<E> {
    pub fn items(&self) -> Option<&[E]> {
        match self {
            ViewState::Ready(items) => Some(items),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Cached,
    Fresh,
}

/// Read-only rendering of one collection.
///
/// Each `load` is a single attempt. Once the view is unmounted, loads still in
/// flight are abandoned and their results never reach the state.
pub struct ReadView<S, E> {
    repo: Repository<S, E>,
    source: Source,
    state: Arc<RwLock<ViewState<E>>>,
    mounted: CancellationToken,
}

impl<S, E> Clone for ReadView<S, E> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            source: self.source,
            state: self.state.clone(),
            mounted: self.mounted.clone(),
        }
    }
}

impl<S, E> ReadView<S, E>
where
    S: Storage + Send + Sync + 'static,
    E: Entity,
{
    /// A visitor-facing view that reads through the repository's cache.
    pub fn public(repo: Repository<S, E>) -> Self {
        Self::with_source(repo, Source::Cached)
    }

    /// A view that always asks the store.
    pub fn fresh(repo: Repository<S, E>) -> Self {
        Self::with_source(repo, Source::Fresh)
    }

    fn with_source(repo: Repository<S, E>, source: Source) -> Self {
        Self {
            repo,
            source,
            state: Arc::new(RwLock::new(ViewState::Idle)),
            mounted: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> ViewState<E> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_mounted(&self) -> bool {
        !self.mounted.is_cancelled()
    }

    pub fn unmount(&self) {
        self.mounted.cancel();
    }

    pub async fn load(&self) -> ViewState<E> {
        if !self.is_mounted() {
            return self.state();
        }
        self.set(ViewState::Loading);

        let fetch = async {
            match self.source {
                Source::Cached => self.repo.cached_list().await,
                Source::Fresh => self.repo.list().await,
            }
        };
        let result = tokio::select! {
            biased;
            _ = self.mounted.cancelled() => None,
            result = fetch => Some(result),
        };

        match result {
            Some(_) if !self.is_mounted() => {}
            None => log::debug!("{} view unmounted during load", E::KIND),
            Some(Ok(items)) => self.set(ViewState::Ready(items)),
            Some(Err(err)) => {
                log::warn!("loading {} list failed: {}", E::KIND, err);
                self.set(ViewState::Failed(err.to_string()));
            }
        }
        self.state()
    }

    fn set(&self, next: ViewState<E>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}
