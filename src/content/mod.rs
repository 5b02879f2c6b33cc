pub mod cache;
pub mod entity;
pub mod html;
pub mod model;
pub mod ordering;
pub mod repository;
pub mod skills;
pub mod view;

pub use cache::ListCache;
pub use entity::{Entity, Orderable};
pub use model::{
    BlogDraft, BlogPost, ContentKind, Experience, ExperienceDraft, Intent, OrderUpdate, Project,
    ProjectDraft,
};
pub use ordering::{plan_move, renumber, MovePlan, OrderingController, ReorderOutcome};
pub use repository::Repository;
pub use skills::Skills;
pub use view::{ReadView, ViewState};

use crate::error::ContentError;

/// Runs synchronous store work on the blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ContentError>
where
    F: FnOnce() -> Result<T, ContentError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(err) => Err(ContentError::StoreUnavailable(format!(
            "store task failed: {err}"
        ))),
    }
}
