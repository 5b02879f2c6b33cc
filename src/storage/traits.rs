use anyhow::Result;

use crate::content::{
    BlogDraft, BlogPost, ContentKind, Experience, ExperienceDraft, OrderUpdate, Project,
    ProjectDraft,
};

/// Read side of the store. Absence is `Ok(None)`, never an error.
pub trait StorageRead {
    fn list_experiences(&self) -> Result<Vec<Experience>>;
    fn load_experience(&self, id: i64) -> Result<Option<Experience>>;

    fn list_projects(&self) -> Result<Vec<Project>>;
    fn load_project(&self, id: i64) -> Result<Option<Project>>;

    fn list_blogs(&self) -> Result<Vec<BlogPost>>;
    fn load_blog(&self, id: i64) -> Result<Option<BlogPost>>;

    fn count(&self, kind: ContentKind) -> Result<u64>;
}

/// Write side of the store. Identity and timestamps are assigned here.
///
/// Update-style calls return `Ok(false)` when the row does not exist.
pub trait StorageWrite {
    fn insert_experience(&self, draft: &ExperienceDraft) -> Result<i64>;
    fn update_experience(&self, id: i64, draft: &ExperienceDraft) -> Result<bool>;

    fn insert_project(&self, draft: &ProjectDraft) -> Result<i64>;
    fn update_project(&self, id: i64, draft: &ProjectDraft) -> Result<bool>;

    fn insert_blog(&self, draft: &BlogDraft) -> Result<i64>;
    fn update_blog(&self, id: i64, draft: &BlogDraft) -> Result<bool>;

    fn delete(&self, kind: ContentKind, id: i64) -> Result<bool>;

    fn set_display_order(&self, kind: ContentKind, update: OrderUpdate) -> Result<bool>;
}

/// A unit of work. Dropping it without `commit` discards every write.
pub trait StorageTx: StorageRead + StorageWrite {
    fn commit(self) -> Result<()>;
}

pub trait Storage: StorageRead {
    type Tx: StorageTx;

    fn begin_tx(&self) -> Result<Self::Tx>;
}
