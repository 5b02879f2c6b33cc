use serde::{de::DeserializeOwned, Serialize};

use super::model::{
    BlogDraft, BlogPost, ContentKind, Experience, ExperienceDraft, Intent, Project, ProjectDraft,
};
use crate::error::ContentError;
use crate::storage::{StorageRead, StorageWrite};

/// A content collection row and the store calls that move it.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    type Draft: Clone + DeserializeOwned + Send + Sync + 'static;

    const KIND: ContentKind;

    fn id(&self) -> i64;

    fn validate(draft: Self::Draft, intent: Intent) -> Result<Self::Draft, ContentError>;

    fn list<R: StorageRead + ?Sized>(store: &R) -> anyhow::Result<Vec<Self>>;

    fn load<R: StorageRead + ?Sized>(store: &R, id: i64) -> anyhow::Result<Option<Self>>;

    fn insert<W: StorageWrite + ?Sized>(store: &W, draft: &Self::Draft) -> anyhow::Result<i64>;

    /// Returns `false` when no row has `id`.
    fn replace<W: StorageWrite + ?Sized>(
        store: &W,
        id: i64,
        draft: &Self::Draft,
    ) -> anyhow::Result<bool>;
}

/// Entities the admin can drag into a custom order.
pub trait Orderable: Entity {
    fn display_order(&self) -> i64;

    fn set_display_order(&mut self, display_order: i64);
}

impl Entity for Experience {
    type Draft = ExperienceDraft;

    const KIND: ContentKind = ContentKind::Experience;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(draft: ExperienceDraft, intent: Intent) -> Result<ExperienceDraft, ContentError> {
        draft.validate(intent)
    }

    fn list<R: StorageRead + ?Sized>(store: &R) -> anyhow::Result<Vec<Self>> {
        store.list_experiences()
    }

    fn load<R: StorageRead + ?Sized>(store: &R, id: i64) -> anyhow::Result<Option<Self>> {
        store.load_experience(id)
    }

    fn insert<W: StorageWrite + ?Sized>(store: &W, draft: &ExperienceDraft) -> anyhow::Result<i64> {
        store.insert_experience(draft)
    }

    fn replace<W: StorageWrite + ?Sized>(
        store: &W,
        id: i64,
        draft: &ExperienceDraft,
    ) -> anyhow::Result<bool> {
        store.update_experience(id, draft)
    }
}

impl Orderable for Experience {
    fn display_order(&self) -> i64 {
        self.display_order
    }

    fn set_display_order(&mut self, display_order: i64) {
        self.display_order = display_order;
    }
}

impl Entity for Project {
    type Draft = ProjectDraft;

    const KIND: ContentKind = ContentKind::Project;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(draft: ProjectDraft, intent: Intent) -> Result<ProjectDraft, ContentError> {
        draft.validate(intent)
    }

    fn list<R: StorageRead + ?Sized>(store: &R) -> anyhow::Result<Vec<Self>> {
        store.list_projects()
    }

    fn load<R: StorageRead + ?Sized>(store: &R, id: i64) -> anyhow::Result<Option<Self>> {
        store.load_project(id)
    }

    fn insert<W: StorageWrite + ?Sized>(store: &W, draft: &ProjectDraft) -> anyhow::Result<i64> {
        store.insert_project(draft)
    }

    fn replace<W: StorageWrite + ?Sized>(
        store: &W,
        id: i64,
        draft: &ProjectDraft,
    ) -> anyhow::Result<bool> {
        store.update_project(id, draft)
    }
}

impl Orderable for Project {
    fn display_order(&self) -> i64 {
        self.display_order
    }

    fn set_display_order(&mut self, display_order: i64) {
        self.display_order = display_order;
    }
}

impl Entity for BlogPost {
    type Draft = BlogDraft;

    const KIND: ContentKind = ContentKind::Blog;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(draft: BlogDraft, intent: Intent) -> Result<BlogDraft, ContentError> {
        draft.validate(intent)
    }

    fn list<R: StorageRead + ?Sized>(store: &R) -> anyhow::Result<Vec<Self>> {
        store.list_blogs()
    }

    fn load<R: StorageRead + ?Sized>(store: &R, id: i64) -> anyhow::Result<Option<Self>> {
        store.load_blog(id)
    }

    fn insert<W: StorageWrite + ?Sized>(store: &W, draft: &BlogDraft) -> anyhow::Result<i64> {
        store.insert_blog(draft)
    }

    fn replace<W: StorageWrite + ?Sized>(
        store: &W,
        id: i64,
        draft: &BlogDraft,
    ) -> anyhow::Result<bool> {
        store.update_blog(id, draft)
    }
}
