use anyhow::{bail, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use super::traits::{Storage, StorageRead, StorageTx, StorageWrite};
use crate::content::{
    BlogDraft, BlogPost, ContentKind, Experience, ExperienceDraft, OrderUpdate, Project,
    ProjectDraft,
};

/// Process-local store used by `--ephemeral` runs and tests.
///
/// Transactions work on a snapshot that replaces the tables on commit. Only
/// one transaction is open at a time; `begin_tx` blocks until the previous
/// one commits or is dropped.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    shared: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    tables: Mutex<Tables>,
    writer: Mutex<bool>,
    writer_released: Condvar,
    commits: Gate,
    reads: Gate,
    operations: AtomicUsize,
    unavailable: AtomicBool,
}

#[derive(Clone, Default)]
struct Tables {
    next_id: i64,
    experiences: Vec<Experience>,
    projects: Vec<Project>,
    blogs: Vec<BlogPost>,
}

/// Closable checkpoint that parks callers until reopened.
#[derive(Default)]
struct Gate {
    closed: Mutex<bool>,
    opened: Condvar,
    waiting: AtomicUsize,
}

impl Gate {
    fn close(&self) {
        *lock(&self.closed) = true;
    }

    fn open(&self) {
        *lock(&self.closed) = false;
        self.opened.notify_all();
    }

    fn pass(&self) {
        let mut closed = lock(&self.closed);
        if !*closed {
            return;
        }
        self.waiting.fetch_add(1, Ordering::SeqCst);
        while *closed {
            closed = self
                .opened
                .wait(closed)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }

    fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn commit_gate(&self) -> &Gate {
        &self.commits
    }

    fn read_gate(&self) -> &Gate {
        &self.reads
    }

    fn touch(&self) -> Result<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("memory store is offline");
        }
        Ok(())
    }
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn experiences(&self) -> Vec<Experience> {
        let mut rows = self.experiences.clone();
        rows.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        rows
    }

    fn projects(&self) -> Vec<Project> {
        let mut rows = self.projects.clone();
        rows.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        rows
    }

    fn blogs(&self) -> Vec<BlogPost> {
        let mut rows = self.blogs.clone();
        rows.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.id.cmp(&a.id))
        });
        rows
    }

    fn count(&self, kind: ContentKind) -> u64 {
        let len = match kind {
            ContentKind::Experience => self.experiences.len(),
            ContentKind::Project => self.projects.len(),
            ContentKind::Blog => self.blogs.len(),
        };
        len as u64
    }

    fn insert_experience(&mut self, draft: &ExperienceDraft) -> i64 {
        let id = self.allocate_id();
        let now = Utc::now();
        self.experiences.push(Experience {
            id,
            period: draft.period.clone(),
            company: draft.company.clone(),
            job_title: draft.job_title.clone(),
            description: draft.description.clone(),
            link: draft.link.clone(),
            display_order: draft.display_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        });
        id
    }

    fn update_experience(&mut self, id: i64, draft: &ExperienceDraft) -> bool {
        let Some(row) = self.experiences.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        row.period = draft.period.clone();
        row.company = draft.company.clone();
        row.job_title = draft.job_title.clone();
        row.description = draft.description.clone();
        row.link = draft.link.clone();
        if let Some(order) = draft.display_order {
            row.display_order = order;
        }
        row.updated_at = Utc::now();
        true
    }

    fn insert_project(&mut self, draft: &ProjectDraft) -> i64 {
        let id = self.allocate_id();
        let now = Utc::now();
        self.projects.push(Project {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            image: draft.image.clone().unwrap_or_default(),
            skills: draft.skills.clone(),
            github: draft.github.clone(),
            live: draft.live.clone(),
            display_order: draft.display_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        });
        id
    }

    fn update_project(&mut self, id: i64, draft: &ProjectDraft) -> bool {
        let Some(row) = self.projects.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        row.title = draft.title.clone();
        row.description = draft.description.clone();
        if let Some(image) = &draft.image {
            row.image = image.clone();
        }
        row.skills = draft.skills.clone();
        row.github = draft.github.clone();
        row.live = draft.live.clone();
        if let Some(order) = draft.display_order {
            row.display_order = order;
        }
        row.updated_at = Utc::now();
        true
    }

    fn insert_blog(&mut self, draft: &BlogDraft) -> i64 {
        let id = self.allocate_id();
        let now = Utc::now();
        self.blogs.push(BlogPost {
            id,
            title: draft.title.clone(),
            excerpt: draft.excerpt.clone(),
            content: draft.content.clone(),
            image: draft.image.clone(),
            author: draft.author.clone(),
            read_time: draft.read_time.clone(),
            published_at: now,
            created_at: now,
            updated_at: now,
        });
        id
    }

    fn update_blog(&mut self, id: i64, draft: &BlogDraft) -> bool {
        let Some(row) = self.blogs.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        row.title = draft.title.clone();
        row.excerpt = draft.excerpt.clone();
        row.content = draft.content.clone();
        row.image = draft.image.clone();
        row.author = draft.author.clone();
        row.read_time = draft.read_time.clone();
        row.updated_at = Utc::now();
        true
    }

    fn delete(&mut self, kind: ContentKind, id: i64) -> bool {
        let before = self.count(kind);
        match kind {
            ContentKind::Experience => self.experiences.retain(|e| e.id != id),
            ContentKind::Project => self.projects.retain(|p| p.id != id),
            ContentKind::Blog => self.blogs.retain(|b| b.id != id),
        }
        self.count(kind) < before
    }

    fn set_display_order(&mut self, kind: ContentKind, update: OrderUpdate) -> Result<bool> {
        let now = Utc::now();
        let found = match kind {
            ContentKind::Experience => self
                .experiences
                .iter_mut()
                .find(|e| e.id == update.id)
                .map(|e| {
                    e.display_order = update.display_order;
                    e.updated_at = now;
                }),
            ContentKind::Project => self
                .projects
                .iter_mut()
                .find(|p| p.id == update.id)
                .map(|p| {
                    p.display_order = update.display_order;
                    p.updated_at = now;
                }),
            ContentKind::Blog => bail!("{} rows have no display order", kind),
        };
        Ok(found.is_some())
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far, transactions included.
    pub fn operations(&self) -> usize {
        self.shared.operations.load(Ordering::SeqCst)
    }

    /// Makes every following store call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.shared.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Parks every commit until the returned guard is released or dropped.
    pub fn hold_commits(&self) -> Hold {
        self.shared.commits.close();
        Hold {
            shared: self.shared.clone(),
            gate: Shared::commit_gate,
        }
    }

    /// Commits currently parked behind a [`Hold`].
    pub fn pending_commits(&self) -> usize {
        self.shared.commits.waiting()
    }

    /// Parks reads made outside a transaction until the guard goes away.
    pub fn hold_reads(&self) -> Hold {
        self.shared.reads.close();
        Hold {
            shared: self.shared.clone(),
            gate: Shared::read_gate,
        }
    }

    pub fn pending_reads(&self) -> usize {
        self.shared.reads.waiting()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.shared.touch()?;
        self.shared.reads.pass();
        Ok(lock(&self.shared.tables))
    }
}

/// Keeps a [`MemoryStorage`] checkpoint closed while alive.
pub struct Hold {
    shared: Arc<Shared>,
    gate: fn(&Shared) -> &Gate,
}

impl Hold {
    pub fn release(self) {}
}

impl Drop for Hold {
    fn drop(&mut self) {
        (self.gate)(&self.shared).open();
    }
}

pub struct MemoryTx {
    shared: Arc<Shared>,
    snapshot: Mutex<Tables>,
}

impl MemoryTx {
    fn snapshot(&self) -> Result<MutexGuard<'_, Tables>> {
        self.shared.touch()?;
        Ok(lock(&self.snapshot))
    }
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        *lock(&self.shared.writer) = false;
        self.shared.writer_released.notify_one();
    }
}

impl StorageTx for MemoryTx {
    fn commit(self) -> Result<()> {
        self.shared.touch()?;
        self.shared.commits.pass();
        let snapshot = std::mem::take(&mut *lock(&self.snapshot));
        *lock(&self.shared.tables) = snapshot;
        Ok(())
    }
}

impl Storage for MemoryStorage {
    type Tx = MemoryTx;

    fn begin_tx(&self) -> Result<Self::Tx> {
        self.shared.touch()?;
        let mut busy = lock(&self.shared.writer);
        while *busy {
            busy = self
                .shared
                .writer_released
                .wait(busy)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *busy = true;
        drop(busy);

        let snapshot = lock(&self.shared.tables).clone();
        Ok(MemoryTx {
            shared: self.shared.clone(),
            snapshot: Mutex::new(snapshot),
        })
    }
}

macro_rules! impl_storage_read {
    ($ty:ty, $tables:ident) => {
        impl StorageRead for $ty {
            fn list_experiences(&self) -> Result<Vec<Experience>> {
                Ok(self.$tables()?.experiences())
            }

            fn load_experience(&self, id: i64) -> Result<Option<Experience>> {
                Ok(self
                    .$tables()?
                    .experiences
                    .iter()
                    .find(|e| e.id == id)
                    .cloned())
            }

            fn list_projects(&self) -> Result<Vec<Project>> {
                Ok(self.$tables()?.projects())
            }

            fn load_project(&self, id: i64) -> Result<Option<Project>> {
                Ok(self
                    .$tables()?
                    .projects
                    .iter()
                    .find(|p| p.id == id)
                    .cloned())
            }

            fn list_blogs(&self) -> Result<Vec<BlogPost>> {
                Ok(self.$tables()?.blogs())
            }

            fn load_blog(&self, id: i64) -> Result<Option<BlogPost>> {
                Ok(self.$tables()?.blogs.iter().find(|b| b.id == id).cloned())
            }

            fn count(&self, kind: ContentKind) -> Result<u64> {
                Ok(self.$tables()?.count(kind))
            }
        }
    };
}

impl_storage_read!(MemoryStorage, tables);
impl_storage_read!(MemoryTx, snapshot);

impl StorageWrite for MemoryTx {
    fn insert_experience(&self, draft: &ExperienceDraft) -> Result<i64> {
        Ok(self.snapshot()?.insert_experience(draft))
    }

    fn update_experience(&self, id: i64, draft: &ExperienceDraft) -> Result<bool> {
        Ok(self.snapshot()?.update_experience(id, draft))
    }

    fn insert_project(&self, draft: &ProjectDraft) -> Result<i64> {
        Ok(self.snapshot()?.insert_project(draft))
    }

    fn update_project(&self, id: i64, draft: &ProjectDraft) -> Result<bool> {
        Ok(self.snapshot()?.update_project(id, draft))
    }

    fn insert_blog(&self, draft: &BlogDraft) -> Result<i64> {
        Ok(self.snapshot()?.insert_blog(draft))
    }

    fn update_blog(&self, id: i64, draft: &BlogDraft) -> Result<bool> {
        Ok(self.snapshot()?.update_blog(id, draft))
    }

    fn delete(&self, kind: ContentKind, id: i64) -> Result<bool> {
        Ok(self.snapshot()?.delete(kind, id))
    }

    fn set_display_order(&self, kind: ContentKind, update: OrderUpdate) -> Result<bool> {
        self.snapshot()?.set_display_order(kind, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Skills;
    use std::time::Duration;

    fn experience(period: &str, display_order: Option<i64>) -> ExperienceDraft {
        ExperienceDraft {
            period: period.into(),
            company: "Freelance".into(),
            job_title: "Web Developer".into(),
            description: None,
            link: None,
            display_order,
        }
    }

    #[test]
    fn memory_uncommitted_writes_are_discarded() {
        let storage = MemoryStorage::new();
        {
            let tx = storage.begin_tx().unwrap();
            tx.insert_experience(&experience("2019", None)).unwrap();
            assert_eq!(tx.count(ContentKind::Experience).unwrap(), 1);
        }
        assert_eq!(storage.count(ContentKind::Experience).unwrap(), 0);
    }

    #[test]
    fn memory_orders_like_sqlite() {
        let storage = MemoryStorage::new();
        let tx = storage.begin_tx().unwrap();
        let a = tx.insert_experience(&experience("a", Some(1))).unwrap();
        let b = tx.insert_experience(&experience("b", Some(0))).unwrap();
        let c = tx.insert_experience(&experience("c", Some(0))).unwrap();
        tx.commit().unwrap();

        let ids: Vec<i64> = storage
            .list_experiences()
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![c, b, a]);
    }

    #[test]
    fn memory_counts_operations_and_can_go_offline() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.operations(), 0);
        storage.list_projects().unwrap();
        assert_eq!(storage.operations(), 1);

        storage.set_unavailable(true);
        assert!(storage.list_projects().is_err());
        assert!(storage.begin_tx().is_err());
        storage.set_unavailable(false);
        assert!(storage.list_projects().unwrap().is_empty());
    }

    #[test]
    fn memory_update_keeps_image_when_absent() {
        let storage = MemoryStorage::new();
        let tx = storage.begin_tx().unwrap();
        let id = tx
            .insert_project(&ProjectDraft {
                title: "Portfolio".into(),
                description: "This site".into(),
                image: Some("/portfolio.png".into()),
                skills: Skills::parse("React"),
                ..Default::default()
            })
            .unwrap();
        tx.update_project(
            id,
            &ProjectDraft {
                title: "Portfolio v2".into(),
                description: "This site".into(),
                image: None,
                skills: Skills::parse("React,Vite"),
                ..Default::default()
            },
        )
        .unwrap();
        tx.commit().unwrap();

        let row = storage.load_project(id).unwrap().unwrap();
        assert_eq!(row.image, "/portfolio.png");
        assert_eq!(row.skills.len(), 2);
    }

    #[test]
    fn memory_held_read_waits_for_release() {
        let storage = MemoryStorage::new();
        let hold = storage.hold_reads();

        let reader = {
            let storage = storage.clone();
            std::thread::spawn(move || storage.count(ContentKind::Blog).unwrap())
        };

        while storage.pending_reads() == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        let tx = storage.begin_tx().unwrap();
        assert_eq!(tx.count(ContentKind::Blog).unwrap(), 0, "transactions are not held");
        drop(tx);

        hold.release();
        assert_eq!(reader.join().unwrap(), 0);
        assert_eq!(storage.pending_reads(), 0);
    }

    #[test]
    fn memory_held_commit_waits_for_release() {
        let storage = MemoryStorage::new();
        let hold = storage.hold_commits();

        let writer = {
            let storage = storage.clone();
            std::thread::spawn(move || {
                let tx = storage.begin_tx().unwrap();
                tx.insert_experience(&experience("2024", None)).unwrap();
                tx.commit().unwrap();
            })
        };

        while storage.pending_commits() == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(storage.count(ContentKind::Experience).unwrap(), 0);

        hold.release();
        writer.join().unwrap();
        assert_eq!(storage.count(ContentKind::Experience).unwrap(), 1);
    }
}
