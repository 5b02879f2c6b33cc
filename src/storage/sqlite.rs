use anyhow::{bail, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::traits::{Storage, StorageRead, StorageTx, StorageWrite};
use crate::content::{
    BlogDraft, BlogPost, ContentKind, Experience, ExperienceDraft, OrderUpdate, Project,
    ProjectDraft, Skills,
};

const DB_SCHEMA_VERSION: i64 = 1;

const EXPERIENCE_COLUMNS: &str =
    "id, period, company, job_title, description, link, display_order, created_at, updated_at";
const PROJECT_COLUMNS: &str =
    "id, title, description, image, skills, github, live, display_order, created_at, updated_at";
const BLOG_COLUMNS: &str =
    "id, title, excerpt, content, image, author, read_time, published_at, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteStorage {
    pub path: String,
}

pub struct SqliteTx {
    conn: Connection,
}

impl StorageTx for SqliteTx {
    fn commit(self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }
}

fn open(path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(std::time::Duration::from_millis(500))?;
    Ok(conn)
}

fn map_experience_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Experience> {
    Ok(Experience {
        id: row.get(0)?,
        period: row.get(1)?,
        company: row.get(2)?,
        job_title: row.get(3)?,
        description: row.get(4)?,
        link: row.get(5)?,
        display_order: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn map_project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    let skills: String = row.get(4)?;
    Ok(Project {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        image: row.get(3)?,
        skills: Skills::parse(&skills),
        github: row.get(5)?,
        live: row.get(6)?,
        display_order: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn map_blog_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BlogPost> {
    Ok(BlogPost {
        id: row.get(0)?,
        title: row.get(1)?,
        excerpt: row.get(2)?,
        content: row.get(3)?,
        image: row.get(4)?,
        author: row.get(5)?,
        read_time: row.get(6)?,
        published_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn db_list_experiences(conn: &Connection) -> rusqlite::Result<Vec<Experience>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EXPERIENCE_COLUMNS} FROM experiences
         ORDER BY display_order ASC, created_at DESC, id DESC"
    ))?;
    let rows = stmt
        .query_map([], map_experience_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_load_experience(conn: &Connection, id: i64) -> rusqlite::Result<Option<Experience>> {
    conn.query_row(
        &format!("SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE id = ?1"),
        params![id],
        map_experience_row,
    )
    .optional()
}

fn db_list_projects(conn: &Connection) -> rusqlite::Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects
         ORDER BY display_order ASC, created_at DESC, id DESC"
    ))?;
    let rows = stmt
        .query_map([], map_project_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_load_project(conn: &Connection, id: i64) -> rusqlite::Result<Option<Project>> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
        params![id],
        map_project_row,
    )
    .optional()
}

fn db_list_blogs(conn: &Connection) -> rusqlite::Result<Vec<BlogPost>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BLOG_COLUMNS} FROM blogs ORDER BY published_at DESC, id DESC"
    ))?;
    let rows = stmt
        .query_map([], map_blog_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_load_blog(conn: &Connection, id: i64) -> rusqlite::Result<Option<BlogPost>> {
    conn.query_row(
        &format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = ?1"),
        params![id],
        map_blog_row,
    )
    .optional()
}

fn db_count(conn: &Connection, kind: ContentKind) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", kind.table()),
        [],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

fn db_insert_experience(conn: &Connection, draft: &ExperienceDraft) -> rusqlite::Result<i64> {
    let now = Utc::now();
    conn.execute(
        r#"
        INSERT INTO experiences (
            period, company, job_title, description, link, display_order, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
        params![
            draft.period,
            draft.company,
            draft.job_title,
            draft.description,
            draft.link,
            draft.display_order.unwrap_or(0),
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn db_update_experience(
    conn: &Connection,
    id: i64,
    draft: &ExperienceDraft,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        r#"
        UPDATE experiences
        SET period = ?1,
            company = ?2,
            job_title = ?3,
            description = ?4,
            link = ?5,
            display_order = COALESCE(?6, display_order),
            updated_at = ?7
        WHERE id = ?8
        "#,
        params![
            draft.period,
            draft.company,
            draft.job_title,
            draft.description,
            draft.link,
            draft.display_order,
            Utc::now(),
            id
        ],
    )?;
    Ok(rows > 0)
}

fn db_insert_project(conn: &Connection, draft: &ProjectDraft) -> rusqlite::Result<i64> {
    let now = Utc::now();
    conn.execute(
        r#"
        INSERT INTO projects (
            title, description, image, skills, github, live, display_order, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        "#,
        params![
            draft.title,
            draft.description,
            draft.image.as_deref().unwrap_or_default(),
            draft.skills.to_stored(),
            draft.github,
            draft.live,
            draft.display_order.unwrap_or(0),
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn db_update_project(conn: &Connection, id: i64, draft: &ProjectDraft) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        r#"
        UPDATE projects
        SET title = ?1,
            description = ?2,
            image = COALESCE(?3, image),
            skills = ?4,
            github = ?5,
            live = ?6,
            display_order = COALESCE(?7, display_order),
            updated_at = ?8
        WHERE id = ?9
        "#,
        params![
            draft.title,
            draft.description,
            draft.image,
            draft.skills.to_stored(),
            draft.github,
            draft.live,
            draft.display_order,
            Utc::now(),
            id
        ],
    )?;
    Ok(rows > 0)
}

fn db_insert_blog(conn: &Connection, draft: &BlogDraft) -> rusqlite::Result<i64> {
    let now = Utc::now();
    conn.execute(
        r#"
        INSERT INTO blogs (
            title, excerpt, content, image, author, read_time, published_at, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?7)
        "#,
        params![
            draft.title,
            draft.excerpt,
            draft.content,
            draft.image,
            draft.author,
            draft.read_time,
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn db_update_blog(conn: &Connection, id: i64, draft: &BlogDraft) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        r#"
        UPDATE blogs
        SET title = ?1,
            excerpt = ?2,
            content = ?3,
            image = ?4,
            author = ?5,
            read_time = ?6,
            updated_at = ?7
        WHERE id = ?8
        "#,
        params![
            draft.title,
            draft.excerpt,
            draft.content,
            draft.image,
            draft.author,
            draft.read_time,
            Utc::now(),
            id
        ],
    )?;
    Ok(rows > 0)
}

fn db_delete(conn: &Connection, kind: ContentKind, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
        params![id],
    )?;
    Ok(rows > 0)
}

fn db_set_display_order(
    conn: &Connection,
    kind: ContentKind,
    update: OrderUpdate,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        &format!(
            "UPDATE {} SET display_order = ?1, updated_at = ?2 WHERE id = ?3",
            kind.table()
        ),
        params![update.display_order, Utc::now(), update.id],
    )?;
    Ok(rows > 0)
}

impl StorageRead for SqliteTx {
    fn list_experiences(&self) -> Result<Vec<Experience>> {
        Ok(db_list_experiences(&self.conn)?)
    }

    fn load_experience(&self, id: i64) -> Result<Option<Experience>> {
        Ok(db_load_experience(&self.conn, id)?)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(db_list_projects(&self.conn)?)
    }

    fn load_project(&self, id: i64) -> Result<Option<Project>> {
        Ok(db_load_project(&self.conn, id)?)
    }

    fn list_blogs(&self) -> Result<Vec<BlogPost>> {
        Ok(db_list_blogs(&self.conn)?)
    }

    fn load_blog(&self, id: i64) -> Result<Option<BlogPost>> {
        Ok(db_load_blog(&self.conn, id)?)
    }

    fn count(&self, kind: ContentKind) -> Result<u64> {
        Ok(db_count(&self.conn, kind)?)
    }
}

impl StorageWrite for SqliteTx {
    fn insert_experience(&self, draft: &ExperienceDraft) -> Result<i64> {
        Ok(db_insert_experience(&self.conn, draft)?)
    }

    fn update_experience(&self, id: i64, draft: &ExperienceDraft) -> Result<bool> {
        Ok(db_update_experience(&self.conn, id, draft)?)
    }

    fn insert_project(&self, draft: &ProjectDraft) -> Result<i64> {
        Ok(db_insert_project(&self.conn, draft)?)
    }

    fn update_project(&self, id: i64, draft: &ProjectDraft) -> Result<bool> {
        Ok(db_update_project(&self.conn, id, draft)?)
    }

    fn insert_blog(&self, draft: &BlogDraft) -> Result<i64> {
        Ok(db_insert_blog(&self.conn, draft)?)
    }

    fn update_blog(&self, id: i64, draft: &BlogDraft) -> Result<bool> {
        Ok(db_update_blog(&self.conn, id, draft)?)
    }

    fn delete(&self, kind: ContentKind, id: i64) -> Result<bool> {
        Ok(db_delete(&self.conn, kind, id)?)
    }

    fn set_display_order(&self, kind: ContentKind, update: OrderUpdate) -> Result<bool> {
        if !kind.is_orderable() {
            bail!("{} rows have no display order", kind);
        }
        Ok(db_set_display_order(&self.conn, kind, update)?)
    }
}

impl Storage for SqliteStorage {
    type Tx = SqliteTx;

    fn begin_tx(&self) -> Result<Self::Tx> {
        let conn = open(&self.path)?;
        conn.execute("BEGIN IMMEDIATE", [])?;
        Ok(SqliteTx { conn })
    }
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn reset_all(&self) -> Result<()> {
        for suffix in ["", "-wal", "-shm"] {
            let path = format!("{}{}", self.path, suffix);
            if Path::new(&path).exists() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.with_conn(|_conn| Ok(()))?;
        Ok(())
    }

    fn with_conn<F, T>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = open(&self.path)?;
        Self::migrate(&conn)?;
        f(&conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        if version == 0 {
            log::info!(
                "SQLite schema migration: {} -> {}",
                version,
                DB_SCHEMA_VERSION
            );
            conn.execute_batch(
                r#"
            CREATE TABLE experiences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                period TEXT NOT NULL,
                company TEXT NOT NULL,
                job_title TEXT NOT NULL,
                description TEXT,
                link TEXT,
                display_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                image TEXT NOT NULL,
                skills TEXT NOT NULL,
                github TEXT,
                live TEXT,
                display_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE blogs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                excerpt TEXT,
                content TEXT NOT NULL,
                image TEXT,
                author TEXT,
                read_time TEXT,
                published_at TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX experiences_order_idx ON experiences(display_order, created_at);
            CREATE INDEX projects_order_idx ON projects(display_order, created_at);
            CREATE INDEX blogs_published_idx ON blogs(published_at);
        "#,
            )?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some("database schema version mismatch; please run with --reset option".to_string()),
        ))
    }
}

impl StorageRead for SqliteStorage {
    fn list_experiences(&self) -> Result<Vec<Experience>> {
        Ok(self.with_conn(db_list_experiences)?)
    }

    fn load_experience(&self, id: i64) -> Result<Option<Experience>> {
        Ok(self.with_conn(|conn| db_load_experience(conn, id))?)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.with_conn(db_list_projects)?)
    }

    fn load_project(&self, id: i64) -> Result<Option<Project>> {
        Ok(self.with_conn(|conn| db_load_project(conn, id))?)
    }

    fn list_blogs(&self) -> Result<Vec<BlogPost>> {
        Ok(self.with_conn(db_list_blogs)?)
    }

    fn load_blog(&self, id: i64) -> Result<Option<BlogPost>> {
        Ok(self.with_conn(|conn| db_load_blog(conn, id))?)
    }

    fn count(&self, kind: ContentKind) -> Result<u64> {
        Ok(self.with_conn(|conn| db_count(conn, kind))?)
    }
}
