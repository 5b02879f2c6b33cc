use std::sync::Arc;

use anyhow::{Context, Result};

use crate::{context, rest, storage};

pub fn init_data_dir(ctx: &context::Context) -> Result<()> {
    std::fs::create_dir_all(&ctx.data_dir)?;
    Ok(())
}

pub fn init_storage(ctx: &context::Context) -> Result<Arc<storage::SqliteStorage>> {
    let sqlite = storage::SqliteStorage::new(ctx.db_path());
    if ctx.reset {
        sqlite.reset_all().context("resetting storage")?;
    }
    sqlite.init().context("initializing storage")?;
    Ok(Arc::new(sqlite))
}

pub fn build_state<S>(ctx: &context::Context, storage: Arc<S>) -> rest::AppState<S>
where
    S: storage::Storage + Send + Sync + 'static,
{
    rest::AppState::new(storage, ctx.credentials(), ctx.cache_ttl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentKind;
    use crate::storage::StorageRead;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tempfile::TempDir;

    fn ctx(dir: &TempDir, reset: bool) -> context::Context {
        context::Context {
            data_dir: dir.path().join("data"),
            reset,
            ephemeral: false,
            log_file: None,
            api_listen: SocketAddr::from(([127, 0, 0, 1], 0)),
            admin_user: "admin".into(),
            admin_pass: None,
            cache_ttl: Duration::from_secs(300),
        }
    }

    #[test]
    fn storage_created_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let ctx = ctx(&dir, false);
        init_data_dir(&ctx).unwrap();
        let storage = init_storage(&ctx).unwrap();
        assert!(ctx.db_path().exists());
        assert_eq!(storage.count(ContentKind::Blog).unwrap(), 0);
    }

    #[test]
    fn reset_recreates_database() {
        let dir = TempDir::new().unwrap();
        let ctx = ctx(&dir, false);
        init_data_dir(&ctx).unwrap();
        init_storage(&ctx).unwrap();
        rusqlite::Connection::open(ctx.db_path())
            .unwrap()
            .execute_batch("PRAGMA user_version = 42;")
            .unwrap();
        assert!(init_storage(&ctx).is_err());

        let ctx = context::Context { reset: true, ..ctx };
        assert!(init_storage(&ctx).is_ok());
    }
}
