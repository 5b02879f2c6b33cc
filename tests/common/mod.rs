#![allow(dead_code)]

use std::process::Command as ProcCommand;
use std::sync::Arc;
use std::time::Duration;

use folio::admin::AdminConsole;
use folio::rest::AppState;
use folio::session::{Credentials, MemoryFlag, SessionGuard};
use folio::storage::SqliteStorage;
use tempfile::TempDir;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "correct horse";

pub fn sqlite(dir: &TempDir) -> Arc<SqliteStorage> {
    let storage = SqliteStorage::new(dir.path().join("folio.sqlite"));
    storage.init().expect("init sqlite");
    Arc::new(storage)
}

/// Public state and an admin console over the same repositories, so admin
/// writes invalidate the public caches.
pub fn site(
    storage: Arc<SqliteStorage>,
) -> (AppState<SqliteStorage>, AdminConsole<SqliteStorage>) {
    let state = AppState::new(
        storage,
        Credentials::new(ADMIN_USER, ADMIN_PASS),
        Duration::from_secs(300),
    );
    let session = SessionGuard::new(
        Credentials::new(ADMIN_USER, ADMIN_PASS),
        Arc::new(MemoryFlag::new()),
    );
    let console = AdminConsole::from_repositories(
        Arc::new(session),
        state.experiences.clone(),
        state.projects.clone(),
        state.blogs.clone(),
    );
    (state, console)
}

pub fn base_cmd(data_dir: &TempDir) -> ProcCommand {
    let mut command = ProcCommand::new(env!("CARGO_BIN_EXE_folio"));
    command
        .env("DOTENV_PATH", data_dir.path().join("none.env"))
        .env("FOLIO_ADMIN_PASS", ADMIN_PASS)
        .env_remove("FOLIO_ADMIN_USER")
        .env_remove("FOLIO_LOGIN_PASS")
        .arg("--data-dir")
        .arg(data_dir.path());
    command
}
