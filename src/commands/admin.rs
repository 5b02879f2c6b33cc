use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::admin::{AdminCollection, AdminConsole, Submission};
use crate::cli::OrderedKindArg;
use crate::content::Orderable;
use crate::context::Context;
use crate::session::{FileFlag, SessionGuard};
use crate::storage::Storage;

fn session(ctx: &Context) -> SessionGuard {
    SessionGuard::new(
        ctx.credentials(),
        Arc::new(FileFlag::new(ctx.session_flag_path())),
    )
}

fn prompt_password() -> Result<String> {
    if let Ok(pass) = std::env::var("FOLIO_LOGIN_PASS") {
        return Ok(pass);
    }
    if !std::io::stdin().is_terminal() {
        bail!("no terminal to read the password from; set FOLIO_LOGIN_PASS");
    }
    rpassword::prompt_password("Admin password: ").context("read password")
}

pub fn login(ctx: &Context, username: Option<&str>) -> Result<()> {
    if !ctx.credentials().is_enabled() {
        bail!("admin login is disabled; set --admin-pass or FOLIO_ADMIN_PASS");
    }
    let username = username.unwrap_or(&ctx.admin_user);
    let password = prompt_password()?;
    session(ctx).attempt_login(username, &password)?;
    println!("logged in as {username}");
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    session(ctx).logout()?;
    println!("logged out");
    Ok(())
}

pub async fn move_item<S>(
    ctx: &Context,
    storage: Arc<S>,
    kind: OrderedKindArg,
    dragged: i64,
    onto: i64,
) -> Result<()>
where
    S: Storage + Send + Sync + 'static,
{
    let console = AdminConsole::new(storage, Arc::new(session(ctx)));
    if !console.session().is_authenticated() {
        bail!("not logged in; run `folio login` first");
    }
    match kind {
        OrderedKindArg::Experiences => drop_and_print(console.experiences(), dragged, onto).await,
        OrderedKindArg::Projects => drop_and_print(console.projects(), dragged, onto).await,
    }
}

async fn drop_and_print<S, E>(
    collection: &AdminCollection<S, E>,
    dragged: i64,
    onto: i64,
) -> Result<()>
where
    S: Storage + Send + Sync + 'static,
    E: Orderable,
{
    collection.refresh().await?;
    match collection.drop_item(dragged, onto).await? {
        Submission::Completed(true) => {}
        Submission::Completed(false) => log::warn!("nothing to move"),
        Submission::Ignored => bail!("another change is still running"),
    }
    println!("{}", serde_json::to_string_pretty(&collection.items())?);
    Ok(())
}
