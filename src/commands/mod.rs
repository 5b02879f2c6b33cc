use std::sync::Arc;

use anyhow::Result;

use crate::cli::Command;
use crate::context::Context;
use crate::storage::Storage;

pub mod admin;
pub mod list;
pub mod seed;

impl Command {
    pub async fn run<S>(&self, ctx: &Context, storage: Arc<S>) -> Result<()>
    where
        S: Storage + Send + Sync + 'static,
    {
        match self {
            Command::Seed => seed::run(storage).await,
            Command::List { kind } => list::run(storage, (*kind).into()).await,
            Command::Login { username } => admin::login(ctx, username.as_deref()),
            Command::Logout => admin::logout(ctx),
            Command::Move {
                kind,
                dragged,
                onto,
            } => admin::move_item(ctx, storage, *kind, *dragged, *onto).await,
        }
    }
}
