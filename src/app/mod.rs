mod wiring;

use crate::{cli, context, rest, storage};
use anyhow::{Context as AnyhowContext, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct App {
    pub ctx: context::Context,
    pub cli: cli::Cli,
}

impl App {
    pub fn from_cli() -> Result<Self> {
        let cli = crate::cli::parse();
        let ctx = context::Context::from_cli(&cli);

        crate::tracing::init(ctx.log_file.as_deref());
        log::info!("🚀 Starting folio");
        if ctx.ephemeral {
            log::info!("🧪 Ephemeral mode: content is kept in memory");
        } else {
            log::info!("📂 Data dir: {}", ctx.data_dir.to_string_lossy());
            wiring::init_data_dir(&ctx).context("initializing data dir")?;
        }
        if !ctx.credentials().is_enabled() {
            log::warn!("🔐 No admin password configured, admin login disabled");
        }

        Ok(Self { ctx, cli })
    }
}

pub async fn run_daemon<S>(ctx: context::Context, storage: Arc<S>) -> Result<()>
where
    S: storage::Storage + Send + Sync + 'static,
{
    log::info!("🌐 REST API: http://{}", ctx.api_listen);
    log::info!("🗂️ Public cache window: {}s", ctx.cache_ttl.as_secs());
    if let Some(path) = ctx.log_file.as_deref() {
        log::info!("📝 Log file: {}", path.to_string_lossy());
    }

    let shutdown = CancellationToken::new();
    let state = wiring::build_state(&ctx, storage);
    let api_addr = ctx.api_listen;
    let rest_shutdown = shutdown.clone();

    let mut rest_handle =
        tokio::spawn(async move { rest::serve(api_addr, state, rest_shutdown).await });

    let joined = tokio::select! {
        _ = tokio::signal::ctrl_c() => None,
        joined = &mut rest_handle => Some(joined),
    };
    let result = match joined {
        Some(joined) => joined,
        None => {
            log::info!("🧨 Ctrl-C received, shutting down");
            shutdown.cancel();
            rest_handle.await
        }
    };

    match result {
        Ok(Ok(())) => {
            log::info!("✅ Shutdown complete");
            Ok(())
        }
        Ok(Err(e)) => {
            log::error!("REST server error: {}", e);
            Err(e)
        }
        Err(e) => {
            log::error!("REST task failed: {}", e);
            Err(e.into())
        }
    }
}

async fn run_with<S>(app: App, storage: Arc<S>) -> Result<()>
where
    S: storage::Storage + Send + Sync + 'static,
{
    if let Some(cmd) = &app.cli.cmd {
        // one-shot command mode
        return cmd.run(&app.ctx, storage).await;
    }
    run_daemon(app.ctx, storage).await
}

pub async fn run() -> Result<()> {
    let app = App::from_cli()?;

    if app.ctx.ephemeral {
        let storage = Arc::new(storage::MemoryStorage::new());
        return run_with(app, storage).await;
    }

    let storage = wiring::init_storage(&app.ctx)?;
    run_with(app, storage).await
}
