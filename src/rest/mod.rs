use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::content::{BlogPost, Experience, ListCache, Orderable, Project, Repository};
use crate::session::Credentials;
use crate::storage::Storage;

mod auth;
mod error;
mod handlers;
mod models;

pub use auth::SessionTokens;
pub use error::ApiError;
pub use handlers::Routed;

use handlers::{
    create_item, delete_item, get_item, health, list_items, login, logout, not_found,
    reorder_items, update_item,
};

pub struct AppState<S> {
    pub experiences: Repository<S, Experience>,
    pub projects: Repository<S, Project>,
    pub blogs: Repository<S, BlogPost>,
    pub credentials: Arc<Credentials>,
    pub tokens: SessionTokens,
    pub started_at: std::time::SystemTime,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            experiences: self.experiences.clone(),
            projects: self.projects.clone(),
            blogs: self.blogs.clone(),
            credentials: self.credentials.clone(),
            tokens: self.tokens.clone(),
            started_at: self.started_at,
        }
    }
}

impl<S: Storage + Send + Sync + 'static> AppState<S> {
    /// Public reads go through a cache per collection with the given window.
    pub fn new(storage: Arc<S>, credentials: Credentials, cache_ttl: Duration) -> Self {
        Self {
            experiences: Repository::new(storage.clone()).with_cache(ListCache::new(cache_ttl)),
            projects: Repository::new(storage.clone()).with_cache(ListCache::new(cache_ttl)),
            blogs: Repository::new(storage).with_cache(ListCache::new(cache_ttl)),
            credentials: Arc::new(credentials),
            tokens: SessionTokens::default(),
            started_at: std::time::SystemTime::now(),
        }
    }
}

fn collection<S, E>(router: Router<AppState<S>>, path: &str) -> Router<AppState<S>>
where
    S: Storage + Send + Sync + 'static,
    E: Routed,
{
    router
        .route(path, get(list_items::<S, E>).post(create_item::<S, E>))
        .route(
            &format!("{path}/:id"),
            get(get_item::<S, E>)
                .put(update_item::<S, E>)
                .delete(delete_item::<S, E>),
        )
}

fn ordered<S, E>(router: Router<AppState<S>>, path: &str) -> Router<AppState<S>>
where
    S: Storage + Send + Sync + 'static,
    E: Routed + Orderable,
{
    collection::<S, E>(router, path).route(
        &format!("{path}/order"),
        put(reorder_items::<S, E>),
    )
}

pub fn router<S: Storage + Send + Sync + 'static>(state: AppState<S>) -> Router {
    let router = Router::new()
        .route("/health", get(health::<S>))
        .route("/api/session", post(login::<S>).delete(logout::<S>));
    let router = ordered::<S, Experience>(router, "/api/experiences");
    let router = ordered::<S, Project>(router, "/api/projects");
    let router = collection::<S, BlogPost>(router, "/api/blogs");

    router.fallback(not_found).with_state(state)
}

pub async fn serve<S: Storage + Send + Sync + 'static>(
    addr: SocketAddr,
    state: AppState<S>,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    log::info!("🌐 REST service on http://{}", addr);

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 REST shutdown requested");
        })
        .await?;
    log::info!("👋 REST server exited");
    Ok(())
}
