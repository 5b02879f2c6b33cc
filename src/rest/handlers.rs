use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::{
    content::{BlogPost, Entity, Experience, Orderable, Project, Repository},
    error::SessionError,
    storage::Storage,
};

use super::{
    auth::authorize,
    error::ApiError,
    models::{
        BlogResponse, ErrorResponse, HealthResponse, LoginRequest, LoginResponse, ReorderRequest,
    },
    AppState,
};

/// Binds an entity to its repository in [`AppState`] and its JSON body.
pub trait Routed: Entity {
    type Body: Serialize + Send;

    fn repo<S>(state: &AppState<S>) -> &Repository<S, Self>;

    fn into_body(self) -> Self::Body;
}

impl Routed for Experience {
    type Body = Experience;

    fn repo<S>(state: &AppState<S>) -> &Repository<S, Self> {
        &state.experiences
    }

    fn into_body(self) -> Self::Body {
        self
    }
}

impl Routed for Project {
    type Body = Project;

    fn repo<S>(state: &AppState<S>) -> &Repository<S, Self> {
        &state.projects
    }

    fn into_body(self) -> Self::Body {
        self
    }
}

impl Routed for BlogPost {
    type Body = BlogResponse;

    fn repo<S>(state: &AppState<S>) -> &Repository<S, Self> {
        &state.blogs
    }

    fn into_body(self) -> Self::Body {
        BlogResponse::from(self)
    }
}

pub async fn health<S: Storage + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            uptime_secs,
        }),
    )
}

pub async fn login<S: Storage + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.credentials.verify(&req.username, &req.password) {
        return Err(SessionError::InvalidCredentials.into());
    }
    let token = state.tokens.issue();
    log::info!("🔓 admin session opened");
    Ok(Json(LoginResponse { token }))
}

pub async fn logout<S: Storage + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = authorize(&state.tokens, &headers)?;
    state.tokens.revoke(token);
    log::info!("🔒 admin session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// Visitors get the cached list; an admin token always reads the store.
pub async fn list_items<S, E>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<Vec<E::Body>>, ApiError>
where
    S: Storage + Send + Sync + 'static,
    E: Routed,
{
    let repo = E::repo(&state);
    let items = if authorize(&state.tokens, &headers).is_ok() {
        repo.list().await?
    } else {
        repo.cached_list().await?
    };
    Ok(Json(items.into_iter().map(E::into_body).collect()))
}

pub async fn get_item<S, E>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<E::Body>, ApiError>
where
    S: Storage + Send + Sync + 'static,
    E: Routed,
{
    let item = E::repo(&state).get(id).await?;
    Ok(Json(item.into_body()))
}

pub async fn create_item<S, E>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(draft): Json<E::Draft>,
) -> Result<(StatusCode, Json<E::Body>), ApiError>
where
    S: Storage + Send + Sync + 'static,
    E: Routed,
{
    authorize(&state.tokens, &headers)?;
    let created = E::repo(&state).create(draft).await?;
    Ok((StatusCode::CREATED, Json(created.into_body())))
}

pub async fn update_item<S, E>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(draft): Json<E::Draft>,
) -> Result<Json<E::Body>, ApiError>
where
    S: Storage + Send + Sync + 'static,
    E: Routed,
{
    authorize(&state.tokens, &headers)?;
    let updated = E::repo(&state).update(id, draft).await?;
    Ok(Json(updated.into_body()))
}

pub async fn delete_item<S, E>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
    S: Storage + Send + Sync + 'static,
    E: Routed,
{
    authorize(&state.tokens, &headers)?;
    E::repo(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_items<S, E>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Vec<E::Body>>, ApiError>
where
    S: Storage + Send + Sync + 'static,
    E: Routed + Orderable,
{
    authorize(&state.tokens, &headers)?;
    let repo = E::repo(&state);
    repo.reorder(req.ids).await?;
    let items = repo.list().await?;
    Ok(Json(items.into_iter().map(E::into_body).collect()))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            code: None,
            message: "endpoint not found".to_string(),
            field: None,
        }),
    )
}
