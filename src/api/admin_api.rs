// Admin API - HTTP bridge for the content platform's preserve edit form
// Every handler acts as the request's viewer; the store's write policy decides.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::core::PreserveId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::middleware::Vc;
use crate::models::{Preserve, PreserveDraft, PreservePatch, PreserveStatus};
use crate::services::PreserveFilter;

#[derive(Debug, Default, Deserialize)]
pub struct AdminListParams {
    pub status: Option<String>,
}

fn parse_id(raw: &str) -> AppResult<PreserveId> {
    raw.parse().map_err(AppError::BadRequest)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

pub async fn admin_list_handler(
    State(state): State<AppState>,
    vc: Vc,
    params: Result<Query<AdminListParams>, QueryRejection>,
) -> AppResult<Json<Vec<Preserve>>> {
    state.store.authorize(&vc, "list")?;
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let status = params
        .status
        .as_deref()
        .map(str::parse::<PreserveStatus>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let mut preserves = state.store.list(PreserveFilter { status }).await?;
    preserves.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    Ok(Json(preserves))
}

pub async fn admin_get_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Preserve>> {
    state.store.authorize(&vc, "view")?;
    let id = parse_id(&raw_id)?;
    Ok(Json(state.store.get(id).await?))
}

pub async fn admin_create_handler(
    State(state): State<AppState>,
    vc: Vc,
    payload: Result<Json<PreserveDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Preserve>)> {
    state.store.authorize(&vc, "create")?;
    let draft = body(payload)?;
    let created = state.store.create(&vc, draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn admin_update_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(raw_id): Path<String>,
    payload: Result<Json<PreservePatch>, JsonRejection>,
) -> AppResult<Json<Preserve>> {
    state.store.authorize(&vc, "update")?;
    let id = parse_id(&raw_id)?;
    let patch = body(payload)?;
    Ok(Json(state.store.update(&vc, id, patch).await?))
}

pub async fn admin_delete_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode> {
    state.store.authorize(&vc, "delete")?;
    let id = parse_id(&raw_id)?;
    state.store.delete(&vc, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/preserves",
            get(admin_list_handler).post(admin_create_handler),
        )
        .route(
            "/admin/preserves/{id}",
            get(admin_get_handler)
                .patch(admin_update_handler)
                .delete(admin_delete_handler),
        )
}
