// HTTP surface - public read API, admin bridge and health probe

pub mod admin_api;
pub mod query;
pub mod read_api;

use axum::{extract::State, middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::viewer_context_middleware;

pub use query::{CollectionParams, CollectionQuery};
pub use read_api::ReadApi;

pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.store.storage().health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Complete application router: public reads, admin writes and health.
/// Only admin routes resolve a viewer; public reads ignore any Authorization header.
pub fn create_app_router(state: AppState) -> Router {
    let admin = admin_api::create_admin_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        viewer_context_middleware::<AppState>,
    ));

    Router::new()
        .merge(read_api::create_read_router())
        .merge(admin)
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
