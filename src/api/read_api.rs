// Preserve Read API - public, read-only view of published preserves

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::query::{CollectionParams, CollectionQuery};
use crate::app_state::AppState;
use crate::core::PreserveId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::published_cache::{PublishedCache, PublishedSnapshot};
use crate::models::PublicPreserve;
use crate::services::{PreserveFilter, PreserveStore};

/// Serves projections of published records. Drafts never leave this layer,
/// whatever the storage backend returns.
#[derive(Clone)]
pub struct ReadApi {
    store: Arc<PreserveStore>,
    cache: Arc<PublishedCache>,
}

impl ReadApi {
    pub fn new(store: Arc<PreserveStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache: Arc::new(PublishedCache::new(cache_ttl)),
        }
    }

    /// All published preserves ordered by title (case-insensitive), then id
    pub async fn published(&self) -> AppResult<PublishedSnapshot> {
        let revision = self.store.revision();
        self.cache
            .get_or_load(revision, || async {
                let mut preserves: Vec<PublicPreserve> = self
                    .store
                    .list(PreserveFilter::published())
                    .await?
                    .iter()
                    .filter(|p| p.is_published())
                    .map(PublicPreserve::from)
                    .collect();
                preserves.sort_by(|a, b| {
                    a.title
                        .to_lowercase()
                        .cmp(&b.title.to_lowercase())
                        .then(a.id.cmp(&b.id))
                });
                Ok(preserves)
            })
            .await
    }

    pub async fn collection(&self, query: &CollectionQuery) -> AppResult<Vec<PublicPreserve>> {
        let published = self.published().await?;
        Ok(published
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect())
    }

    pub async fn item(&self, id: PreserveId) -> AppResult<PublicPreserve> {
        let published = self.published().await?;
        published
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No published preserve with id {}", id)))
    }
}

// HTTP Handlers

pub async fn list_preserves_handler(
    State(state): State<AppState>,
    params: Result<Query<CollectionParams>, QueryRejection>,
) -> AppResult<Json<Vec<PublicPreserve>>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let query = CollectionQuery::parse(&params)?;
    Ok(Json(state.read_api.collection(&query).await?))
}

pub async fn get_preserve_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<PublicPreserve>> {
    let id: PreserveId = raw_id.parse().map_err(AppError::BadRequest)?;
    Ok(Json(state.read_api.item(id).await?))
}

pub fn create_read_router() -> Router<AppState> {
    Router::new()
        .route("/preserves", get(list_preserves_handler))
        .route("/preserves/{id}", get(get_preserve_handler))
}
