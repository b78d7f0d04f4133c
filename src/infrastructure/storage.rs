// Storage Interface - persistence backends for preserve records
// The store owns validation; backends only guarantee atomic single-record writes.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::core::PreserveId;
use crate::error::{AppError, AppResult};
use crate::models::{Preserve, PreserveStatus};

#[async_trait]
pub trait PreserveStorage: Send + Sync {
    /// Insert a new record. Fails if the id is already taken.
    async fn insert(&self, preserve: &Preserve) -> AppResult<()>;

    async fn get(&self, id: PreserveId) -> AppResult<Option<Preserve>>;

    /// Overwrite an existing record. Returns false when the id is unknown.
    async fn replace(&self, preserve: &Preserve) -> AppResult<bool>;

    /// Hard delete. Returns false when the id is unknown.
    async fn remove(&self, id: PreserveId) -> AppResult<bool>;

    async fn list(&self, status: Option<PreserveStatus>) -> AppResult<Vec<Preserve>>;

    /// Health check to verify backend connectivity
    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// In-process backend, used for tests and ephemeral deployments
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<PreserveId, Preserve>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreserveStorage for MemoryStorage {
    async fn insert(&self, preserve: &Preserve) -> AppResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&preserve.id) {
            return Err(AppError::DatabaseError(format!(
                "Preserve with ID {} already exists",
                preserve.id
            )));
        }
        records.insert(preserve.id, preserve.clone());
        Ok(())
    }

    async fn get(&self, id: PreserveId) -> AppResult<Option<Preserve>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn replace(&self, preserve: &Preserve) -> AppResult<bool> {
        let mut records = self.records.write().await;
        match records.get_mut(&preserve.id) {
            Some(existing) => {
                *existing = preserve.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: PreserveId) -> AppResult<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn list(&self, status: Option<PreserveStatus>) -> AppResult<Vec<Preserve>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect())
    }
}
