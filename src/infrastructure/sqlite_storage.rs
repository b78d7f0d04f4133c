use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::core::PreserveId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::storage::PreserveStorage;
use crate::models::{Preserve, PreserveStatus};

/// SQLite implementation of preserve storage.
/// Records are stored as JSON documents; status and modification time are
/// mirrored into columns so listings can filter without decoding every row.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Connect using a `sqlite:` URL, creating the database file when missing
    pub async fn connect(url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::ConfigurationError(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);
        Self::with_options(options, 5).await
    }

    pub async fn open_file(path: &Path) -> AppResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::with_options(options, 5).await
    }

    /// Every in-memory connection is its own database, so the pool is pinned to one connection
    pub async fn new_in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::DatabaseError(format!("Failed to configure in-memory SQLite: {}", e)))?;
        Self::with_options(options, 1).await
    }

    async fn with_options(options: SqliteConnectOptions, max_connections: u32) -> AppResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to SQLite: {}", e)))?;

        let storage = Self { pool };
        storage.initialize().await?;
        Ok(storage)
    }

    /// Create the preserves table and its indexes if they do not exist yet
    pub async fn initialize(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS preserves (
                id INTEGER PRIMARY KEY,
                status TEXT NOT NULL,
                time_updated INTEGER NOT NULL,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create preserves table: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_preserves_status ON preserves(status)")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to create preserves status index: {}", e))
            })?;

        info!("SQLite preserve storage initialized");
        Ok(())
    }

    fn decode(data: &str) -> AppResult<Preserve> {
        serde_json::from_str(data).map_err(|e| {
            AppError::SerializationError(format!("Failed to decode stored preserve: {}", e))
        })
    }
}

#[async_trait]
impl PreserveStorage for SqliteStorage {
    async fn insert(&self, preserve: &Preserve) -> AppResult<()> {
        let data = serde_json::to_string(preserve)?;
        sqlx::query("INSERT INTO preserves (id, status, time_updated, data) VALUES (?, ?, ?, ?)")
            .bind(preserve.id.value())
            .bind(preserve.status.as_str())
            .bind(preserve.last_modified.timestamp_millis())
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to insert preserve {}: {}", preserve.id, e))
            })?;
        Ok(())
    }

    async fn get(&self, id: PreserveId) -> AppResult<Option<Preserve>> {
        let row = sqlx::query("SELECT data FROM preserves WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get preserve {}: {}", id, e)))?;

        match row {
            Some(row) => Ok(Some(Self::decode(row.get::<String, _>("data").as_str())?)),
            None => Ok(None),
        }
    }

    async fn replace(&self, preserve: &Preserve) -> AppResult<bool> {
        let data = serde_json::to_string(preserve)?;
        let result =
            sqlx::query("UPDATE preserves SET status = ?, time_updated = ?, data = ? WHERE id = ?")
                .bind(preserve.status.as_str())
                .bind(preserve.last_modified.timestamp_millis())
                .bind(data)
                .bind(preserve.id.value())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!(
                        "Failed to update preserve {}: {}",
                        preserve.id, e
                    ))
                })?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: PreserveId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM preserves WHERE id = ?")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete preserve {}: {}", id, e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, status: Option<PreserveStatus>) -> AppResult<Vec<Preserve>> {
        let rows = match status {
            Some(status) => {
                sqlx::query("SELECT data FROM preserves WHERE status = ?")
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => sqlx::query("SELECT data FROM preserves").fetch_all(&self.pool).await,
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to list preserves: {}", e)))?;

        rows.iter()
            .map(|row| Self::decode(row.get::<String, _>("data").as_str()))
            .collect()
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Health check failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageRef, PreserveDraft};
    use chrono::Utc;

    fn ridges() -> Preserve {
        let mut draft = PreserveDraft::new("Ridges Sanctuary")
            .location(44.9, -87.2)
            .amenities(["parking", "trails"])
            .status(PreserveStatus::Published);
        draft.images = vec![
            ImageRef::new("/img/ridges-1.jpg", "Boardwalk"),
            ImageRef::new("/img/ridges-2.jpg", "Range lights"),
        ];
        Preserve::from_fields(PreserveId(11), draft.validate().unwrap(), Utc::now())
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        let preserve = ridges();
        storage.insert(&preserve).await.unwrap();

        let loaded = storage.get(preserve.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Ridges Sanctuary");
        assert_eq!(loaded.images[1].alt, "Range lights");
        assert_eq!(loaded.amenities, preserve.amenities);

        assert!(storage.insert(&preserve).await.is_err());
        storage.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_status_column_tracks_updates() {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        let mut preserve = ridges();
        preserve.status = PreserveStatus::Draft;
        storage.insert(&preserve).await.unwrap();
        assert!(storage.list(Some(PreserveStatus::Published)).await.unwrap().is_empty());

        preserve.status = PreserveStatus::Published;
        assert!(storage.replace(&preserve).await.unwrap());
        assert_eq!(storage.list(Some(PreserveStatus::Published)).await.unwrap().len(), 1);

        assert!(storage.remove(preserve.id).await.unwrap());
        assert!(!storage.remove(preserve.id).await.unwrap());
        assert!(!storage.replace(&preserve).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_backed_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preserves.db");

        {
            let storage = SqliteStorage::open_file(&path).await.unwrap();
            storage.insert(&ridges()).await.unwrap();
        }

        let reopened = SqliteStorage::open_file(&path).await.unwrap();
        assert!(reopened.get(PreserveId(11)).await.unwrap().is_some());
    }
}
