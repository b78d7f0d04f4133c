use anyhow::Context;
use std::sync::Arc;

use crate::{
    api::ReadApi,
    config::Config,
    infrastructure::{
        middleware::HasAdminToken, AdministratorsOnly, PreserveStorage, SqliteStorage, WritePolicy,
    },
    services::PreserveStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PreserveStore>,
    pub read_api: ReadApi,
    pub config: Config,
}

impl AppState {
    /// Build state backed by the SQLite database named in the configuration
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        if let Some(path) = config.database_path() {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating database directory {}", parent.display()))?;
                }
            }
        }

        let storage = SqliteStorage::connect(&config.database.url)
            .await
            .context("opening preserve database")?;
        Ok(Self::with_storage(config, Arc::new(storage), Arc::new(AdministratorsOnly)))
    }

    pub fn with_storage(
        config: Config,
        storage: Arc<dyn PreserveStorage>,
        policy: Arc<dyn WritePolicy>,
    ) -> Self {
        let store = Arc::new(PreserveStore::new(storage, policy));
        let read_api = ReadApi::new(store.clone(), config.cache_ttl());
        Self {
            store,
            read_api,
            config,
        }
    }
}

impl HasAdminToken for AppState {
    fn admin_token(&self) -> Option<&str> {
        self.config.auth.admin_token.as_deref()
    }
}
