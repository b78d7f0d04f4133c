use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Value type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    String,
    Port,
    Seconds,
    Secret,
}

/// One entry of the settings schema: key, type, validator and default
#[derive(Debug, Clone, Copy)]
pub struct SettingSpec {
    pub key: &'static str,
    pub kind: SettingKind,
    pub default: Option<&'static str>,
    pub validate: fn(&str) -> Result<(), String>,
}

fn non_empty(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(())
    }
}

fn sqlite_url(value: &str) -> Result<(), String> {
    if value.starts_with("sqlite:") {
        Ok(())
    } else {
        Err("must be a sqlite: URL".to_string())
    }
}

fn port(value: &str) -> Result<(), String> {
    value
        .parse::<u16>()
        .map(|_| ())
        .map_err(|_| "must be a port number between 0 and 65535".to_string())
}

fn ttl_seconds(value: &str) -> Result<(), String> {
    match value.parse::<u64>() {
        Ok(secs) if secs <= 86_400 => Ok(()),
        Ok(_) => Err("must be at most 86400 seconds".to_string()),
        Err(_) => Err("must be a whole number of seconds".to_string()),
    }
}

fn admin_token(value: &str) -> Result<(), String> {
    if value.len() >= 16 {
        Ok(())
    } else {
        Err("must be at least 16 characters".to_string())
    }
}

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const SERVER_HOST: &str = "SERVER_HOST";
pub const SERVER_PORT: &str = "SERVER_PORT";
pub const CACHE_TTL_SECS: &str = "CACHE_TTL_SECS";
pub const ADMIN_TOKEN: &str = "ADMIN_TOKEN";
pub const LOG_FILTER: &str = "LOG_FILTER";

/// Every setting the server reads, enumerated up front
pub const SETTINGS: &[SettingSpec] = &[
    SettingSpec {
        key: DATABASE_URL,
        kind: SettingKind::String,
        default: Some("sqlite:data/preserves.db"),
        validate: sqlite_url,
    },
    SettingSpec {
        key: SERVER_HOST,
        kind: SettingKind::String,
        default: Some("0.0.0.0"),
        validate: non_empty,
    },
    SettingSpec {
        key: SERVER_PORT,
        kind: SettingKind::Port,
        default: Some("3000"),
        validate: port,
    },
    SettingSpec {
        key: CACHE_TTL_SECS,
        kind: SettingKind::Seconds,
        default: Some("60"),
        validate: ttl_seconds,
    },
    SettingSpec {
        key: ADMIN_TOKEN,
        kind: SettingKind::Secret,
        default: None,
        validate: admin_token,
    },
    SettingSpec {
        key: LOG_FILTER,
        kind: SettingKind::String,
        default: Some("info"),
        validate: non_empty,
    },
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    pub log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token that identifies administrators. Writes are disabled when unset.
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve every setting through `lookup`, falling back to schema defaults
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |key: &str| -> anyhow::Result<Option<String>> {
            let spec = SETTINGS
                .iter()
                .find(|s| s.key == key)
                .ok_or_else(|| anyhow!("unknown setting {}", key))?;
            let value = lookup(key).or_else(|| spec.default.map(String::from));
            if let Some(value) = &value {
                (spec.validate)(value)
                    .map_err(|reason| anyhow!("invalid {:?} setting {}: {}", spec.kind, key, reason))?;
            }
            Ok(value)
        };
        let required = |key: &str| -> anyhow::Result<String> {
            resolve(key)?.ok_or_else(|| anyhow!("missing setting {}", key))
        };

        Ok(Self {
            database: DatabaseConfig {
                url: required(DATABASE_URL)?,
            },
            server: ServerConfig {
                host: required(SERVER_HOST)?,
                port: required(SERVER_PORT)?
                    .parse()
                    .with_context(|| format!("parsing {}", SERVER_PORT))?,
            },
            cache: CacheConfig {
                ttl_secs: required(CACHE_TTL_SECS)?
                    .parse()
                    .with_context(|| format!("parsing {}", CACHE_TTL_SECS))?,
            },
            auth: AuthConfig {
                admin_token: resolve(ADMIN_TOKEN)?,
            },
            log_filter: required(LOG_FILTER)?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// Filesystem path of an on-disk SQLite database, if the URL names one
    pub fn database_path(&self) -> Option<&str> {
        let path = self
            .database
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.database.url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path == ":memory:" {
            None
        } else {
            Some(path)
        }
    }
}
