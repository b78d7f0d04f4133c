// Core infrastructure modules
pub mod id_generator;          // Preserve ID generation
pub mod middleware;            // Viewer context middleware and extractor
pub mod published_cache;       // Time-boxed cache of the published collection
pub mod sqlite_storage;        // SQLite storage backend
pub mod storage;               // Storage trait and in-memory backend
pub mod viewer;                // Viewer context and write policies

pub use id_generator::PreserveIdGenerator;
pub use published_cache::{PublishedCache, PublishedSnapshot};
pub use sqlite_storage::SqliteStorage;
pub use storage::{MemoryStorage, PreserveStorage};
pub use viewer::{AdministratorsOnly, PredicatePolicy, ViewerContext, ViewerRole, WritePolicy};
