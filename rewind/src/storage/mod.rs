//! Execution-history storage.
//!
//! The engine only needs three capabilities from a backend; each adapter in
//! this module is self-contained:
//! - `MemoryStorage` - process-local, for tests and embedding
//! - `JsonFileStorage` - JSON document on disk
//! - `RedisStorage` - Redis hash, one field per executed migration

mod json;
mod memory;
mod redis_store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;

pub use json::JsonFileStorage;
pub use memory::MemoryStorage;
pub use redis_store::{DEFAULT_REDIS_KEY, RedisStorage};

/// Ledger of executed migration names.
///
/// Logging an already-logged name and unlogging an unknown one should be
/// no-ops so retries after partial failures stay safe.
#[allow(async_fn_in_trait)]
pub trait MigrationStorage {
    /// Record `name` as executed.
    async fn log_migration(&self, name: &str) -> Result<(), StorageError>;

    /// Remove the execution record for `name`.
    async fn unlog_migration(&self, name: &str) -> Result<(), StorageError>;

    /// All currently recorded names. Order is not significant to the engine.
    async fn executed(&self) -> Result<Vec<String>, StorageError>;
}

impl<S: MigrationStorage + ?Sized> MigrationStorage for &S {
    async fn log_migration(&self, name: &str) -> Result<(), StorageError> {
        (**self).log_migration(name).await
    }

    async fn unlog_migration(&self, name: &str) -> Result<(), StorageError> {
        (**self).unlog_migration(name).await
    }

    async fn executed(&self) -> Result<Vec<String>, StorageError> {
        (**self).executed().await
    }
}

/// Persisted execution record used by the file and Redis adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Migration name (e.g., "20241228_100000_init")
    pub name: String,
    /// When the migration was executed
    pub executed_at: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn now(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executed_at: Utc::now(),
        }
    }
}
