use std::sync::{Arc, Mutex, MutexGuard};

use super::MigrationStorage;
use crate::errors::StorageError;

/// In-process storage. Clones share the same ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    executed: Arc<Mutex<Vec<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with executed names.
    pub fn with_executed<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let storage = Self::new();
        {
            let mut executed = storage.executed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            for name in names {
                let name = name.into();
                if !executed.contains(&name) {
                    executed.push(name);
                }
            }
        }
        storage
    }

    /// Snapshot of the ledger in insertion order.
    pub fn snapshot(&self) -> Vec<String> {
        self.ledger().map(|executed| executed.clone()).unwrap_or_default()
    }

    fn ledger(&self) -> Result<MutexGuard<'_, Vec<String>>, StorageError> {
        self.executed
            .lock()
            .map_err(|_| StorageError::other("memory storage lock poisoned"))
    }
}

impl MigrationStorage for MemoryStorage {
    async fn log_migration(&self, name: &str) -> Result<(), StorageError> {
        let mut executed = self.ledger()?;
        if !executed.iter().any(|n| n == name) {
            executed.push(name.to_string());
        }
        Ok(())
    }

    async fn unlog_migration(&self, name: &str) -> Result<(), StorageError> {
        self.ledger()?.retain(|n| n != name);
        Ok(())
    }

    async fn executed(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.ledger()?.clone())
    }
}
