use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::{ExecutionRecord, MigrationStorage};
use crate::errors::StorageError;

/// Stores execution records as a pretty-printed JSON array.
///
/// A missing file reads as an empty history. Writes are serialised within
/// the process; concurrent processes are not coordinated.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full records, in the order they were written.
    pub async fn records(&self) -> Result<Vec<ExecutionRecord>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    async fn write_records(&self, records: &[ExecutionRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Replace the file in one step so a crash never leaves it half written.
        let json = serde_json::to_string_pretty(records)?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, json).await?;
        if let Err(err) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl MigrationStorage for JsonFileStorage {
    async fn log_migration(&self, name: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.records().await?;
        if records.iter().any(|r| r.name == name) {
            return Ok(());
        }
        records.push(ExecutionRecord::now(name));
        self.write_records(&records).await
    }

    async fn unlog_migration(&self, name: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.records().await?;
        let before = records.len();
        records.retain(|r| r.name != name);
        if records.len() == before {
            return Ok(());
        }
        self.write_records(&records).await
    }

    async fn executed(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.records().await?.into_iter().map(|r| r.name).collect())
    }
}
