//! Execution history kept in a Redis hash.

use std::collections::HashMap;

use redis::aio::ConnectionManager;

use super::{ExecutionRecord, MigrationStorage};
use crate::errors::StorageError;

/// Default key holding the migration hash.
pub const DEFAULT_REDIS_KEY: &str = "_rewind:migrations";

/// Redis-backed storage: `HSET <key> <name> <record json>`.
#[derive(Clone)]
pub struct RedisStorage {
    conn: ConnectionManager,
    key: String,
}

impl RedisStorage {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            key: DEFAULT_REDIS_KEY.to_string(),
        }
    }

    /// Connect to `redis_url` with a managed connection.
    pub async fn connect(redis_url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn))
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All records, oldest first.
    pub async fn records(&self) -> Result<Vec<ExecutionRecord>, StorageError> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(&self.key)
            .query_async(&mut conn)
            .await?;

        decode_records(raw)
    }
}

fn decode_records(raw: HashMap<String, String>) -> Result<Vec<ExecutionRecord>, StorageError> {
    let mut records = raw
        .into_values()
        .map(|json| serde_json::from_str::<ExecutionRecord>(&json))
        .collect::<Result<Vec<_>, _>>()?;
    records.sort_by(|a, b| a.executed_at.cmp(&b.executed_at).then_with(|| a.name.cmp(&b.name)));
    Ok(records)
}

impl MigrationStorage for RedisStorage {
    async fn log_migration(&self, name: &str) -> Result<(), StorageError> {
        let record = serde_json::to_string(&ExecutionRecord::now(name))?;
        let mut conn = self.conn.clone();
        // HSETNX keeps the original timestamp when a name is logged twice.
        let _: bool = redis::cmd("HSETNX")
            .arg(&self.key)
            .arg(name)
            .arg(record)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn unlog_migration(&self, name: &str) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let _: u64 = redis::cmd("HDEL")
            .arg(&self.key)
            .arg(name)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn executed(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.records().await?.into_iter().map(|r| r.name).collect())
    }
}
