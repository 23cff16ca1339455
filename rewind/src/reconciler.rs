use std::collections::{HashMap, HashSet};

use crate::errors::{MigrationError, MigrationResult};
use crate::migration::Migration;
use crate::storage::MigrationStorage;

/// Resolved migrations split by execution state, both in canonical order.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Every resolved migration.
    pub resolved: Vec<Migration>,
    pub executed: Vec<Migration>,
    pub pending: Vec<Migration>,
    /// Executed names with no matching definition.
    pub unknown: Vec<String>,
}

impl Reconciliation {
    /// Partition `resolved` against a set of executed names.
    pub fn from_names(resolved: Vec<Migration>, executed_names: Vec<String>) -> Self {
        let (executed, pending, unknown) = {
            let executed_set: HashSet<&str> = executed_names.iter().map(String::as_str).collect();
            let known: HashSet<&str> = resolved.iter().map(Migration::name).collect();

            let mut reported = HashSet::new();
            let unknown: Vec<String> = executed_names
                .iter()
                .filter(|name| !known.contains(name.as_str()) && reported.insert(name.as_str()))
                .cloned()
                .collect();

            let (executed, pending): (Vec<Migration>, Vec<Migration>) = resolved
                .iter()
                .cloned()
                .partition(|m| executed_set.contains(m.name()));
            (executed, pending, unknown)
        };

        Self {
            resolved,
            executed,
            pending,
            unknown,
        }
    }

    pub fn has_unknown(&self) -> bool {
        !self.unknown.is_empty()
    }

    /// Position of `name` in canonical order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.resolved.iter().position(|m| m.name() == name)
    }

    /// Name to canonical position, for repeated lookups.
    pub fn index(&self) -> HashMap<&str, usize> {
        self.resolved
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name(), i))
            .collect()
    }
}

/// Read the executed-name set and partition `resolved` against it.
pub async fn reconcile<S>(resolved: Vec<Migration>, storage: &S) -> MigrationResult<Reconciliation>
where
    S: MigrationStorage,
{
    let executed_names = storage
        .executed()
        .await
        .map_err(MigrationError::StorageReadFailed)?;

    let reconciliation = Reconciliation::from_names(resolved, executed_names);
    if reconciliation.has_unknown() {
        log::warn!(
            "executed migrations without a definition: {}",
            reconciliation.unknown.join(", ")
        );
    }

    Ok(reconciliation)
}
