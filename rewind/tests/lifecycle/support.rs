pub(crate) use rewind::{
    BoxError, Direction, MemoryStorage, Migration, MigrationError, MigrationEventKind,
    MigrationStorage, Migrator, Rerun, SelectionOptions, StorageError, migration::names,
};
pub(crate) use std::sync::atomic::{AtomicUsize, Ordering};
pub(crate) use std::sync::{Arc, Mutex};

/// Shared log of every action invoked, as `up:NAME` / `down:NAME`.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }
}

/// Reversible migration that records both actions in `journal`.
pub(crate) fn tracked(name: &str, journal: &Journal) -> Migration {
    let up_journal = journal.clone();
    let up_name = format!("up:{name}");
    let down_journal = journal.clone();
    let down_name = format!("down:{name}");
    Migration::new(name, move || {
        let journal = up_journal.clone();
        let entry = up_name.clone();
        async move {
            journal.record(entry);
            Ok(())
        }
    })
    .with_down(move || {
        let journal = down_journal.clone();
        let entry = down_name.clone();
        async move {
            journal.record(entry);
            Ok(())
        }
    })
}

/// Migration whose forward action always fails.
pub(crate) fn failing(name: &str, journal: &Journal) -> Migration {
    let journal = journal.clone();
    let entry = format!("up:{name}");
    Migration::new(name, move || {
        let journal = journal.clone();
        let entry = entry.clone();
        async move {
            journal.record(entry);
            Err::<(), BoxError>("boom".into())
        }
    })
}

pub(crate) fn tracked_set(names: &[&str], journal: &Journal) -> Vec<Migration> {
    names.iter().map(|name| tracked(name, journal)).collect()
}

/// Memory storage that counts every call made against it.
#[derive(Clone, Default)]
pub(crate) struct CountingStorage {
    pub(crate) inner: MemoryStorage,
    calls: Arc<AtomicUsize>,
}

impl CountingStorage {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MigrationStorage for CountingStorage {
    async fn log_migration(&self, name: &str) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.log_migration(name).await
    }

    async fn unlog_migration(&self, name: &str) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.unlog_migration(name).await
    }

    async fn executed(&self) -> Result<Vec<String>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.executed().await
    }
}

/// Storage that reads fine but rejects every write.
#[derive(Clone, Default)]
pub(crate) struct ReadOnlyStorage;

impl MigrationStorage for ReadOnlyStorage {
    async fn log_migration(&self, _name: &str) -> Result<(), StorageError> {
        Err(StorageError::other("read-only"))
    }

    async fn unlog_migration(&self, _name: &str) -> Result<(), StorageError> {
        Err(StorageError::other("read-only"))
    }

    async fn executed(&self) -> Result<Vec<String>, StorageError> {
        Ok(Vec::new())
    }
}
