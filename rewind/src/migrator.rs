use std::collections::HashSet;

use crate::errors::{BoxError, MigrationError, MigrationResult};
use crate::events::{EventRegistry, MigrationEvent, MigrationEventKind};
use crate::executor;
use crate::migration::{Direction, Migration};
use crate::reconciler::{Reconciliation, reconcile};
use crate::resolver::resolve;
use crate::selector::{SelectionOptions, select};
use crate::source::MigrationSource;
use crate::storage::MigrationStorage;

/// Orchestrates a migration source against a storage backend.
///
/// Nothing is cached: every call re-reads the source and the storage, so
/// definitions added on disk and history written by other tools are seen
/// immediately.
pub struct Migrator<Src, S> {
    source: Src,
    storage: S,
    events: EventRegistry,
}

impl<Src, S> Migrator<Src, S>
where
    Src: MigrationSource,
    S: MigrationStorage,
{
    pub fn new(source: Src, storage: S) -> Self {
        Self {
            source,
            storage,
            events: EventRegistry::new(),
        }
    }

    /// Register a listener for one lifecycle event.
    pub fn on<F>(&mut self, kind: MigrationEventKind, listener: F) -> &mut Self
    where
        F: Fn(&MigrationEvent<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.events.on(kind, listener);
        self
    }

    /// Register a listener for every lifecycle event.
    pub fn on_any<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&MigrationEvent<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.events.on_any(listener);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    /// Resolve the current migration set without touching storage.
    pub async fn migrations(&self) -> MigrationResult<Vec<Migration>> {
        resolve(self.source.migrations().await?)
    }

    /// Fresh partition of the resolved set, including unknown executed names.
    pub async fn reconcile(&self) -> MigrationResult<Reconciliation> {
        let resolved = self.migrations().await?;
        reconcile(resolved, &self.storage).await
    }

    pub async fn pending(&self) -> MigrationResult<Vec<Migration>> {
        Ok(self.reconcile().await?.pending)
    }

    pub async fn executed(&self) -> MigrationResult<Vec<Migration>> {
        Ok(self.reconcile().await?.executed)
    }

    /// Apply pending migrations. Defaults to all of them.
    pub async fn up(&self, options: impl Into<SelectionOptions>) -> MigrationResult<Vec<Migration>> {
        self.run(Direction::Up, options.into()).await
    }

    /// Revert executed migrations. Defaults to the most recent one.
    pub async fn down(&self, options: impl Into<SelectionOptions>) -> MigrationResult<Vec<Migration>> {
        self.run(Direction::Down, options.into()).await
    }

    /// Run the named migrations in the given order.
    ///
    /// Names already in the requested state (executed for up, pending for
    /// down) are skipped, so no migration is applied twice.
    pub async fn execute<I, N>(&self, names: I, direction: Direction) -> MigrationResult<Vec<Migration>>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let reconciliation = self.reconcile().await?;
        let canonical = reconciliation.index();
        let executed: HashSet<&str> = reconciliation.executed.iter().map(Migration::name).collect();

        let mut selection = Vec::new();
        for name in names {
            let name = name.as_ref();
            let Some(&position) = canonical.get(name) else {
                return Err(MigrationError::not_found(name, "resolved"));
            };
            let migration = &reconciliation.resolved[position];

            let already_done = match direction {
                Direction::Up => executed.contains(name),
                Direction::Down => !executed.contains(name),
            };
            if already_done {
                log::debug!("skipping '{name}': already {}", match direction {
                    Direction::Up => "executed",
                    Direction::Down => "pending",
                });
                continue;
            }
            selection.push(migration.clone());
        }

        executor::execute(direction, selection, &self.storage, &self.events).await
    }

    async fn run(&self, direction: Direction, options: SelectionOptions) -> MigrationResult<Vec<Migration>> {
        let reconciliation = self.reconcile().await?;
        let selection = select(direction, &reconciliation, &options)?;
        if selection.is_empty() {
            log::info!("no migrations to {}", match direction {
                Direction::Up => "apply",
                Direction::Down => "revert",
            });
            return Ok(Vec::new());
        }

        executor::execute(direction, selection, &self.storage, &self.events).await
    }
}

impl<Src, S> Migrator<Src, S> {
    /// Consume the migrator, returning its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }
}
