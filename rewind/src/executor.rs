//! Sequential, fail-fast execution of a selection.

use std::time::Instant;

use crate::errors::{MigrationError, MigrationResult};
use crate::events::{EventRegistry, MigrationEvent, MigrationEventKind};
use crate::migration::{Direction, Migration};
use crate::storage::MigrationStorage;

/// Run `selection` in order, recording each success in `storage`.
///
/// Stops at the first failure. Steps completed before it stay applied and
/// recorded; their names are carried by the returned error.
pub async fn execute<S>(
    direction: Direction,
    selection: Vec<Migration>,
    storage: &S,
    events: &EventRegistry,
) -> MigrationResult<Vec<Migration>>
where
    S: MigrationStorage,
{
    let mut completed: Vec<Migration> = Vec::with_capacity(selection.len());

    for migration in selection {
        let started = Instant::now();
        let name = migration.name().to_string();

        emit(events, MigrationEventKind::before(direction), &migration, &completed)?;

        let Some(action) = migration.action(direction) else {
            log::error!("cannot revert {name}: no down action");
            return Err(MigrationError::MissingReverseAction {
                name,
                completed: completed_names(&completed),
            });
        };

        log::info!("{}: {name}", MigrationEventKind::before(direction));
        if let Err(source) = action().await {
            log::error!("{name} failed while running {direction}: {source}");
            return Err(MigrationError::ActionFailed {
                name,
                direction,
                completed: completed_names(&completed),
                source,
            });
        }

        let recorded = match direction {
            Direction::Up => storage.log_migration(&name).await,
            Direction::Down => storage.unlog_migration(&name).await,
        };
        if let Err(source) = recorded {
            log::error!("{name} ran but storage was not updated: {source}");
            return Err(MigrationError::StorageWriteFailed {
                name,
                direction,
                completed: completed_names(&completed),
                source,
            });
        }

        log::info!(
            "{}: {name} ({}ms)",
            MigrationEventKind::after(direction),
            started.elapsed().as_millis()
        );

        // Storage already reflects this step, so a failing after-listener
        // must report it as completed.
        completed.push(migration.clone());
        emit(events, MigrationEventKind::after(direction), &migration, &completed)?;
    }

    Ok(completed)
}

fn emit(
    events: &EventRegistry,
    kind: MigrationEventKind,
    migration: &Migration,
    completed: &[Migration],
) -> MigrationResult<()> {
    let event = MigrationEvent {
        kind,
        name: migration.name(),
        migration,
    };
    events.emit(&event).map_err(|source| {
        log::error!("{kind} listener failed for {}: {source}", migration.name());
        MigrationError::ListenerFailed {
            name: migration.name().to_string(),
            event: kind,
            completed: completed_names(completed),
            source,
        }
    })
}

fn completed_names(completed: &[Migration]) -> Vec<String> {
    completed.iter().map(|m| m.name().to_string()).collect()
}
