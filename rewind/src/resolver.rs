use std::collections::HashSet;

use crate::errors::{MigrationError, MigrationResult};
use crate::migration::Migration;

/// Validate a raw migration list into the canonical ordered set.
///
/// Order is taken as given; sources are responsible for sorting.
pub fn resolve(migrations: Vec<Migration>) -> MigrationResult<Vec<Migration>> {
    validate(&migrations)?;
    Ok(migrations)
}

fn validate(migrations: &[Migration]) -> MigrationResult<()> {
    let mut seen = HashSet::with_capacity(migrations.len());

    for (index, migration) in migrations.iter().enumerate() {
        if migration.name().trim().is_empty() {
            return Err(MigrationError::InvalidMigrationDefinition {
                index,
                message: "migration name is empty".to_string(),
            });
        }
        if !migration.has_up() {
            return Err(MigrationError::InvalidMigrationDefinition {
                index,
                message: format!("migration '{}' has no up action", migration.name()),
            });
        }
        if !seen.insert(migration.name()) {
            return Err(MigrationError::DuplicateMigrationName {
                name: migration.name().to_string(),
            });
        }
    }

    Ok(())
}
