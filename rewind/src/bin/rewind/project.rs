//! Wiring from project configuration to a ready migrator.

use anyhow::{Context, Result};
use regex::Regex;
use rewind::{
    BoxError, Direction, DirectorySource, JsonFileStorage, Migration, MigrationEventKind,
    MigrationFile, MigrationStorage, Migrator, RedisStorage, ScriptCommand, StorageError,
    script_migration,
};

use crate::context::{ProjectContext, StorageKind};
use crate::output::OutputManager;
use crate::theme::direction_icon;

/// File-name pattern for forward scripts: `<name>.up.<ext>`.
pub const UP_SCRIPT_PATTERN: &str = r"^(?P<name>.+)\.up\.[A-Za-z0-9]+$";

/// Storage backend selected by configuration.
pub enum ProjectStorage {
    Json(JsonFileStorage),
    Redis(RedisStorage),
}

impl ProjectStorage {
    pub fn describe(&self) -> String {
        match self {
            ProjectStorage::Json(storage) => format!("json ({})", storage.path().display()),
            ProjectStorage::Redis(storage) => format!("redis (key {})", storage.key()),
        }
    }
}

impl MigrationStorage for ProjectStorage {
    async fn log_migration(&self, name: &str) -> Result<(), StorageError> {
        match self {
            ProjectStorage::Json(storage) => storage.log_migration(name).await,
            ProjectStorage::Redis(storage) => storage.log_migration(name).await,
        }
    }

    async fn unlog_migration(&self, name: &str) -> Result<(), StorageError> {
        match self {
            ProjectStorage::Json(storage) => storage.unlog_migration(name).await,
            ProjectStorage::Redis(storage) => storage.unlog_migration(name).await,
        }
    }

    async fn executed(&self) -> Result<Vec<String>, StorageError> {
        match self {
            ProjectStorage::Json(storage) => storage.executed().await,
            ProjectStorage::Redis(storage) => storage.executed().await,
        }
    }
}

pub async fn open_storage(ctx: &ProjectContext) -> Result<ProjectStorage> {
    let settings = &ctx.config.storage;
    let storage = match settings.kind {
        StorageKind::Json => ProjectStorage::Json(JsonFileStorage::new(ctx.storage_path())),
        StorageKind::Redis => {
            let url = ctx.redis_url()?;
            let storage = RedisStorage::connect(&url)
                .await
                .context("Failed to connect to Redis")?
                .with_key(&settings.key);
            ProjectStorage::Redis(storage)
        }
    };
    Ok(storage)
}

pub type ScriptLoader = Box<dyn Fn(MigrationFile) -> Result<Migration, BoxError>>;

pub type ProjectMigrator = Migrator<DirectorySource<ScriptLoader>, ProjectStorage>;

/// Migrator over the project's scripts and storage, printing each step.
pub async fn open_migrator(ctx: &ProjectContext, output: &OutputManager) -> Result<ProjectMigrator> {
    let command = ScriptCommand::from_argv(&ctx.config.migrations.command)
        .context("migrations.command must name a program")?;
    let pattern = Regex::new(UP_SCRIPT_PATTERN).context("Invalid script pattern")?;
    let loader: ScriptLoader = Box::new(move |file: MigrationFile| -> Result<Migration, BoxError> {
        Ok(script_migration(file, &command))
    });

    let storage = open_storage(ctx).await?;
    output.verbose(&format!("Storage: {}", storage.describe()));

    let source = DirectorySource::new(ctx.migrations_dir(), pattern, loader);
    let mut migrator = Migrator::new(source, storage);

    let printer = OutputManager::new(output.options.clone());
    migrator.on_any(move |event| {
        match event.kind {
            MigrationEventKind::Migrating => printer.step(direction_icon(Direction::Up), &format!("{} ...", event.name)),
            MigrationEventKind::Reverting => printer.step(direction_icon(Direction::Down), &format!("{} ...", event.name)),
            MigrationEventKind::Migrated => printer.success(&format!("Applied {}", event.name)),
            MigrationEventKind::Reverted => printer.success(&format!("Reverted {}", event.name)),
        }
        Ok(())
    });

    Ok(migrator)
}
