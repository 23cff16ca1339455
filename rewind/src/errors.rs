use std::borrow::Cow;

use thiserror::Error;

use crate::events::MigrationEventKind;
use crate::migration::Direction;

/// Boxed error produced by migration actions, listeners and loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type returned by the orchestration engine.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Two migrations in the resolved set share a name.
    #[error("duplicate migration name '{name}'")]
    DuplicateMigrationName { name: String },

    /// A migration definition is unusable (blank name, no forward action).
    #[error("invalid migration definition at position {index}: {message}")]
    InvalidMigrationDefinition { index: usize, message: String },

    /// Selection options that cannot be combined or applied.
    #[error("invalid selection options: {message}")]
    InvalidSelectionOptions { message: String },

    /// A named migration is unknown or not eligible for the requested direction.
    #[error("migration '{name}' not found among {scope} migrations")]
    MigrationNotFound { name: String, scope: Cow<'static, str> },

    /// Reverting a migration that has no `down` action.
    #[error("migration '{name}' cannot be reverted: no down action")]
    MissingReverseAction { name: String, completed: Vec<String> },

    /// The action ran but its execution record could not be written.
    #[error("migration '{name}' ({direction}) ran but storage was not updated: {source}")]
    StorageWriteFailed {
        name: String,
        direction: Direction,
        completed: Vec<String>,
        #[source]
        source: StorageError,
    },

    /// The executed-name set could not be read.
    #[error("failed to read executed migrations: {0}")]
    StorageReadFailed(#[source] StorageError),

    /// The migration's own action failed.
    #[error("migration '{name}' failed while running {direction}: {source}")]
    ActionFailed {
        name: String,
        direction: Direction,
        completed: Vec<String>,
        #[source]
        source: BoxError,
    },

    /// A lifecycle listener rejected the step.
    #[error("listener for '{event}' on migration '{name}' failed: {source}")]
    ListenerFailed {
        name: String,
        event: MigrationEventKind,
        completed: Vec<String>,
        #[source]
        source: BoxError,
    },

    /// Migration discovery or loading failed.
    #[error("failed to load migrations: {message}")]
    Source {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl MigrationError {
    pub(crate) fn not_found(name: impl Into<String>, scope: impl Into<Cow<'static, str>>) -> Self {
        Self::MigrationNotFound {
            name: name.into(),
            scope: scope.into(),
        }
    }

    pub(crate) fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelectionOptions {
            message: message.into(),
        }
    }

    /// Names of the migrations that completed before an execution failure.
    ///
    /// Empty for errors raised before any migration ran.
    pub fn completed(&self) -> &[String] {
        match self {
            Self::MissingReverseAction { completed, .. }
            | Self::StorageWriteFailed { completed, .. }
            | Self::ActionFailed { completed, .. }
            | Self::ListenerFailed { completed, .. } => completed,
            _ => &[],
        }
    }

    /// Name of the migration the error is about, when there is one.
    pub fn migration_name(&self) -> Option<&str> {
        match self {
            Self::DuplicateMigrationName { name }
            | Self::MigrationNotFound { name, .. }
            | Self::MissingReverseAction { name, .. }
            | Self::StorageWriteFailed { name, .. }
            | Self::ActionFailed { name, .. }
            | Self::ListenerFailed { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Failure inside a storage adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl StorageError {
    pub fn other(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

pub type MigrationResult<T> = Result<T, MigrationError>;
