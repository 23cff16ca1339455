//! Migration records and the action type they carry.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::BoxError;

/// Future returned by a migration action.
pub type MigrationFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'static>>;

/// Shared async action. Cloning only bumps a reference count.
pub type MigrationFn = Arc<dyn Fn() -> MigrationFuture + Send + Sync + 'static>;

/// Direction a migration is run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wrap an async closure into a [`MigrationFn`].
pub fn action<F, Fut>(f: F) -> MigrationFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()) as MigrationFuture)
}

/// A named, reversible unit of change.
#[derive(Clone)]
pub struct Migration {
    name: String,
    up: Option<MigrationFn>,
    down: Option<MigrationFn>,
    path: Option<PathBuf>,
}

impl Migration {
    /// Create a migration with a forward action.
    pub fn new<F, Fut>(name: impl Into<String>, up: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::named(name).with_up(up)
    }

    /// Create a bare definition. The resolver rejects it until `up` is set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            up: None,
            down: None,
            path: None,
        }
    }

    pub fn with_up<F, Fut>(mut self, up: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.up = Some(action(up));
        self
    }

    pub fn with_down<F, Fut>(mut self, down: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.down = Some(action(down));
        self
    }

    /// Set the forward action from an already-wrapped function.
    pub fn with_up_fn(mut self, up: MigrationFn) -> Self {
        self.up = Some(up);
        self
    }

    /// Set the reverse action from an already-wrapped function.
    pub fn with_down_fn(mut self, down: MigrationFn) -> Self {
        self.down = Some(down);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn has_up(&self) -> bool {
        self.up.is_some()
    }

    pub fn is_reversible(&self) -> bool {
        self.down.is_some()
    }

    pub(crate) fn action(&self, direction: Direction) -> Option<&MigrationFn> {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
        }
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("name", &self.name)
            .field("up", &self.up.is_some())
            .field("down", &self.down.is_some())
            .field("path", &self.path)
            .finish()
    }
}

/// Names of a migration list, in order.
pub fn names(migrations: &[Migration]) -> Vec<String> {
    migrations.iter().map(|m| m.name.clone()).collect()
}
