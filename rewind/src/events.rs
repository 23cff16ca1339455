//! Lifecycle notifications emitted around each migration step.

use std::fmt;

use serde::Serialize;

use crate::errors::BoxError;
use crate::migration::{Direction, Migration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationEventKind {
    Migrating,
    Migrated,
    Reverting,
    Reverted,
}

impl MigrationEventKind {
    pub(crate) fn before(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Migrating,
            Direction::Down => Self::Reverting,
        }
    }

    pub(crate) fn after(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Migrated,
            Direction::Down => Self::Reverted,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Migrating => "migrating",
            Self::Migrated => "migrated",
            Self::Reverting => "reverting",
            Self::Reverted => "reverted",
        }
    }
}

impl fmt::Display for MigrationEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered to listeners.
#[derive(Debug, Clone, Copy)]
pub struct MigrationEvent<'a> {
    pub kind: MigrationEventKind,
    pub name: &'a str,
    pub migration: &'a Migration,
}

pub type Listener = Box<dyn Fn(&MigrationEvent<'_>) -> Result<(), BoxError> + Send + Sync>;

/// Ordered listener registry. Listeners run synchronously in registration order.
#[derive(Default)]
pub struct EventRegistry {
    listeners: Vec<(Option<MigrationEventKind>, Listener)>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for a single event kind.
    pub fn on<F>(&mut self, kind: MigrationEventKind, listener: F)
    where
        F: Fn(&MigrationEvent<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.listeners.push((Some(kind), Box::new(listener)));
    }

    /// Register a listener for every event kind.
    pub fn on_any<F>(&mut self, listener: F)
    where
        F: Fn(&MigrationEvent<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.listeners.push((None, Box::new(listener)));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event; the first listener error stops delivery.
    pub fn emit(&self, event: &MigrationEvent<'_>) -> Result<(), BoxError> {
        for (filter, listener) in &self.listeners {
            if filter.is_none_or(|kind| kind == event.kind) {
                listener(event)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
