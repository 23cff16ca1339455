//! Selection of the exact, ordered subset of migrations to run.
//!
//! Two mutually exclusive modes:
//! - explicit names, restricted to the partition eligible for the direction
//! - a range over that partition, `from` exclusive and `to` inclusive
//!
//! Down ranges walk history backwards (newest first) and default to a
//! single step.

use std::collections::HashSet;

use crate::errors::{MigrationError, MigrationResult};
use crate::migration::{Direction, Migration};
use crate::reconciler::Reconciliation;

/// Inclusive `to` bound of a range selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Stop at (and include) the named migration.
    Name(String),
    /// Revert everything. Only meaningful for down.
    Start,
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Name(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Name(name)
    }
}

/// What to do with explicitly named migrations outside the eligible partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rerun {
    /// Fail with `MigrationNotFound`.
    #[default]
    Throw,
    /// Leave them out of the selection.
    Skip,
    /// Run them anyway.
    Allow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    pub migrations: Option<Vec<String>>,
    pub from: Option<String>,
    pub to: Option<Target>,
    pub step: Option<usize>,
    pub rerun: Rerun,
    /// Keep the caller's order for explicit names instead of canonical order.
    pub preserve_order: bool,
}

impl SelectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            migrations: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_from(mut self, name: impl Into<String>) -> Self {
        self.from = Some(name.into());
        self
    }

    pub fn with_to(mut self, target: impl Into<Target>) -> Self {
        self.to = Some(target.into());
        self
    }

    /// `to = 0`: revert all executed migrations.
    pub fn to_start(mut self) -> Self {
        self.to = Some(Target::Start);
        self
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_rerun(mut self, rerun: Rerun) -> Self {
        self.rerun = rerun;
        self
    }

    pub fn preserving_order(mut self) -> Self {
        self.preserve_order = true;
        self
    }
}

impl From<&str> for SelectionOptions {
    fn from(name: &str) -> Self {
        Self::names([name])
    }
}

impl From<String> for SelectionOptions {
    fn from(name: String) -> Self {
        Self::names([name])
    }
}

impl From<Vec<String>> for SelectionOptions {
    fn from(names: Vec<String>) -> Self {
        Self::names(names)
    }
}

impl From<Vec<&str>> for SelectionOptions {
    fn from(names: Vec<&str>) -> Self {
        Self::names(names)
    }
}

impl From<&[&str]> for SelectionOptions {
    fn from(names: &[&str]) -> Self {
        Self::names(names.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for SelectionOptions {
    fn from(names: [&str; N]) -> Self {
        Self::names(names)
    }
}

/// Compute the ordered migrations to run for `direction`.
pub fn select(
    direction: Direction,
    reconciliation: &Reconciliation,
    options: &SelectionOptions,
) -> MigrationResult<Vec<Migration>> {
    let selection = match &options.migrations {
        Some(names) => select_named(direction, reconciliation, names, options)?,
        None => select_range(direction, reconciliation, options)?,
    };

    log::debug!(
        "selected {} migration(s) for {direction}: [{}]",
        selection.len(),
        selection.iter().map(Migration::name).collect::<Vec<_>>().join(", ")
    );
    Ok(selection)
}

fn eligible(direction: Direction, reconciliation: &Reconciliation) -> (&[Migration], &'static str) {
    match direction {
        Direction::Up => (reconciliation.pending.as_slice(), "pending"),
        Direction::Down => (reconciliation.executed.as_slice(), "executed"),
    }
}

fn select_named(
    direction: Direction,
    reconciliation: &Reconciliation,
    names: &[String],
    options: &SelectionOptions,
) -> MigrationResult<Vec<Migration>> {
    if options.from.is_some() || options.to.is_some() || options.step.is_some() {
        return Err(MigrationError::invalid_selection(
            "explicit migrations cannot be combined with from, to or step",
        ));
    }

    let (partition, scope) = eligible(direction, reconciliation);
    let canonical = reconciliation.index();
    let in_partition: HashSet<&str> = partition.iter().map(Migration::name).collect();
    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(names.len());

    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }

        let Some(&position) = canonical.get(name.as_str()) else {
            return Err(MigrationError::not_found(name.clone(), "resolved"));
        };
        let migration = &reconciliation.resolved[position];

        if in_partition.contains(name.as_str()) {
            selected.push(migration.clone());
            continue;
        }

        match options.rerun {
            Rerun::Throw => return Err(MigrationError::not_found(name.clone(), scope)),
            Rerun::Skip => log::debug!("skipping '{name}': not {scope}"),
            Rerun::Allow => selected.push(migration.clone()),
        }
    }

    if !options.preserve_order {
        selected.sort_by_key(|m| canonical.get(m.name()).copied().unwrap_or(usize::MAX));
    }

    Ok(selected)
}

fn select_range(
    direction: Direction,
    reconciliation: &Reconciliation,
    options: &SelectionOptions,
) -> MigrationResult<Vec<Migration>> {
    if options.step.is_some() && options.to.is_some() {
        return Err(MigrationError::invalid_selection("step cannot be combined with to"));
    }
    if options.step == Some(0) {
        return Err(MigrationError::invalid_selection("step must be at least 1"));
    }
    if direction == Direction::Up && options.to == Some(Target::Start) {
        return Err(MigrationError::invalid_selection(
            "to = 0 only applies when reverting",
        ));
    }

    let (partition, scope) = eligible(direction, reconciliation);
    let base: Vec<&Migration> = match direction {
        Direction::Up => partition.iter().collect(),
        Direction::Down => partition.iter().rev().collect(),
    };

    let index_of = |name: &str| {
        base.iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| MigrationError::not_found(name, scope))
    };

    let start = match &options.from {
        Some(from) => index_of(from.as_str())? + 1,
        None => 0,
    };

    let end = match (&options.to, direction) {
        (Some(Target::Name(to)), _) => index_of(to.as_str())? + 1,
        (Some(Target::Start), _) => base.len(),
        (None, Direction::Up) => base.len(),
        (None, Direction::Down) if options.step.is_some() => base.len(),
        (None, Direction::Down) => (start + 1).min(base.len()),
    };

    if end < start {
        return Err(MigrationError::invalid_selection(format!(
            "'{}' comes before '{}' in {scope} order",
            describe(&options.to),
            options.from.as_deref().unwrap_or_default()
        )));
    }

    let take = options.step.unwrap_or(usize::MAX);
    Ok(base[start..end].iter().take(take).map(|m| (*m).clone()).collect())
}

fn describe(target: &Option<Target>) -> &str {
    match target {
        Some(Target::Name(name)) => name,
        Some(Target::Start) => "0",
        None => "",
    }
}
