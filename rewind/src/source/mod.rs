//! Migration sources.
//!
//! A source yields the raw, ordered migration list. It is consulted on every
//! orchestration call so new definitions are picked up without a restart.

mod directory;
mod script;

use std::future::Future;

use crate::errors::MigrationResult;
use crate::migration::Migration;

pub use directory::{DirectorySource, MigrationFile};
pub use script::{ScriptCommand, script_migration};

#[allow(async_fn_in_trait)]
pub trait MigrationSource {
    async fn migrations(&self) -> MigrationResult<Vec<Migration>>;
}

impl MigrationSource for Vec<Migration> {
    async fn migrations(&self) -> MigrationResult<Vec<Migration>> {
        Ok(self.clone())
    }
}

/// Deferred source backed by an async thunk.
pub struct FnSource<F> {
    thunk: F,
}

impl<F, Fut> FnSource<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = MigrationResult<Vec<Migration>>>,
{
    pub fn new(thunk: F) -> Self {
        Self { thunk }
    }
}

impl<F, Fut> MigrationSource for FnSource<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = MigrationResult<Vec<Migration>>>,
{
    async fn migrations(&self) -> MigrationResult<Vec<Migration>> {
        (self.thunk)().await
    }
}
