//! Rewind core library.
//!
//! Tracks and applies an ordered set of reversible migrations against an
//! external target. Each call re-resolves the migration source, reconciles
//! it against the storage ledger, selects a subset and runs it in order.
//!
//! ```no_run
//! use rewind::{Migration, MemoryStorage, Migrator, SelectionOptions};
//!
//! # async fn example() -> Result<(), rewind::MigrationError> {
//! let migrations = vec![
//!     Migration::new("001_init", || async { Ok(()) }).with_down(|| async { Ok(()) }),
//!     Migration::new("002_users", || async { Ok(()) }).with_down(|| async { Ok(()) }),
//! ];
//! let migrator = Migrator::new(migrations, MemoryStorage::new());
//!
//! migrator.up(SelectionOptions::new()).await?;
//! migrator.down(SelectionOptions::new().to_start()).await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod events;
pub mod executor;
pub mod migration;
pub mod migrator;
pub mod reconciler;
pub mod resolver;
pub mod selector;
pub mod source;
pub mod storage;

pub use errors::*;
pub use events::{EventRegistry, MigrationEvent, MigrationEventKind};
pub use migration::{Direction, Migration, MigrationFn, action};
pub use migrator::Migrator;
pub use reconciler::Reconciliation;
pub use selector::{Rerun, SelectionOptions, Target};
pub use source::{DirectorySource, FnSource, MigrationFile, MigrationSource, ScriptCommand, script_migration};
pub use storage::{ExecutionRecord, JsonFileStorage, MemoryStorage, MigrationStorage, RedisStorage};

// Re-export redis types so users don't need to depend on a specific redis version
pub use redis;
pub use redis::aio::ConnectionManager;
