use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::MigrationFile;
use crate::errors::BoxError;
use crate::migration::{Migration, MigrationFn, MigrationFuture};

/// Program (plus leading arguments) used to run script migrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCommand {
    program: String,
    args: Vec<String>,
}

impl ScriptCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Build from `["psql", "-f"]` style argv. `None` when empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, script: &Path) -> Result<(), BoxError> {
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(script)
            .output()
            .await?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!(
            "{} exited with {}: {}",
            script.display(),
            output.status,
            stderr.trim()
        )
        .into())
    }
}

/// Build a migration from a `<name>.up.<ext>` script.
///
/// The reverse action runs the sibling `<name>.down.<ext>` when that file
/// exists; otherwise the migration is not revertible.
pub fn script_migration(file: MigrationFile, command: &ScriptCommand) -> Migration {
    let command = Arc::new(command.clone());
    let up = script_action(Arc::clone(&command), file.path.clone());

    let mut migration = Migration::named(file.name).with_up_fn(up);
    if let Some(down_path) = down_script_path(&file.path)
        && down_path.is_file()
    {
        migration = migration.with_down_fn(script_action(command, down_path));
    }
    migration.with_path(file.path)
}

fn script_action(command: Arc<ScriptCommand>, script: PathBuf) -> MigrationFn {
    Arc::new(move || {
        let command = Arc::clone(&command);
        let script = script.clone();
        Box::pin(async move { command.run(&script).await }) as MigrationFuture
    })
}

/// `a/001_init.up.sql` -> `a/001_init.down.sql`.
pub(crate) fn down_script_path(up_path: &Path) -> Option<PathBuf> {
    let file_name = up_path.file_name()?.to_str()?;
    let index = file_name.rfind(".up.")?;
    let down_name = format!("{}.down.{}", &file_name[..index], &file_name[index + 4..]);
    Some(up_path.with_file_name(down_name))
}
