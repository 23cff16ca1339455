use anyhow::{Context, Result};
use clap::Args;

use crate::context::{ProjectContext, StorageKind};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Initialize",
    commands: &[
        "rewind init                      # JSON ledger in .rewind/executed.json",
        "rewind init --storage redis      # Track history in Redis (REDIS_URL)",
        "rewind init --dir db/migrations  # Custom migrations directory",
    ],
}];

#[derive(Args)]
pub struct InitArgs {
    /// Storage backend for execution history
    #[arg(long, value_enum, default_value = "json")]
    pub storage: StorageKind,

    /// Migrations directory, relative to the project root
    #[arg(long)]
    pub dir: Option<String>,

    /// Overwrite an existing configuration
    #[arg(long)]
    pub force: bool,
}

pub async fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let mut ctx = ProjectContext::from_root(current_dir)?;

    output.heading("Initialize Rewind");

    if ctx.initialized && !args.force {
        output.warning(&format!("Already initialized: {}", ctx.config_path.display()));
        output.info("Use --force to overwrite the configuration.");
        return Ok(());
    }

    ctx.config.storage.kind = args.storage;
    if let Some(dir) = args.dir {
        ctx.config.migrations.dir = dir;
    }

    ctx.write_config()?;
    output.success(&format!("Created: {}", ctx.config_path.display()));

    let migrations_dir = ctx.migrations_dir();
    std::fs::create_dir_all(&migrations_dir)
        .with_context(|| format!("Failed to create {}", migrations_dir.display()))?;
    output.success(&format!("Migrations directory: {}", migrations_dir.display()));

    output.info("Next steps:");
    output.bullet("rewind create --name init");
    output.bullet("rewind up");

    Ok(())
}
