use anyhow::{Context, Result};
use clap::Args;
use rewind::MigrationStorage;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::project::open_migrator;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Repair History",
    commands: &[
        "rewind resolve 20241228_100000_init --applied      # Record without running",
        "rewind resolve 20241228_100000_init --rolled-back  # Forget without reverting",
    ],
}];

#[derive(Args)]
pub struct ResolveArgs {
    /// Migration name to mark
    pub name: String,

    /// Record the migration as executed without running it
    #[arg(long, conflicts_with = "rolled_back", required_unless_present = "rolled_back")]
    pub applied: bool,

    /// Remove the migration from history without reverting it
    #[arg(long)]
    pub rolled_back: bool,
}

pub async fn handle_resolve(ctx: &ProjectContext, args: ResolveArgs, output: &OutputManager) -> Result<()> {
    output.heading("Resolve Migration");

    let migrator = open_migrator(ctx, output).await?;
    let reconciliation = migrator.reconcile().await?;
    let executed = reconciliation.executed.iter().any(|m| m.name() == args.name)
        || reconciliation.unknown.contains(&args.name);

    if args.applied {
        if reconciliation.position(&args.name).is_none() {
            anyhow::bail!("Migration '{}' not found in {}", args.name, ctx.migrations_dir().display());
        }
        if executed {
            output.warning(&format!("'{}' is already recorded as executed", args.name));
            return Ok(());
        }
        migrator
            .storage()
            .log_migration(&args.name)
            .await
            .with_context(|| format!("Failed to record '{}'", args.name))?;
        output.success(&format!("Marked '{}' as applied", args.name));
    } else {
        if !executed {
            output.warning(&format!("'{}' is not recorded as executed", args.name));
            return Ok(());
        }
        migrator
            .storage()
            .unlog_migration(&args.name)
            .await
            .with_context(|| format!("Failed to remove '{}'", args.name))?;
        output.success(&format!("Marked '{}' as rolled back", args.name));
    }

    Ok(())
}
