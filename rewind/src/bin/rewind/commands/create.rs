use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Create Migrations",
    commands: &[
        "rewind create --name init               # 20241228_100000_init.up.sh + .down.sh",
        "rewind create --name add_users --ext sql",
        "rewind create --name seed --no-down     # Forward-only migration",
    ],
}];

#[derive(Args)]
pub struct CreateArgs {
    /// Name for the migration (e.g., add_users, split_name)
    #[arg(short, long)]
    pub name: String,

    /// Script file extension
    #[arg(long, default_value = "sh")]
    pub ext: String,

    /// Do not generate a down script
    #[arg(long)]
    pub no_down: bool,
}

/// Script files generated for one migration.
pub struct GeneratedMigration {
    pub name: String,
    pub up_filename: String,
    pub down_filename: Option<String>,
}

pub async fn handle_create(ctx: &ProjectContext, args: CreateArgs, output: &OutputManager) -> Result<()> {
    output.heading("Create Migration");

    let migrations_dir = ctx.migrations_dir();
    std::fs::create_dir_all(&migrations_dir)
        .with_context(|| format!("Failed to create {}", migrations_dir.display()))?;

    let generated = write_migration(&migrations_dir, &args.name, &args.ext, !args.no_down, Utc::now())?;

    output.success(&format!("Created: {}", generated.up_filename));
    if let Some(down) = &generated.down_filename {
        output.success(&format!("Created: {down}"));
    }
    output.info(&format!("Run 'rewind up {}' to apply it", generated.name));

    Ok(())
}

/// Write `<timestamp>_<slug>.up.<ext>` (and the down script) into `dir`.
pub fn write_migration(
    dir: &Path,
    name: &str,
    ext: &str,
    with_down: bool,
    timestamp: DateTime<Utc>,
) -> Result<GeneratedMigration> {
    let slug = slugify(name);
    if slug.is_empty() {
        anyhow::bail!("Migration name '{name}' has no usable characters");
    }
    let ext = ext.trim_start_matches('.');

    let full_name = format!("{}_{slug}", timestamp.format("%Y%m%d_%H%M%S"));
    let up_filename = format!("{full_name}.up.{ext}");
    let up_path = dir.join(&up_filename);
    if up_path.exists() {
        anyhow::bail!("Migration already exists: {}", up_path.display());
    }

    std::fs::write(&up_path, template(&full_name, "up", timestamp))
        .with_context(|| format!("Failed to write migration: {}", up_path.display()))?;

    let down_filename = if with_down {
        let down_filename = format!("{full_name}.down.{ext}");
        let down_path = dir.join(&down_filename);
        std::fs::write(&down_path, template(&full_name, "down", timestamp))
            .with_context(|| format!("Failed to write migration: {}", down_path.display()))?;
        Some(down_filename)
    } else {
        None
    };

    Ok(GeneratedMigration {
        name: full_name,
        up_filename,
        down_filename,
    })
}

fn template(name: &str, direction: &str, timestamp: DateTime<Utc>) -> String {
    let mut content = String::new();
    let _ = writeln!(content, "# Migration: {name} ({direction})");
    let _ = writeln!(content, "# Generated: {}", timestamp.format("%Y-%m-%dT%H:%M:%SZ"));
    let _ = writeln!(content, "#");
    let _ = writeln!(content, "# A non-zero exit status fails the migration.");
    content
}

/// Lowercase, with runs of non-alphanumerics collapsed to `_`.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}
