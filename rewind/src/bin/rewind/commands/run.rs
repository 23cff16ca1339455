use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Table};
use rewind::{Direction, Migration, MigrationError, Rerun, SelectionOptions, Target};
use serde::Serialize;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, themed_table};
use crate::project::open_migrator;

pub const UP_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Apply",
    commands: &[
        "rewind up                                  # Apply all pending migrations",
        "rewind up --to 20241228_100000_init         # Up to and including a migration",
        "rewind up --step 2                         # Apply the next two",
        "rewind up 20241228_100000_init --rerun skip # Explicit names",
    ],
}];

pub const DOWN_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Revert",
    commands: &[
        "rewind down                                # Revert the most recent migration",
        "rewind down --step 3                       # Revert the last three",
        "rewind down --all                          # Revert everything",
        "rewind down --to 0                         # Same as --all",
    ],
}];

/// Policy for named migrations already in the requested state
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum RerunArg {
    /// Fail the command
    #[default]
    Throw,
    /// Leave them out
    Skip,
    /// Run them again
    Allow,
}

impl From<RerunArg> for Rerun {
    fn from(arg: RerunArg) -> Self {
        match arg {
            RerunArg::Throw => Rerun::Throw,
            RerunArg::Skip => Rerun::Skip,
            RerunArg::Allow => Rerun::Allow,
        }
    }
}

#[derive(Args)]
pub struct UpArgs {
    /// Apply only these migrations
    pub migrations: Vec<String>,

    /// Start after this migration (exclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// Stop at this migration (inclusive)
    #[arg(long)]
    pub to: Option<String>,

    /// Maximum number of migrations to apply
    #[arg(long)]
    pub step: Option<usize>,

    /// What to do with named migrations that already ran
    #[arg(long, value_enum, default_value = "throw")]
    pub rerun: RerunArg,

    /// Run named migrations in the order given
    #[arg(long)]
    pub preserve_order: bool,
}

#[derive(Args)]
pub struct DownArgs {
    /// Revert only these migrations
    pub migrations: Vec<String>,

    /// Start after this migration, walking newest first (exclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// Stop at this migration (inclusive). `0` reverts everything.
    #[arg(long, conflicts_with = "all")]
    pub to: Option<String>,

    /// Revert every executed migration
    #[arg(long)]
    pub all: bool,

    /// Maximum number of migrations to revert
    #[arg(long)]
    pub step: Option<usize>,

    /// What to do with named migrations that have not run
    #[arg(long, value_enum, default_value = "throw")]
    pub rerun: RerunArg,

    /// Run named migrations in the order given
    #[arg(long)]
    pub preserve_order: bool,
}

impl UpArgs {
    pub fn to_options(&self) -> SelectionOptions {
        build_options(
            &self.migrations,
            self.from.as_deref(),
            self.to.as_deref().map(Target::from),
            self.step,
            self.rerun,
            self.preserve_order,
        )
    }
}

impl DownArgs {
    pub fn to_options(&self) -> SelectionOptions {
        let to = if self.all {
            Some(Target::Start)
        } else {
            self.to.as_deref().map(|to| match to {
                "0" => Target::Start,
                name => Target::from(name),
            })
        };
        build_options(
            &self.migrations,
            self.from.as_deref(),
            to,
            self.step,
            self.rerun,
            self.preserve_order,
        )
    }
}

fn build_options(
    migrations: &[String],
    from: Option<&str>,
    to: Option<Target>,
    step: Option<usize>,
    rerun: RerunArg,
    preserve_order: bool,
) -> SelectionOptions {
    SelectionOptions {
        migrations: (!migrations.is_empty()).then(|| migrations.to_vec()),
        from: from.map(str::to_string),
        to,
        step,
        rerun: rerun.into(),
        preserve_order,
    }
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub direction: Direction,
    pub migrations: Vec<String>,
}

impl RunReport {
    fn new(direction: Direction, migrations: &[Migration]) -> Self {
        Self {
            direction,
            migrations: rewind::migration::names(migrations),
        }
    }
}

impl TableDisplay for RunReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let header = match self.direction {
            Direction::Up => "Applied",
            Direction::Down => "Reverted",
        };
        let mut table = themed_table(options, &["#", header]);
        for (i, name) in self.migrations.iter().enumerate() {
            table.add_row(vec![Cell::new(i + 1), Cell::new(name)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("{} {}: {}", self.direction, self.migrations.len(), self.migrations.join(","))
    }
}

pub async fn handle_up(ctx: &ProjectContext, args: UpArgs, output: &OutputManager) -> Result<()> {
    output.heading("Apply Migrations");
    let migrator = open_migrator(ctx, output).await?;
    let result = migrator.up(args.to_options()).await;
    report(Direction::Up, result, output)
}

pub async fn handle_down(ctx: &ProjectContext, args: DownArgs, output: &OutputManager) -> Result<()> {
    output.heading("Revert Migrations");
    let migrator = open_migrator(ctx, output).await?;
    let result = migrator.down(args.to_options()).await;
    report(Direction::Down, result, output)
}

fn report(
    direction: Direction,
    result: Result<Vec<Migration>, MigrationError>,
    output: &OutputManager,
) -> Result<()> {
    match result {
        Ok(ran) if ran.is_empty() => {
            output.info(match direction {
                Direction::Up => "Nothing to apply",
                Direction::Down => "Nothing to revert",
            });
            if output.is_json() {
                output.display(&RunReport::new(direction, &ran))?;
            }
            Ok(())
        }
        Ok(ran) => {
            output.display(&RunReport::new(direction, &ran))?;
            output.success(&format!("{} migration(s) {}", ran.len(), match direction {
                Direction::Up => "applied",
                Direction::Down => "reverted",
            }));
            Ok(())
        }
        Err(err) => {
            let completed = err.completed();
            if !completed.is_empty() {
                output.warning(&format!(
                    "Completed before the failure: {}",
                    completed.join(", ")
                ));
            }
            Err(err.into())
        }
    }
}
