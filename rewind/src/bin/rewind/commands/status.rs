use anyhow::Result;
use comfy_table::{Cell, Table};
use rewind::Reconciliation;
use serde::Serialize;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, themed_table};
use crate::project::open_migrator;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect",
    commands: &[
        "rewind status                 # Table of executed and pending migrations",
        "rewind --output json status   # Machine-readable status",
    ],
}];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    Executed,
    Pending,
    /// Recorded as executed but no file defines it.
    Unknown,
}

#[derive(Debug, Serialize)]
pub struct StatusRow {
    pub name: String,
    pub state: MigrationState,
    pub reversible: bool,
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub migrations: Vec<StatusRow>,
    /// Executed names with no migration file
    pub unknown: Vec<String>,
}

impl StatusReport {
    pub fn from_reconciliation(reconciliation: &Reconciliation) -> Self {
        let migrations = reconciliation
            .resolved
            .iter()
            .map(|m| StatusRow {
                name: m.name().to_string(),
                state: if reconciliation.executed.iter().any(|e| e.name() == m.name()) {
                    MigrationState::Executed
                } else {
                    MigrationState::Pending
                },
                reversible: m.is_reversible(),
                path: m.path().map(|p| p.display().to_string()),
            })
            .collect();

        Self {
            migrations,
            unknown: reconciliation.unknown.clone(),
        }
    }

    fn count(&self, state: MigrationState) -> usize {
        self.migrations.iter().filter(|row| row.state == state).count()
    }
}

impl TableDisplay for StatusReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["#", "Migration", "State", "Reversible"]);

        let state_cell = |state: MigrationState| {
            let cell = Cell::new(state.label());
            if options.no_color { cell } else { cell.fg(state.cell_color()) }
        };

        for (i, row) in self.migrations.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&row.name),
                state_cell(row.state),
                Cell::new(if row.reversible { "yes" } else { "no" }),
            ]);
        }

        for name in &self.unknown {
            table.add_row(vec![
                Cell::new("-"),
                Cell::new(name),
                state_cell(MigrationState::Unknown),
                Cell::new("-"),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        format!(
            "executed={} pending={} unknown={}",
            self.count(MigrationState::Executed),
            self.count(MigrationState::Pending),
            self.unknown.len()
        )
    }
}

pub async fn handle_status(ctx: &ProjectContext, output: &OutputManager) -> Result<()> {
    let migrator = open_migrator(ctx, output).await?;
    let reconciliation = migrator.reconcile().await?;
    let report = StatusReport::from_reconciliation(&reconciliation);

    output.heading("Migration Status");
    if report.migrations.is_empty() && report.unknown.is_empty() {
        output.warning(&format!("No migrations found in {}", ctx.migrations_dir().display()));
        return Ok(());
    }

    output.display(&report)?;

    if !report.unknown.is_empty() {
        output.warning(&format!(
            "{} executed migration(s) have no file: {}",
            report.unknown.len(),
            report.unknown.join(", ")
        ));
    }
    output.info(&report.to_compact());

    Ok(())
}
