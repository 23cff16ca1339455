//! Colours and glyphs for the CLI, keyed by migration state.

use colored::Color;
use comfy_table::Color as TableColor;
use rewind::Direction;

use crate::commands::status::MigrationState;

/// Headings, table headers and in-flight steps.
pub const ACCENT: Color = Color::Cyan;
/// Bullets and verbose detail.
pub const MUTED: Color = Color::BrightBlack;
pub const BULLET: &str = "•";

impl MigrationState {
    pub fn label(self) -> &'static str {
        match self {
            MigrationState::Executed => "executed",
            MigrationState::Pending => "pending",
            MigrationState::Unknown => "executed (no file)",
        }
    }

    pub fn cell_color(self) -> TableColor {
        match self {
            MigrationState::Executed => TableColor::Green,
            MigrationState::Pending => TableColor::Yellow,
            MigrationState::Unknown => TableColor::Red,
        }
    }
}

/// Glyph printed before a step while it runs.
pub fn direction_icon(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "↑",
        Direction::Down => "↓",
    }
}

/// Kind of status line printed by the output manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// A migration landed in its requested state.
    Success,
    /// Something the user should look at, such as unknown executed names.
    Warning,
    Info,
    Detail,
}

impl Tone {
    pub fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Warning => "⚠",
            Tone::Info => "ℹ",
            Tone::Detail => "→",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Tone::Success => Color::Green,
            Tone::Warning => Color::Yellow,
            Tone::Info => Color::Blue,
            Tone::Detail => MUTED,
        }
    }
}
