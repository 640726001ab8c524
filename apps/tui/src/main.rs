//! scout TUI: interactive company research.
//!
//! A single form screen built with `ratatui` + `crossterm`: enter a company
//! name, read the report, save it as JSON.

mod app;
mod screens;
mod widgets;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    app::run()
}
