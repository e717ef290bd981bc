//! `moped columns` — show or change persisted column visibility.

use crate::cmd::{CodedError, open_view};
use crate::output::{OutputMode, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use moped_core::{ErrorCode, QueryError};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ColumnsArgs {
    /// List-view config file (TOML).
    pub config: PathBuf,

    /// Hide a column (repeatable).
    #[arg(long, value_name = "COLUMN")]
    pub hide: Vec<String>,

    /// Show a previously hidden column (repeatable).
    #[arg(long, value_name = "COLUMN")]
    pub show: Vec<String>,

    /// Make every column visible again.
    #[arg(long, conflicts_with_all = ["hide", "show"])]
    pub reset: bool,
}

#[derive(Debug, Serialize)]
struct ColumnState {
    name: String,
    label: String,
    visible: bool,
}

#[derive(Debug, Serialize)]
struct ColumnsOutput {
    table: String,
    changed: usize,
    columns: Vec<ColumnState>,
}

/// Tag store failures with a code; unknown columns keep their own.
fn write_failed(err: anyhow::Error) -> anyhow::Error {
    if err.chain().any(|cause| cause.is::<QueryError>()) {
        return err;
    }
    CodedError::new(ErrorCode::SettingsWriteFailed, format!("{err:#}")).into()
}

pub fn run_columns(args: &ColumnsArgs, output: OutputMode, settings: &Path) -> Result<()> {
    let mut view = open_view(&args.config, settings)?;

    let mut changed = 0;
    if args.reset {
        changed = view.visibility().hidden.len();
        view.reset_columns().map_err(write_failed)?;
    }
    for column in &args.hide {
        changed += usize::from(view.hide_column(column).map_err(write_failed)?);
    }
    for column in &args.show {
        changed += usize::from(view.show_column(column).map_err(write_failed)?);
    }

    let result = ColumnsOutput {
        table: view.config().table.clone(),
        changed,
        columns: view
            .config()
            .columns
            .values()
            .map(|column| ColumnState {
                name: column.name.clone(),
                label: column.display_label().to_string(),
                visible: view.visibility().is_visible(&column.name),
            })
            .collect(),
    };

    render_mode(
        output,
        &result,
        |r, w| {
            for c in &r.columns {
                writeln!(w, "{}\t{}", c.name, if c.visible { "shown" } else { "hidden" })?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Columns: {}", r.table))?;
            for c in &r.columns {
                let mark = if c.visible { "[x]" } else { "[ ]" };
                writeln!(w, "{mark} {:<24} {}", c.name, c.label)?;
            }
            if r.changed > 0 {
                writeln!(w)?;
                writeln!(w, "{} column(s) updated", r.changed)?;
            }
            Ok(())
        },
    )
}
