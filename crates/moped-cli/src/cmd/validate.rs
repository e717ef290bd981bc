//! `moped validate` — load a list-view config and summarize it.

use crate::cmd::CodedError;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use moped_core::{ErrorCode, ListConfig, load_list_config};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// List-view config file (TOML).
    pub config: PathBuf,
}

#[derive(Debug, Serialize)]
struct ColumnSummary {
    name: String,
    label: String,
    kind: String,
    searchable: bool,
    sortable: bool,
    operator: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConfigSummary {
    valid: bool,
    table: String,
    limit: u32,
    offset: u32,
    rows_per_page_options: Vec<u32>,
    default_order_by: Option<String>,
    static_filters: usize,
    columns: Vec<ColumnSummary>,
}

impl ConfigSummary {
    fn from_config(config: &ListConfig) -> Self {
        Self {
            valid: true,
            table: config.table.clone(),
            limit: config.limit,
            offset: config.offset,
            rows_per_page_options: config.pagination.rows_per_page_options.clone(),
            default_order_by: config
                .default_order_by
                .as_ref()
                .map(|order| format!("{} {}", order.column, order.direction)),
            static_filters: config.static_filters.len(),
            columns: config
                .columns
                .values()
                .map(|column| ColumnSummary {
                    name: column.name.clone(),
                    label: column.display_label().to_string(),
                    kind: column.kind.to_string(),
                    searchable: column.searchable,
                    sortable: column.sortable,
                    operator: column.search.as_ref().map(|s| s.operator.clone()),
                })
                .collect(),
        }
    }
}

fn flag(on: bool, name: &str) -> &str {
    if on { name } else { "-" }
}

pub fn run_validate(args: &ValidateArgs, output: OutputMode) -> Result<()> {
    if !args.config.exists() {
        return Err(CodedError::new(
            ErrorCode::ConfigNotFound,
            format!("config file {} does not exist", args.config.display()),
        )
        .into());
    }
    let config = load_list_config(&args.config)?;
    let summary = ConfigSummary::from_config(&config);

    render_mode(
        output,
        &summary,
        |s, w| {
            for c in &s.columns {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    c.name,
                    c.kind,
                    flag(c.searchable, "search"),
                    flag(c.sortable, "sort")
                )?;
            }
            Ok(())
        },
        |s, w| {
            pretty_section(w, &format!("List view: {}", s.table))?;
            pretty_kv(w, "Limit", s.limit.to_string())?;
            pretty_kv(w, "Offset", s.offset.to_string())?;
            pretty_kv(
                w,
                "Page sizes",
                s.rows_per_page_options
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            )?;
            pretty_kv(w, "Order", s.default_order_by.as_deref().unwrap_or("backend default"))?;
            pretty_kv(w, "Filters", s.static_filters.to_string())?;
            writeln!(w)?;
            writeln!(w, "{:<24} {:<8} {:<7} {:<5} {}", "COLUMN", "TYPE", "SEARCH", "SORT", "LABEL")?;
            for c in &s.columns {
                writeln!(
                    w,
                    "{:<24} {:<8} {:<7} {:<5} {}",
                    c.name,
                    c.kind,
                    c.operator.as_deref().unwrap_or("-"),
                    flag(c.sortable, "yes"),
                    c.label
                )?;
            }
            Ok(())
        },
    )
}
