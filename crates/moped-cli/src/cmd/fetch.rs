//! `moped fetch` — run a list-view query against Hasura and print the page.

use crate::cmd::{CodedError, ViewArgs, open_view};
use crate::http::HttpTransport;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use moped_core::{ErrorCode, ListPage, Row, resolve_client_config};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// GraphQL endpoint (falls back to MOPED_GRAPHQL_URL).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Bearer token (falls back to MOPED_TOKEN).
    #[arg(long)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
struct FetchOutput {
    table: String,
    key: String,
    total: u64,
    page: u32,
    pages: u64,
    has_previous: bool,
    has_next: bool,
    limit: u32,
    offset: u32,
    columns: Vec<String>,
    rows: Vec<Row>,
}

pub fn run_fetch(args: &FetchArgs, output: OutputMode, settings: &Path) -> Result<()> {
    let client = resolve_client_config(args.endpoint.clone(), args.token.clone());
    let Some(endpoint) = client.endpoint else {
        return Err(CodedError::new(ErrorCode::EndpointMissing, "no GraphQL endpoint configured").into());
    };

    let mut view = open_view(&args.view.config, settings)?;
    args.view.apply(&mut view)?;

    let transport = HttpTransport::new(endpoint);
    view.fetch(&transport, client.token);

    let shown = view.view();
    if let Some(err) = shown.error {
        return Err(err.clone().into());
    }
    let Some(page) = shown.data else {
        return Err(CodedError::new(ErrorCode::InternalUnexpected, "fetch produced no data").into());
    };

    let columns: Vec<String> = view.visible_columns().map(|c| c.name.clone()).collect();
    let rows = page
        .rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .filter_map(|name| row.get(name).map(|value| (name.clone(), value.clone())))
                .collect::<Row>()
        })
        .collect();

    let pagination = view.pagination();
    let result = FetchOutput {
        table: view.config().table.clone(),
        key: view.query().key.to_string(),
        total: page.total,
        page: pagination.page(),
        pages: pagination.page_count(page.total),
        has_previous: pagination.has_previous(),
        has_next: pagination.has_next(page.total),
        limit: pagination.limit(),
        offset: pagination.offset(),
        columns,
        rows,
    };

    render_mode(
        output,
        &result,
        |r, w| {
            writeln!(w, "{}", r.columns.join("\t"))?;
            for row in &r.rows {
                let cells: Vec<String> =
                    r.columns.iter().map(|c| ListPage::cell_text(row, c)).collect();
                writeln!(w, "{}", cells.join("\t"))?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("{}: page {} of {}", r.table, r.page + 1, r.pages))?;
            for row in &r.rows {
                for column in &r.columns {
                    pretty_kv(w, column, ListPage::cell_text(row, column))?;
                }
                writeln!(w)?;
            }
            pretty_kv(w, "Total", r.total.to_string())?;
            if r.rows.is_empty() {
                pretty_kv(w, "Showing", "no rows")?;
            } else {
                pretty_kv(
                    w,
                    "Showing",
                    format!("{}-{}", u64::from(r.offset) + 1, u64::from(r.offset) + r.rows.len() as u64),
                )?;
            }
            let nav = match (r.has_previous, r.has_next) {
                (true, true) => "previous, next",
                (true, false) => "previous",
                (false, true) => "next",
                (false, false) => "-",
            };
            pretty_kv(w, "Pages", nav)
        },
    )
}
