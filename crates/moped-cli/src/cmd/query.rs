//! `moped query` — print the GraphQL document for a list-view state.

use crate::cmd::{ViewArgs, open_view};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Serialize)]
struct QueryOutput {
    table: String,
    key: String,
    page: u32,
    limit: u32,
    offset: u32,
    query: String,
}

pub fn run_query(args: &QueryArgs, output: OutputMode, settings: &Path) -> Result<()> {
    let mut view = open_view(&args.view.config, settings)?;
    args.view.apply(&mut view)?;

    let query = view.query();
    let result = QueryOutput {
        table: view.config().table.clone(),
        key: query.key.to_string(),
        page: view.pagination().page(),
        limit: view.pagination().limit(),
        offset: view.pagination().offset(),
        query: query.text,
    };

    render_mode(
        output,
        &result,
        |r, w| write!(w, "{}", r.query),
        |r, w| {
            pretty_section(w, &format!("Query: {}", r.table))?;
            pretty_kv(w, "Key", &r.key)?;
            pretty_kv(w, "Page", format!("{} (limit {}, offset {})", r.page, r.limit, r.offset))?;
            writeln!(w)?;
            write!(w, "{}", r.query)
        },
    )
}
