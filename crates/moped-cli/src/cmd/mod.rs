pub mod columns;
pub mod fetch;
pub mod query;
pub mod validate;

use anyhow::{Context, Result};
use clap::Args;
use moped_core::{ErrorCode, FileStore, Filter, ListView, SortDirection, load_list_config};
use std::path::{Path, PathBuf};

/// Environment variable overriding where column settings are stored.
pub const SETTINGS_DIR_ENV: &str = "MOPED_SETTINGS_DIR";

/// A failure that carries a stable [`ErrorCode`] for the error renderer.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CodedError {
    pub code: ErrorCode,
    pub message: String,
}

impl CodedError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Flags shared by every command that drives a list view.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// List-view config file (TOML).
    pub config: PathBuf,

    /// Free-text search term.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Advanced filter fragment, e.g. 'status_id: {_in: [1, 2]}'.
    #[arg(long)]
    pub filter: Option<String>,

    /// Column to sort by.
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending (requires --sort).
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Zero-based page number.
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Rows per page (defaults to the config's limit).
    #[arg(short = 'n', long)]
    pub limit: Option<u32>,
}

impl ViewArgs {
    /// Replay the flags as UI operations, in the order a user would make
    /// them: page size, search, filter, sort, then the page itself.
    pub fn apply(&self, view: &mut ListView<FileStore>) -> Result<()> {
        if let Some(limit) = self.limit {
            view.change_limit(limit)?;
        }
        if let Some(term) = &self.search {
            view.set_search_term(term.clone());
        }
        if let Some(raw) = self.filter.as_deref().filter(|raw| !raw.trim().is_empty()) {
            view.set_advanced_filter(Some(Filter::Raw(raw.to_string())));
        }
        if let Some(column) = &self.sort {
            let direction = if self.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            view.set_sort(column, direction)?;
        }
        view.change_page(self.page)?;
        Ok(())
    }
}

/// Resolve the settings directory: flag, then env, then the platform config
/// dir, then `.moped/columns` under the working directory.
pub fn settings_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(SETTINGS_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    FileStore::default_dir().unwrap_or_else(|| PathBuf::from(".moped").join("columns"))
}

/// Load a config and mount a view over it.
pub fn open_view(config: &Path, settings: &Path) -> Result<ListView<FileStore>> {
    if !config.exists() {
        return Err(CodedError::new(
            ErrorCode::ConfigNotFound,
            format!("config file {} does not exist", config.display()),
        )
        .into());
    }
    let config = load_list_config(config)?;
    ListView::new(config, FileStore::new(settings)).context("mount list view")
}
