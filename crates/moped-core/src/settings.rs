//! Per-view column visibility, persisted through an injected store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Which columns the user has hidden in one list view.
///
/// Hidden columns are still selected by the query so the cached data keeps
/// its shape when the user toggles them back on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnVisibility {
    #[serde(default)]
    pub hidden: BTreeSet<String>,
}

impl ColumnVisibility {
    #[must_use]
    pub fn is_visible(&self, column: &str) -> bool {
        !self.hidden.contains(column)
    }

    /// Returns `true` if the column was visible before.
    pub fn hide(&mut self, column: &str) -> bool {
        self.hidden.insert(column.to_string())
    }

    /// Returns `true` if the column was hidden before.
    pub fn show(&mut self, column: &str) -> bool {
        self.hidden.remove(column)
    }
}

/// Storage for [`ColumnVisibility`], keyed by view name.
pub trait SettingsStore {
    /// Load settings for `view`; a view never saved yields the default.
    ///
    /// # Errors
    ///
    /// Returns an error if stored settings exist but cannot be read.
    fn load(&self, view: &str) -> Result<ColumnVisibility>;

    /// # Errors
    ///
    /// Returns an error if the settings cannot be persisted.
    fn save(&mut self, view: &str, settings: &ColumnVisibility) -> Result<()>;
}

/// Settings kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    views: HashMap<String, ColumnVisibility>,
}

impl SettingsStore for MemoryStore {
    fn load(&self, view: &str) -> Result<ColumnVisibility> {
        Ok(self.views.get(view).cloned().unwrap_or_default())
    }

    fn save(&mut self, view: &str, settings: &ColumnVisibility) -> Result<()> {
        self.views.insert(view.to_string(), settings.clone());
        Ok(())
    }
}

/// One JSON file per view under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<config dir>/moped/columns`, or `None` when the platform has no
    /// config directory.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("moped").join("columns"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, view: &str) -> PathBuf {
        let file: String = view
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl SettingsStore for FileStore {
    fn load(&self, view: &str) -> Result<ColumnVisibility> {
        let path = self.path_for(view);
        if !path.exists() {
            return Ok(ColumnVisibility::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn save(&mut self, view: &str, settings: &ColumnVisibility) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path_for(view);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(settings).context("serialize column settings")?;
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        tracing::debug!(view, path = %path.display(), "column settings saved");
        Ok(())
    }
}
