//! Sort column/direction state for a list view.

use crate::config::ListConfig;
use crate::error::QueryError;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => bail!("unknown sort direction '{other}': expected asc or desc"),
        }
    }
}

/// The active sort of a list view.
///
/// `column == None` means no explicit order; the backend's default applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByState {
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

impl OrderByState {
    /// An explicit order on `column`.
    #[must_use]
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction: Some(direction),
        }
    }

    #[must_use]
    pub const fn is_unordered(&self) -> bool {
        self.column.is_none()
    }

    /// Column-header click: a new column sorts ascending, the active column
    /// flips direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is unknown or not sortable.
    pub fn toggle(&mut self, config: &ListConfig, column: &str) -> Result<(), QueryError> {
        config.sortable_column(column)?;
        let direction = if self.column.as_deref() == Some(column) {
            self.direction.unwrap_or_default().flipped()
        } else {
            SortDirection::Asc
        };
        self.column = Some(column.to_string());
        self.direction = Some(direction);
        tracing::debug!(column, %direction, "sort toggled");
        Ok(())
    }

    /// Set an explicit order.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is unknown or not sortable.
    pub fn set(
        &mut self,
        config: &ListConfig,
        column: &str,
        direction: SortDirection,
    ) -> Result<(), QueryError> {
        config.sortable_column(column)?;
        self.column = Some(column.to_string());
        self.direction = Some(direction);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.column = None;
        self.direction = None;
    }

    /// Render the `order_by` argument, if any.
    #[must_use]
    pub fn to_graphql(&self) -> Option<String> {
        let column = self.column.as_deref()?;
        let direction = self.direction.unwrap_or_default();
        Some(format!("order_by: {{{column}: {direction}}}"))
    }
}
