//! Column schema for list views.
//!
//! Each column carries a semantic [`ColumnKind`]; the kind owns the rules
//! for coercing a free-text search term into a typed backend value.

use crate::error::ConfigError;
use crate::filter::{Filter, Literal};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder substituted inside a [`SearchDescriptor::envelope`].
pub const VALUE_PLACEHOLDER: &str = "{VALUE}";

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[serde(alias = "String", alias = "text")]
    String,
    #[serde(alias = "Int", alias = "integer")]
    Int,
    #[serde(alias = "Float", alias = "numeric")]
    Float,
    #[serde(alias = "Boolean", alias = "bool")]
    Boolean,
    #[serde(alias = "Date")]
    Date,
}

impl ColumnKind {
    /// Coerce a raw search term into a literal of this kind.
    ///
    /// Returns `None` when the term cannot be represented; callers substitute
    /// the column's configured default.
    #[must_use]
    pub fn coerce(self, term: &str) -> Option<Literal> {
        let trimmed = term.trim();
        match self {
            Self::String => {
                let cleaned: String = trimmed.chars().filter(|c| !matches!(c, '"' | '\\')).collect();
                let cleaned = cleaned.trim();
                if cleaned.is_empty() {
                    None
                } else {
                    Some(Literal::String(cleaned.to_string()))
                }
            }
            Self::Int => trimmed
                .parse::<i32>()
                .ok()
                .map(|value| Literal::Int(i64::from(value))),
            Self::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Literal::Float),
            Self::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(Literal::Bool(true)),
                "false" | "no" | "0" => Some(Literal::Bool(false)),
                _ => None,
            },
            Self::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(|date| Literal::String(date.format("%Y-%m-%d").to_string())),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
        }
    }
}

/// How a searchable column turns a term into a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDescriptor {
    /// Hasura comparison operator, e.g. `_ilike` or `_eq`.
    pub operator: String,
    /// Emit text values as quoted GraphQL strings.
    #[serde(default = "default_true")]
    pub quoted: bool,
    /// Template wrapped around the coerced value, e.g. `%{VALUE}%`.
    #[serde(default)]
    pub envelope: Option<String>,
    /// Value compared against when the term cannot be coerced.
    #[serde(default)]
    pub invalid_value_default: Literal,
}

impl SearchDescriptor {
    fn wrap(&self, value: Literal) -> Literal {
        let Some(envelope) = self.envelope.as_deref() else {
            return value;
        };
        let text = match value {
            Literal::String(s) => s,
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => return Literal::Null,
        };
        Literal::String(envelope.replace(VALUE_PLACEHOLDER, &text))
    }
}

const fn default_true() -> bool {
    true
}

/// One displayable column of a list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Backend field name. Filled from the config map key.
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub search: Option<SearchDescriptor>,
}

impl ColumnConfig {
    /// Create a non-searchable, non-sortable column.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            searchable: false,
            sortable: false,
            label: None,
            search: None,
        }
    }

    #[must_use]
    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    #[must_use]
    pub fn searchable(mut self, descriptor: SearchDescriptor) -> Self {
        self.searchable = true;
        self.search = Some(descriptor);
        self
    }

    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Build this column's search comparison for `term`.
    ///
    /// Returns `None` for non-searchable columns. A term the column cannot
    /// represent still yields a comparison, against the configured default.
    /// Unquoted descriptors only accept values that render as a single bare
    /// token; anything else also falls back to the default.
    #[must_use]
    pub fn search_comparison(&self, term: &str) -> Option<Filter> {
        if !self.searchable {
            return None;
        }
        let descriptor = self.search.as_ref()?;
        let value = self
            .kind
            .coerce(term)
            .map(|value| descriptor.wrap(value))
            .filter(|value| descriptor.quoted || value.is_bare_token())
            .unwrap_or_else(|| descriptor.invalid_value_default.clone());
        Some(Filter::Compare {
            column: self.name.clone(),
            operator: descriptor.operator.clone(),
            value,
            quoted: descriptor.quoted,
        })
    }

    /// Check the column definition for authoring mistakes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the column on the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyColumnName);
        }
        if !self.searchable {
            return Ok(());
        }
        let Some(descriptor) = &self.search else {
            return Err(ConfigError::MissingSearchDescriptor {
                column: self.name.clone(),
            });
        };
        if !descriptor.operator.starts_with('_') || descriptor.operator.len() < 2 {
            return Err(ConfigError::InvalidOperator {
                column: self.name.clone(),
                operator: descriptor.operator.clone(),
            });
        }
        if let Some(envelope) = &descriptor.envelope
            && !envelope.contains(VALUE_PLACEHOLDER)
        {
            return Err(ConfigError::InvalidEnvelope {
                column: self.name.clone(),
                envelope: envelope.clone(),
            });
        }
        if descriptor.envelope.is_some() && !descriptor.quoted {
            return Err(ConfigError::UnquotedEnvelope {
                column: self.name.clone(),
            });
        }
        Ok(())
    }
}
