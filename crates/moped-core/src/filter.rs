//! Hasura `where` fragments.
//!
//! A [`Filter`] is a partial boolean expression over a table's columns that
//! can be combined with others via `_and` / `_or`. Rendering is a pure
//! function of the tree, so two equal filters always produce byte-identical
//! GraphQL text.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// A GraphQL input value used on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Literal {
    /// `null`: compares as "no match" in search fragments.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Literal {
    /// Whether the literal can be written without quotes. Text qualifies
    /// only when it is a single GraphQL name such as an enum value.
    #[must_use]
    pub fn is_bare_token(&self) -> bool {
        match self {
            Self::String(s) => is_graphql_name(s),
            _ => true,
        }
    }

    /// Emit the literal as an unquoted GraphQL token even when it carries
    /// text (used for enum-typed columns and non-quoted descriptors). Text
    /// that is not a GraphQL name renders as `null`.
    fn write_bare(&self, out: &mut String) {
        match self {
            Self::String(s) if is_graphql_name(s) => out.push_str(s),
            Self::String(_) => out.push_str("null"),
            other => other.write_graphql(out),
        }
    }

    fn write_graphql(&self, out: &mut String) {
        match self {
            Self::Null => out.push_str("null"),
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Float(f) if f.is_finite() => {
                let _ = write!(out, "{f}");
            }
            Self::Float(_) => out.push_str("null"),
            Self::String(s) => write_quoted(out, s),
        }
    }
}

/// `[_A-Za-z][_0-9A-Za-z]*`
#[must_use]
pub fn is_graphql_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn write_quoted(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// A boolean expression over a table's columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `{column: {operator: value}}`.
    Compare {
        column: String,
        operator: String,
        value: Literal,
        /// Whether a string value is emitted as a quoted GraphQL string.
        quoted: bool,
    },
    /// `{_or: [...]}`.
    Or(Vec<Filter>),
    /// `{_and: [...]}`.
    And(Vec<Filter>),
    /// An opaque, caller-validated object body such as
    /// `status_id: {_in: [1, 2]}`. Surrounding braces are optional.
    Raw(String),
}

impl Filter {
    /// Build a quoted comparison.
    #[must_use]
    pub fn compare(column: impl Into<String>, operator: impl Into<String>, value: Literal) -> Self {
        Self::Compare {
            column: column.into(),
            operator: operator.into(),
            value,
            quoted: true,
        }
    }

    /// AND two optional filters together, flattening when one side is absent.
    #[must_use]
    pub fn and_opt(left: Option<Self>, right: Option<Self>) -> Option<Self> {
        match (left, right) {
            (Some(l), Some(r)) => Some(Self::And(vec![l, r])),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        }
    }

    /// Render the filter as a GraphQL object value.
    #[must_use]
    pub fn to_graphql(&self) -> String {
        let mut out = String::new();
        self.write_graphql(&mut out);
        out
    }

    fn write_graphql(&self, out: &mut String) {
        match self {
            Self::Compare {
                column,
                operator,
                value,
                quoted,
            } => {
                let _ = write!(out, "{{{column}: {{{operator}: ");
                if *quoted {
                    value.write_graphql(out);
                } else {
                    value.write_bare(out);
                }
                out.push_str("}}");
            }
            Self::Or(items) => write_list(out, "_or", items),
            Self::And(items) => write_list(out, "_and", items),
            Self::Raw(body) => {
                let body = body.trim();
                if body.starts_with('{') && body.ends_with('}') {
                    out.push_str(body);
                } else {
                    let _ = write!(out, "{{{body}}}");
                }
            }
        }
    }
}

fn write_list(out: &mut String, key: &str, items: &[Filter]) {
    let _ = write!(out, "{{{key}: [");
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        item.write_graphql(out);
    }
    out.push_str("]}");
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_graphql())
    }
}
