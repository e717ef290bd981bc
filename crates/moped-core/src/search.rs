//! Free-text search over a list view's searchable columns.

use crate::column::ColumnConfig;
use crate::filter::Filter;

/// Derive the "any searchable column matches `term`" fragment.
///
/// An empty or whitespace-only term means no filter at all. Otherwise every
/// searchable column contributes one comparison, OR-ed together. Columns
/// that cannot represent the term compare against their configured default
/// (usually `null`), so a term that no column can represent still produces a
/// fragment, one that matches nothing.
#[must_use]
pub fn derive_search_fragment<'a, I>(term: &str, columns: I) -> Option<Filter>
where
    I: IntoIterator<Item = &'a ColumnConfig>,
{
    if term.trim().is_empty() {
        return None;
    }

    let comparisons: Vec<Filter> = columns
        .into_iter()
        .filter_map(|column| column.search_comparison(term))
        .collect();

    if comparisons.is_empty() {
        tracing::debug!(term, "no searchable columns; search ignored");
        return None;
    }

    Some(Filter::Or(comparisons))
}

/// The list view's current search box contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    term: String,
}

impl SearchState {
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Replace the term. Returns `true` when the effective search changed.
    ///
    /// Surrounding whitespace does not count as a change.
    pub fn set_term(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        let changed = term.trim() != self.term.trim();
        self.term = term;
        changed
    }

    pub fn clear(&mut self) -> bool {
        self.set_term(String::new())
    }

    #[must_use]
    pub fn fragment<'a, I>(&self, columns: I) -> Option<Filter>
    where
        I: IntoIterator<Item = &'a ColumnConfig>,
    {
        derive_search_fragment(&self.term, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnKind, SearchDescriptor};
    use crate::filter::Literal;

    fn columns() -> Vec<ColumnConfig> {
        vec![
            ColumnConfig::new("project_id", ColumnKind::Int).searchable(SearchDescriptor {
                operator: "_eq".into(),
                quoted: false,
                envelope: None,
                invalid_value_default: Literal::Null,
            }),
            ColumnConfig::new("project_name", ColumnKind::String).searchable(SearchDescriptor {
                operator: "_ilike".into(),
                quoted: true,
                envelope: Some("%{VALUE}%".into()),
                invalid_value_default: Literal::Null,
            }),
            ColumnConfig::new("updated_at", ColumnKind::Date).sortable(),
        ]
    }

    #[test]
    fn empty_term_is_no_filter() {
        assert_eq!(derive_search_fragment("", &columns()), None);
        assert_eq!(derive_search_fragment("   ", &columns()), None);
    }

    #[test]
    fn text_term_ors_every_searchable_column() {
        let fragment = derive_search_fragment("lamar", &columns()).unwrap();
        assert_eq!(
            fragment.to_graphql(),
            r#"{_or: [{project_id: {_eq: null}}, {project_name: {_ilike: "%lamar%"}}]}"#
        );
    }

    #[test]
    fn numeric_term_matches_id_and_name() {
        let fragment = derive_search_fragment("123", &columns()).unwrap();
        assert_eq!(
            fragment.to_graphql(),
            r#"{_or: [{project_id: {_eq: 123}}, {project_name: {_ilike: "%123%"}}]}"#
        );
    }

    #[test]
    fn unrepresentable_term_matches_nothing_instead_of_everything() {
        let fragment = derive_search_fragment(r#""\"#, &columns()).unwrap();
        assert_eq!(
            fragment.to_graphql(),
            "{_or: [{project_id: {_eq: null}}, {project_name: {_ilike: null}}]}"
        );
    }

    #[test]
    fn no_searchable_columns_is_no_filter() {
        let cols = vec![ColumnConfig::new("updated_at", ColumnKind::Date)];
        assert_eq!(derive_search_fragment("x", &cols), None);
    }

    #[test]
    fn set_term_reports_effective_change() {
        let mut state = SearchState::default();
        assert!(state.set_term("bike"));
        assert!(!state.set_term(" bike "));
        assert_eq!(state.term(), " bike ");
        assert!(state.clear());
        assert!(!state.clear());
    }
}
