//! List-view GraphQL document assembly.
//!
//! [`assemble`] is a pure function of its inputs: the same config, search
//! fragment, advanced filter, order and page always yield byte-identical
//! text, so callers can memoize on [`QueryKey`].

use crate::config::ListConfig;
use crate::filter::Filter;
use crate::order::OrderByState;
use crate::pagination::PaginationState;
use std::fmt::{self, Write as _};

/// Stable digest of a query document, used to skip redundant fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

impl QueryKey {
    #[must_use]
    pub fn of(text: &str) -> Self {
        Self(blake3::hash(text.as_bytes()).to_hex().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, enough for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An assembled list-view document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub text: String,
    pub key: QueryKey,
}

/// Combine the search and advanced fragments.
///
/// Both present: `_and: [{_or: ...}, advanced]`. One present: that one.
/// Neither: no filter.
#[must_use]
pub fn combine_filters(search: Option<&Filter>, advanced: Option<&Filter>) -> Option<Filter> {
    Filter::and_opt(search.cloned(), advanced.cloned())
}

/// Build the page query and its parallel aggregate-count query.
///
/// The config's static filters join the advanced side. The aggregate shares
/// the exact `where` argument but carries no order, limit or offset, so the
/// total always counts the same rows the page is drawn from.
#[must_use]
pub fn assemble(
    config: &ListConfig,
    search: Option<&Filter>,
    advanced: Option<&Filter>,
    order: &OrderByState,
    pagination: &PaginationState,
) -> ListQuery {
    let advanced = Filter::and_opt(config.static_filter(), advanced.cloned());
    let where_clause = combine_filters(search, advanced.as_ref())
        .map(|filter| format!("where: {}", filter.to_graphql()));

    let mut args: Vec<String> = Vec::with_capacity(4);
    if let Some(clause) = &where_clause {
        args.push(clause.clone());
    }
    if let Some(order_by) = order.to_graphql() {
        args.push(order_by);
    }
    args.push(format!("limit: {}", pagination.limit()));
    args.push(format!("offset: {}", pagination.offset()));

    let mut text = String::new();
    let _ = writeln!(text, "query {}_list {{", config.table);
    let _ = writeln!(text, "  {}({}) {{", config.table, args.join(", "));
    for name in config.columns.keys() {
        let _ = writeln!(text, "    {name}");
    }
    text.push_str("  }\n");

    match &where_clause {
        Some(clause) => {
            let _ = writeln!(text, "  {}({clause}) {{", config.aggregate_table());
        }
        None => {
            let _ = writeln!(text, "  {} {{", config.aggregate_table());
        }
    }
    text.push_str("    aggregate {\n      count\n    }\n  }\n}\n");

    let key = QueryKey::of(&text);
    tracing::debug!(table = %config.table, key = key.short(), "assembled list query");
    ListQuery { text, key }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnConfig, ColumnKind, SearchDescriptor};
    use crate::filter::Literal;
    use crate::order::SortDirection;
    use crate::search::derive_search_fragment;

    fn config() -> ListConfig {
        ListConfig::builder("moped_project")
            .column(
                ColumnConfig::new("project_name", ColumnKind::String)
                    .sortable()
                    .searchable(SearchDescriptor {
                        operator: "_ilike".into(),
                        quoted: true,
                        envelope: Some("%{VALUE}%".into()),
                        invalid_value_default: Literal::Null,
                    }),
            )
            .column(ColumnConfig::new("project_id", ColumnKind::Int).sortable())
            .build()
            .unwrap()
    }

    #[test]
    fn default_query_has_no_filter_clause() {
        let config = config();
        let query = assemble(
            &config,
            None,
            None,
            &OrderByState::default(),
            &PaginationState::new(25).unwrap(),
        );
        assert_eq!(
            query.text,
            "query moped_project_list {\n  \
             moped_project(limit: 25, offset: 0) {\n    \
             project_id\n    \
             project_name\n  \
             }\n  \
             moped_project_aggregate {\n    \
             aggregate {\n      count\n    }\n  \
             }\n}\n"
        );
        assert!(!query.text.contains("where"));
        assert!(!query.text.contains("order_by"));
    }

    #[test]
    fn search_only_is_used_directly() {
        let config = config();
        let search = derive_search_fragment("bike", config.columns.values());
        let mut page = PaginationState::new(10).unwrap();
        page.change_page(2).unwrap();
        let query = assemble(
            &config,
            search.as_ref(),
            None,
            &OrderByState::by("project_id", SortDirection::Desc),
            &page,
        );
        assert!(query.text.contains(
            r#"moped_project(where: {_or: [{project_name: {_ilike: "%bike%"}}]}, order_by: {project_id: desc}, limit: 10, offset: 20) {"#
        ));
        assert!(query.text.contains(
            r#"moped_project_aggregate(where: {_or: [{project_name: {_ilike: "%bike%"}}]}) {"#
        ));
    }

    #[test]
    fn search_and_advanced_are_anded() {
        let config = config();
        let search = derive_search_fragment("bike", config.columns.values());
        let advanced = Filter::Raw("current_phase: {_eq: \"active\"}".into());
        let query = assemble(
            &config,
            search.as_ref(),
            Some(&advanced),
            &OrderByState::default(),
            &PaginationState::new(25).unwrap(),
        );
        let expected = r#"where: {_and: [{_or: [{project_name: {_ilike: "%bike%"}}]}, {current_phase: {_eq: "active"}}]}"#;
        assert_eq!(query.text.matches(expected).count(), 2);
    }

    #[test]
    fn advanced_only_is_used_directly() {
        let config = config();
        let advanced = Filter::Raw("project_id: {_in: [1, 2]}".into());
        let query = assemble(
            &config,
            None,
            Some(&advanced),
            &OrderByState::default(),
            &PaginationState::new(25).unwrap(),
        );
        assert!(query.text.contains("moped_project(where: {project_id: {_in: [1, 2]}}, limit: 25"));
    }

    #[test]
    fn static_filters_join_the_advanced_side() {
        let config = ListConfig::builder("moped_project")
            .column(ColumnConfig::new("project_id", ColumnKind::Int))
            .static_filter("is_deleted: {_eq: false}")
            .build()
            .unwrap();
        let query = assemble(
            &config,
            None,
            None,
            &OrderByState::default(),
            &PaginationState::new(25).unwrap(),
        );
        assert!(query
            .text
            .contains("moped_project_aggregate(where: {is_deleted: {_eq: false}}) {"));
    }

    #[test]
    fn identical_inputs_share_a_key() {
        let config = config();
        let page = PaginationState::new(25).unwrap();
        let a = assemble(&config, None, None, &OrderByState::default(), &page);
        let b = assemble(&config, None, None, &OrderByState::default(), &page);
        assert_eq!(a, b);

        let mut next = page;
        next.change_page(1).unwrap();
        let c = assemble(&config, None, None, &OrderByState::default(), &next);
        assert_ne!(a.key, c.key);
        assert_eq!(a.key.as_str().len(), 64);
        assert_eq!(a.key.short().len(), 12);
    }
}
