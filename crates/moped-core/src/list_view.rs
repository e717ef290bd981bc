//! A list view: the search, filter, sort, page and cache state behind one
//! paginated grid, driven by UI-level operations.

use crate::assembler::{ListQuery, QueryKey, assemble};
use crate::cache::{CacheView, Resolution, ResultCache, Ticket};
use crate::column::ColumnConfig;
use crate::config::ListConfig;
use crate::error::{FetchError, QueryError};
use crate::filter::Filter;
use crate::order::{OrderByState, SortDirection};
use crate::pagination::PaginationState;
use crate::response::{ListPage, decode_list_page};
use crate::search::SearchState;
use crate::settings::{ColumnVisibility, SettingsStore};
use crate::transport::{GraphqlRequest, Transport};
use anyhow::{Context, Result};
use serde_json::Value;

pub struct ListView<S> {
    config: ListConfig,
    search: SearchState,
    advanced: Option<Filter>,
    order: OrderByState,
    pagination: PaginationState,
    cache: ResultCache<ListPage>,
    last_issued: Option<QueryKey>,
    store: S,
    visibility: ColumnVisibility,
}

impl<S: SettingsStore> ListView<S> {
    /// Mount a view over `config`, loading column settings from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the settings cannot be
    /// loaded.
    pub fn new(config: ListConfig, store: S) -> Result<Self> {
        config.validate()?;
        let pagination = config.initial_pagination()?;
        let visibility = store
            .load(&config.table)
            .with_context(|| format!("load column settings for '{}'", config.table))?;
        Ok(Self {
            order: config.initial_order(),
            config,
            search: SearchState::default(),
            advanced: None,
            pagination,
            cache: ResultCache::new(),
            last_issued: None,
            store,
            visibility,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ListConfig {
        &self.config
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        self.search.term()
    }

    #[must_use]
    pub const fn advanced_filter(&self) -> Option<&Filter> {
        self.advanced.as_ref()
    }

    #[must_use]
    pub const fn order(&self) -> &OrderByState {
        &self.order
    }

    #[must_use]
    pub const fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    // -----------------------------------------------------------------------
    // UI operations
    // -----------------------------------------------------------------------

    /// Update the search box. Returns to the first page when the search
    /// actually changed.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> bool {
        let changed = self.search.set_term(term);
        if changed {
            self.pagination.filter_changed();
        }
        changed
    }

    /// Replace the advanced filter. Returns to the first page when it
    /// actually changed.
    pub fn set_advanced_filter(&mut self, filter: Option<Filter>) -> bool {
        if self.advanced == filter {
            return false;
        }
        self.advanced = filter;
        self.pagination.filter_changed();
        true
    }

    /// # Errors
    ///
    /// Returns an error if the column is unknown or not sortable.
    pub fn toggle_sort(&mut self, column: &str) -> Result<(), QueryError> {
        self.order.toggle(&self.config, column)
    }

    /// # Errors
    ///
    /// Returns an error if the column is unknown or not sortable.
    pub fn set_sort(&mut self, column: &str, direction: SortDirection) -> Result<(), QueryError> {
        self.order.set(&self.config, column, direction)
    }

    pub fn clear_sort(&mut self) {
        self.order.clear();
    }

    /// # Errors
    ///
    /// Returns an error if the page offset overflows.
    pub fn change_page(&mut self, page: u32) -> Result<(), QueryError> {
        self.pagination.change_page(page)
    }

    /// # Errors
    ///
    /// Returns an error if `limit` is zero.
    pub fn change_limit(&mut self, limit: u32) -> Result<(), QueryError> {
        if !self.config.is_page_size_option(limit) {
            tracing::warn!(
                limit,
                options = ?self.config.pagination.rows_per_page_options,
                "page size is not one of the configured options"
            );
        }
        self.pagination.change_limit(limit)
    }

    // -----------------------------------------------------------------------
    // Query + fetch
    // -----------------------------------------------------------------------

    /// The document for the current state.
    #[must_use]
    pub fn query(&self) -> ListQuery {
        let search = self.search.fragment(self.config.columns.values());
        assemble(
            &self.config,
            search.as_ref(),
            self.advanced.as_ref(),
            &self.order,
            &self.pagination,
        )
    }

    /// Whether the current document differs from the last one issued.
    #[must_use]
    pub fn needs_fetch(&self) -> bool {
        self.last_issued.as_ref() != Some(&self.query().key)
    }

    /// Issue a request for the current state; the caller sends the query and
    /// hands the outcome to [`ListView::complete_fetch`].
    pub fn begin_fetch(&mut self) -> (Ticket, ListQuery) {
        let query = self.query();
        self.last_issued = Some(query.key.clone());
        let ticket = self.cache.begin(query.key.clone());
        (ticket, query)
    }

    /// Decode a response body (or transport failure) and apply it unless a
    /// newer request has already settled.
    pub fn complete_fetch(
        &mut self,
        ticket: Ticket,
        outcome: Result<Value, FetchError>,
    ) -> Resolution {
        let page = outcome.and_then(|body| decode_list_page(&self.config, &body));
        self.cache.resolve(ticket, page)
    }

    /// Fetch the current state synchronously through `transport`.
    pub fn fetch<T: Transport + ?Sized>(&mut self, transport: &T, token: Option<String>) -> Resolution {
        let (ticket, query) = self.begin_fetch();
        let request = GraphqlRequest::new(query.text, token);
        let outcome = transport.execute(&request);
        self.complete_fetch(ticket, outcome)
    }

    /// Fetch only when the document changed since the last request.
    pub fn fetch_if_needed<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        token: Option<String>,
    ) -> Option<Resolution> {
        if self.needs_fetch() {
            Some(self.fetch(transport, token))
        } else {
            tracing::debug!(table = %self.config.table, "query unchanged; skipping fetch");
            None
        }
    }

    #[must_use]
    pub const fn view(&self) -> CacheView<'_, ListPage> {
        self.cache.view()
    }

    /// Page count for the last applied total.
    #[must_use]
    pub fn page_count(&self) -> Option<u64> {
        self.cache
            .data()
            .map(|page| self.pagination.page_count(page.total))
    }

    // -----------------------------------------------------------------------
    // Column visibility
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn visibility(&self) -> &ColumnVisibility {
        &self.visibility
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnConfig> {
        self.config
            .columns
            .values()
            .filter(|column| self.visibility.is_visible(&column.name))
    }

    /// Hide a column and persist the change. Returns `true` if it was
    /// visible.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown column or a failed save.
    pub fn hide_column(&mut self, column: &str) -> Result<bool> {
        self.config.column(column)?;
        let changed = self.visibility.hide(column);
        if changed {
            self.persist_visibility()?;
        }
        Ok(changed)
    }

    /// Show a column and persist the change. Returns `true` if it was
    /// hidden.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown column or a failed save.
    pub fn show_column(&mut self, column: &str) -> Result<bool> {
        self.config.column(column)?;
        let changed = self.visibility.show(column);
        if changed {
            self.persist_visibility()?;
        }
        Ok(changed)
    }

    /// Make every column visible again.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be saved.
    pub fn reset_columns(&mut self) -> Result<()> {
        self.visibility = ColumnVisibility::default();
        self.persist_visibility()
    }

    fn persist_visibility(&mut self) -> Result<()> {
        self.store
            .save(&self.config.table, &self.visibility)
            .with_context(|| format!("save column settings for '{}'", self.config.table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnKind, SearchDescriptor};
    use crate::filter::Literal;
    use crate::settings::MemoryStore;
    use serde_json::json;
    use std::cell::RefCell;

    /// Records every query and answers with a page whose rows echo the
    /// request count.
    #[derive(Default)]
    struct RecordingTransport {
        sent: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Transport for RecordingTransport {
        fn execute(&self, request: &GraphqlRequest) -> Result<Value, FetchError> {
            self.sent.borrow_mut().push(request.query.clone());
            if self.fail {
                return Err(FetchError::Transport("connection refused".into()));
            }
            let n = self.sent.borrow().len();
            Ok(json!({
                "data": {
                    "moped_project": [{"project_id": n, "project_name": format!("row {n}")}],
                    "moped_project_aggregate": {"aggregate": {"count": 60}}
                }
            }))
        }
    }

    fn config() -> ListConfig {
        ListConfig::builder("moped_project")
            .column(
                ColumnConfig::new("project_id", ColumnKind::Int)
                    .sortable()
                    .searchable(SearchDescriptor {
                        operator: "_eq".into(),
                        quoted: false,
                        envelope: None,
                        invalid_value_default: Literal::Null,
                    }),
            )
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
            .column(ColumnConfig::new("geometry", ColumnKind::String))
            .build()
            .unwrap()
    }

    fn view() -> ListView<MemoryStore> {
        ListView::new(config(), MemoryStore::default()).unwrap()
    }

    #[test]
    fn search_change_resets_to_first_page() {
        let mut view = view();
        view.change_page(3).unwrap();
        assert!(view.set_search_term("lamar"));
        assert_eq!(view.pagination().offset(), 0);

        view.change_page(2).unwrap();
        assert!(!view.set_search_term("lamar "));
        assert_eq!(view.pagination().offset(), 50);
    }

    #[test]
    fn advanced_filter_change_resets_to_first_page() {
        let mut view = view();
        view.change_page(1).unwrap();
        let filter = Some(Filter::Raw("project_id: {_gt: 5}".into()));
        assert!(view.set_advanced_filter(filter.clone()));
        assert_eq!(view.pagination().offset(), 0);
        view.change_page(1).unwrap();
        assert!(!view.set_advanced_filter(filter));
        assert_eq!(view.pagination().offset(), 25);
    }

    #[test]
    fn fetch_applies_page_and_memoizes() {
        let mut view = view();
        let transport = RecordingTransport::default();

        assert!(view.needs_fetch());
        assert_eq!(view.fetch(&transport, None), Resolution::Applied);
        let shown = view.view();
        assert_eq!(shown.data.unwrap().total, 60);
        assert!(!shown.loading);
        assert_eq!(view.page_count(), Some(3));

        assert_eq!(view.fetch_if_needed(&transport, None), None);
        view.change_page(1).unwrap();
        assert_eq!(
            view.fetch_if_needed(&transport, None),
            Some(Resolution::Applied)
        );
        assert_eq!(transport.sent.borrow().len(), 2);
        assert!(transport.sent.borrow()[1].contains("offset: 25"));
    }

    #[test]
    fn fetch_accepts_trait_objects() {
        let mut view = view();
        let recording = RecordingTransport::default();
        let transport: &dyn Transport = &recording;
        assert_eq!(view.fetch(transport, Some("t".into())), Resolution::Applied);
        assert_eq!(recording.sent.borrow().len(), 1);
    }

    #[test]
    fn failed_fetch_keeps_previous_rows() {
        let mut view = view();
        view.fetch(&RecordingTransport::default(), None);

        let failing = RecordingTransport {
            fail: true,
            ..Default::default()
        };
        view.change_page(1).unwrap();
        assert_eq!(view.fetch(&failing, None), Resolution::Applied);
        let shown = view.view();
        assert_eq!(shown.data.unwrap().rows.len(), 1);
        assert!(matches!(shown.error, Some(FetchError::Transport(_))));
    }

    #[test]
    fn out_of_order_completion_keeps_latest_page() {
        let mut view = view();
        let (t1, _) = view.begin_fetch();
        view.change_page(1).unwrap();
        let (t2, _) = view.begin_fetch();

        let page = |n: u64| {
            json!({
                "data": {
                    "moped_project": [{"project_id": n}],
                    "moped_project_aggregate": {"aggregate": {"count": 100}}
                }
            })
        };
        assert_eq!(view.complete_fetch(t2, Ok(page(2))), Resolution::Applied);
        assert_eq!(view.complete_fetch(t1, Ok(page(1))), Resolution::Superseded);
        assert_eq!(
            view.view().data.unwrap().rows[0].get("project_id"),
            Some(&json!(2))
        );
    }

    #[test]
    fn decode_failure_is_reported_as_fetch_error() {
        let mut view = view();
        let (ticket, _) = view.begin_fetch();
        view.complete_fetch(ticket, Ok(json!({"data": {}})));
        assert!(matches!(view.view().error, Some(FetchError::Decode(_))));
    }

    #[test]
    fn sort_operations_validate_columns() {
        let mut view = view();
        view.toggle_sort("project_name").unwrap();
        assert!(view.query().text.contains("order_by: {project_name: asc}"));
        assert!(view.toggle_sort("geometry").is_err());
        view.set_sort("project_id", SortDirection::Desc).unwrap();
        assert!(view.query().text.contains("order_by: {project_id: desc}"));
        view.clear_sort();
        assert!(!view.query().text.contains("order_by"));
    }

    #[test]
    fn hidden_columns_are_still_queried() {
        let mut view = view();
        assert!(view.hide_column("geometry").unwrap());
        assert!(!view.hide_column("geometry").unwrap());
        let visible: Vec<&str> = view.visible_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(visible, vec!["project_id", "project_name"]);
        assert!(view.query().text.contains("    geometry\n"));
        assert!(view.hide_column("nope").is_err());

        view.reset_columns().unwrap();
        assert_eq!(view.visible_columns().count(), 3);
    }

    #[test]
    fn settings_are_loaded_from_the_store_on_mount() {
        let mut store = MemoryStore::default();
        let mut settings = ColumnVisibility::default();
        settings.hide("project_name");
        store.save("moped_project", &settings).unwrap();

        let view = ListView::new(config(), store).unwrap();
        assert!(!view.visibility().is_visible("project_name"));
    }
}
