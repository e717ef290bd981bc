use crate::column::ColumnConfig;
use crate::error::{ConfigError, QueryError};
use crate::filter::Filter;
use crate::order::{OrderByState, SortDirection};
use crate::pagination::PaginationState;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

pub const DEFAULT_LIMIT: u32 = 25;
pub const DEFAULT_ROWS_PER_PAGE_OPTIONS: [u32; 4] = [10, 25, 50, 100];

/// Environment variable holding the GraphQL endpoint URL.
pub const ENDPOINT_ENV: &str = "MOPED_GRAPHQL_URL";
/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "MOPED_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_rows_per_page_options")]
    pub rows_per_page_options: Vec<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            rows_per_page_options: default_rows_per_page_options(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultOrder {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Static, human-authored description of one list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Backend table (Hasura root field) the view reads from.
    pub table: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    /// Columns keyed by backend field name.
    pub columns: BTreeMap<String, ColumnConfig>,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub default_order_by: Option<DefaultOrder>,
    /// Always-on filter fragments ANDed into every query.
    #[serde(default, rename = "where")]
    pub static_filters: Vec<String>,
}

impl ListConfig {
    #[must_use]
    pub fn builder(table: impl Into<String>) -> ListConfigBuilder {
        ListConfigBuilder {
            config: Self {
                table: table.into(),
                limit: DEFAULT_LIMIT,
                offset: 0,
                columns: BTreeMap::new(),
                pagination: PaginationConfig::default(),
                default_order_by: None,
                static_filters: Vec::new(),
            },
        }
    }

    /// Parse and validate a TOML list-view config.
    ///
    /// # Errors
    ///
    /// Returns an error on TOML syntax errors or failed validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Syntax(e.to_string()))?;
        config.fill_column_names();
        config.validate()?;
        Ok(config)
    }

    fn fill_column_names(&mut self) {
        for (name, column) in &mut self.columns {
            column.name.clone_from(name);
        }
    }

    /// Fail fast on authoring mistakes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.trim().is_empty() {
            return Err(ConfigError::MissingTable);
        }
        if self.columns.is_empty() {
            return Err(ConfigError::NoColumns {
                table: self.table.clone(),
            });
        }
        for column in self.columns.values() {
            column.validate()?;
        }
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if self.offset % self.limit != 0 {
            return Err(ConfigError::MisalignedOffset {
                limit: self.limit,
                offset: self.offset,
            });
        }
        if self.pagination.rows_per_page_options.contains(&0) {
            return Err(ConfigError::ZeroPageOption);
        }
        if let Some(order) = &self.default_order_by {
            self.sortable_column(&order.column)?;
        }
        Ok(())
    }

    /// Look up a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownColumn`] if no such column is configured.
    pub fn column(&self, name: &str) -> Result<&ColumnConfig, QueryError> {
        self.columns
            .get(name)
            .ok_or_else(|| QueryError::UnknownColumn(name.to_string()))
    }

    /// Look up a column that may be sorted on.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is unknown or not sortable.
    pub fn sortable_column(&self, name: &str) -> Result<&ColumnConfig, QueryError> {
        let column = self.column(name)?;
        if column.sortable {
            Ok(column)
        } else {
            Err(QueryError::NotSortable(name.to_string()))
        }
    }

    pub fn searchable_columns(&self) -> impl Iterator<Item = &ColumnConfig> {
        self.columns.values().filter(|column| column.searchable)
    }

    #[must_use]
    pub fn aggregate_table(&self) -> String {
        format!("{}_aggregate", self.table)
    }

    /// The static filters as one fragment, if any are configured.
    #[must_use]
    pub fn static_filter(&self) -> Option<Filter> {
        let mut fragments: Vec<Filter> = self
            .static_filters
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Filter::Raw(raw.clone()))
            .collect();
        match fragments.len() {
            0 => None,
            1 => fragments.pop(),
            _ => Some(Filter::And(fragments)),
        }
    }

    #[must_use]
    pub fn initial_order(&self) -> OrderByState {
        self.default_order_by
            .as_ref()
            .map(|order| OrderByState::by(order.column.clone(), order.direction))
            .unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error when the configured limit is zero.
    pub fn initial_pagination(&self) -> Result<PaginationState, QueryError> {
        PaginationState::with_offset(self.limit, self.offset)
    }

    #[must_use]
    pub fn is_page_size_option(&self, limit: u32) -> bool {
        self.pagination.rows_per_page_options.contains(&limit)
    }
}

pub struct ListConfigBuilder {
    config: ListConfig,
}

impl ListConfigBuilder {
    #[must_use]
    pub fn column(mut self, column: ColumnConfig) -> Self {
        self.config.columns.insert(column.name.clone(), column);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.config.limit = limit;
        self
    }

    #[must_use]
    pub fn default_order(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.config.default_order_by = Some(DefaultOrder {
            column: column.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn static_filter(mut self, raw: impl Into<String>) -> Self {
        self.config.static_filters.push(raw.into());
        self
    }

    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn build(self) -> Result<ListConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Load and validate a list-view config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_list_config(path: &Path) -> Result<ListConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    ListConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to load {}", path.display()))
}

/// Where and as whom to send GraphQL requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientConfig {
    pub endpoint: Option<String>,
    pub token: Option<String>,
}

/// Resolve client settings: explicit flags win over the environment.
#[must_use]
pub fn resolve_client_config(endpoint: Option<String>, token: Option<String>) -> ClientConfig {
    resolve_client_config_inner(
        endpoint,
        token,
        env::var(ENDPOINT_ENV).ok(),
        env::var(TOKEN_ENV).ok(),
    )
}

fn resolve_client_config_inner(
    endpoint_flag: Option<String>,
    token_flag: Option<String>,
    endpoint_env: Option<String>,
    token_env: Option<String>,
) -> ClientConfig {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    ClientConfig {
        endpoint: non_empty(endpoint_flag).or_else(|| non_empty(endpoint_env)),
        token: non_empty(token_flag).or_else(|| non_empty(token_env)),
    }
}

const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_rows_per_page_options() -> Vec<u32> {
    DEFAULT_ROWS_PER_PAGE_OPTIONS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnKind;
    use crate::filter::Literal;

    const PROJECTS: &str = r#"
table = "moped_project"
limit = 25

[columns.project_id]
type = "int"
searchable = true
sortable = true

[columns.project_id.search]
operator = "_eq"
quoted = false
invalid_value_default = 0

[columns.project_name]
type = "string"
label = "Name"
searchable = true
sortable = true

[columns.project_name.search]
operator = "_ilike"
envelope = "%{VALUE}%"

[columns.updated_at]
type = "date"
sortable = true

[pagination]
rows_per_page_options = [25, 50, 100]

[default_order_by]
column = "updated_at"
direction = "desc"
"#;

    #[test]
    fn parses_full_config() {
        let config = ListConfig::from_toml_str(PROJECTS).unwrap();
        assert_eq!(config.table, "moped_project");
        assert_eq!(config.columns.len(), 3);
        let id = config.column("project_id").unwrap();
        assert_eq!(id.name, "project_id");
        assert_eq!(id.kind, ColumnKind::Int);
        assert_eq!(
            id.search.as_ref().unwrap().invalid_value_default,
            Literal::Int(0)
        );
        let name = config.column("project_name").unwrap();
        assert_eq!(name.display_label(), "Name");
        assert!(name.search.as_ref().unwrap().quoted);
        assert_eq!(config.searchable_columns().count(), 2);
        assert_eq!(
            config.initial_order(),
            OrderByState::by("updated_at", SortDirection::Desc)
        );
        assert!(config.is_page_size_option(50));
        assert!(!config.is_page_size_option(10));
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let config = ListConfig::from_toml_str(
            "table = \"moped_entity\"\n[columns.entity_name]\ntype = \"string\"\n",
        )
        .unwrap();
        assert_eq!(config.limit, DEFAULT_LIMIT);
        assert_eq!(config.offset, 0);
        assert_eq!(
            config.pagination.rows_per_page_options,
            DEFAULT_ROWS_PER_PAGE_OPTIONS.to_vec()
        );
        assert!(config.initial_order().is_unordered());
        assert_eq!(config.static_filter(), None);
    }

    #[test]
    fn searchable_without_descriptor_fails_fast() {
        let err = ListConfig::from_toml_str(
            "table = \"t\"\n[columns.name]\ntype = \"string\"\nsearchable = true\n",
        )
        .unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert_eq!(
            config_err,
            &ConfigError::MissingSearchDescriptor {
                column: "name".into()
            }
        );
    }

    #[test]
    fn default_order_must_be_sortable() {
        let err = ListConfig::builder("t")
            .column(ColumnConfig::new("geometry", ColumnKind::String))
            .default_order("geometry", SortDirection::Asc)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::Query(QueryError::NotSortable("geometry".into())));
    }

    #[test]
    fn misaligned_offset_is_rejected() {
        let err = ListConfig::from_toml_str(
            "table = \"t\"\nlimit = 10\noffset = 15\n[columns.a]\ntype = \"int\"\n",
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MisalignedOffset { .. })
        ));
    }

    #[test]
    fn static_filters_combine_with_and() {
        let config = ListConfig::builder("t")
            .column(ColumnConfig::new("a", ColumnKind::Int))
            .static_filter("is_deleted: {_eq: false}")
            .static_filter("is_retired: {_eq: false}")
            .build()
            .unwrap();
        assert_eq!(
            config.static_filter().unwrap().to_graphql(),
            "{_and: [{is_deleted: {_eq: false}}, {is_retired: {_eq: false}}]}"
        );
    }

    #[test]
    fn load_reports_path_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "table = ").unwrap();
        let err = load_list_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    fn syntax_errors_keep_line_and_column() {
        let err = ListConfig::from_toml_str("table = \"projects\"\nlimit = ").unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert_eq!(config_err.code(), crate::ErrorCode::ConfigParseError);
        let message = config_err.to_string();
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("column"), "{message}");
    }

    #[test]
    fn flags_override_environment() {
        let resolved = resolve_client_config_inner(
            Some("https://flag/v1/graphql".into()),
            None,
            Some("https://env/v1/graphql".into()),
            Some("env-token".into()),
        );
        assert_eq!(resolved.endpoint.as_deref(), Some("https://flag/v1/graphql"));
        assert_eq!(resolved.token.as_deref(), Some("env-token"));

        let blank = resolve_client_config_inner(Some("  ".into()), None, None, None);
        assert_eq!(blank.endpoint, None);
    }
}
