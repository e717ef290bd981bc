use std::fmt;

/// Machine-readable error codes for scripting against the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigNotFound,
    ConfigParseError,
    InvalidColumn,
    UnknownColumn,
    ColumnNotSortable,
    InvalidPageSize,
    PageOutOfRange,
    EndpointMissing,
    TransportFailed,
    BackendRejected,
    ResponseMalformed,
    SettingsWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigNotFound => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidColumn => "E1003",
            Self::UnknownColumn => "E2001",
            Self::ColumnNotSortable => "E2002",
            Self::InvalidPageSize => "E2003",
            Self::PageOutOfRange => "E2004",
            Self::EndpointMissing => "E3001",
            Self::TransportFailed => "E3002",
            Self::BackendRejected => "E3003",
            Self::ResponseMalformed => "E3004",
            Self::SettingsWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigNotFound => "List-view config not found",
            Self::ConfigParseError => "List-view config parse error",
            Self::InvalidColumn => "Invalid column definition",
            Self::UnknownColumn => "Unknown column",
            Self::ColumnNotSortable => "Column is not sortable",
            Self::InvalidPageSize => "Invalid page size",
            Self::PageOutOfRange => "Page out of range",
            Self::EndpointMissing => "GraphQL endpoint not configured",
            Self::TransportFailed => "GraphQL request failed",
            Self::BackendRejected => "GraphQL backend returned errors",
            Self::ResponseMalformed => "Malformed GraphQL response",
            Self::SettingsWriteFailed => "Column settings write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound => Some("Pass the path to a list-view .toml config."),
            Self::ConfigParseError => Some("Fix the TOML syntax in the list-view config and retry."),
            Self::InvalidColumn => {
                Some("Searchable columns need a [columns.<name>.search] table with a valid operator.")
            }
            Self::UnknownColumn => Some("Use a column name defined in the list-view config."),
            Self::ColumnNotSortable => Some("Set `sortable = true` on the column to sort by it."),
            Self::InvalidPageSize => Some("Page size must be greater than zero."),
            Self::PageOutOfRange => None,
            Self::EndpointMissing => Some("Pass --endpoint or set MOPED_GRAPHQL_URL."),
            Self::TransportFailed => Some("Check network access to the GraphQL endpoint and retry."),
            Self::BackendRejected => Some("Check the token's role permissions and the filter syntax."),
            Self::ResponseMalformed => {
                Some("Verify the config's `table` matches the backend schema.")
            }
            Self::SettingsWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while validating a list-view configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Syntax(String),

    #[error("list view has no table name")]
    MissingTable,

    #[error("list view '{table}' defines no columns")]
    NoColumns { table: String },

    #[error("column '{column}' is searchable but has no search descriptor")]
    MissingSearchDescriptor { column: String },

    #[error("column '{column}': search operator '{operator}' must start with '_'")]
    InvalidOperator { column: String, operator: String },

    #[error("column '{column}': envelope '{envelope}' does not contain {{VALUE}}")]
    InvalidEnvelope { column: String, envelope: String },

    #[error("column '{column}': an envelope requires quoted = true")]
    UnquotedEnvelope { column: String },

    #[error("column name must not be empty")]
    EmptyColumnName,

    #[error("default limit must be greater than zero")]
    ZeroLimit,

    #[error("default offset {offset} is not a multiple of limit {limit}")]
    MisalignedOffset { limit: u32, offset: u32 },

    #[error("rows-per-page options must all be greater than zero")]
    ZeroPageOption,

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Syntax(_) | Self::MissingTable | Self::NoColumns { .. } => {
                ErrorCode::ConfigParseError
            }
            Self::MissingSearchDescriptor { .. }
            | Self::InvalidOperator { .. }
            | Self::InvalidEnvelope { .. }
            | Self::UnquotedEnvelope { .. }
            | Self::EmptyColumnName => ErrorCode::InvalidColumn,
            Self::ZeroLimit | Self::MisalignedOffset { .. } | Self::ZeroPageOption => {
                ErrorCode::InvalidPageSize
            }
            Self::Query(err) => err.code(),
        }
    }
}

/// Errors raised by list-view state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' is not sortable")]
    NotSortable(String),

    #[error("page size must be greater than zero")]
    ZeroLimit,

    #[error("page {page} with limit {limit} overflows the offset range")]
    PageOverflow { page: u32, limit: u32 },
}

impl QueryError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownColumn(_) => ErrorCode::UnknownColumn,
            Self::NotSortable(_) => ErrorCode::ColumnNotSortable,
            Self::ZeroLimit => ErrorCode::InvalidPageSize,
            Self::PageOverflow { .. } => ErrorCode::PageOutOfRange,
        }
    }
}

/// Errors surfaced by a list-view fetch.
///
/// Fetch errors never discard cached rows; the cache keeps them next to the
/// last good data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("GraphQL request failed: {0}")]
    Transport(String),

    #[error("GraphQL backend returned errors: {0}")]
    Graphql(String),

    #[error("malformed GraphQL response: {0}")]
    Decode(String),
}

impl FetchError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::TransportFailed,
            Self::Graphql(_) => ErrorCode::BackendRejected,
            Self::Decode(_) => ErrorCode::ResponseMalformed,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
