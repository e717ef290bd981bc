//! moped-core library.
//!
//! The list-view query pipeline: search state, column configuration,
//! order-by and pagination state feed a pure query assembler; a sequenced
//! result cache keeps the last good page on screen while newer requests are
//! in flight.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at the pipeline seams, `anyhow::Result`
//!   for file and store I/O.
//! - **Logging**: Use `tracing` macros (`debug!`, `warn!`); the library never
//!   installs a subscriber.

pub mod assembler;
pub mod cache;
pub mod column;
pub mod config;
pub mod error;
pub mod filter;
pub mod list_view;
pub mod order;
pub mod pagination;
pub mod response;
pub mod search;
pub mod settings;
pub mod transport;

pub use assembler::{ListQuery, QueryKey, assemble};
pub use cache::{CacheView, RequestId, Resolution, ResultCache, Ticket};
pub use column::{ColumnConfig, ColumnKind, SearchDescriptor};
pub use config::{ClientConfig, ListConfig, load_list_config, resolve_client_config};
pub use error::{ConfigError, ErrorCode, FetchError, QueryError};
pub use filter::{Filter, Literal, is_graphql_name};
pub use list_view::ListView;
pub use order::{OrderByState, SortDirection};
pub use pagination::{PaginationEvent, PaginationState};
pub use response::{ListPage, Row, decode_list_page};
pub use search::{SearchState, derive_search_fragment};
pub use settings::{ColumnVisibility, FileStore, MemoryStore, SettingsStore};
pub use transport::{GraphqlRequest, Transport};
