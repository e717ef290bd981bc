//! Decoding Hasura list responses.

use crate::config::ListConfig;
use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One backend row, keyed by column name.
pub type Row = Map<String, Value>;

/// A decoded page of rows plus the filter-wide total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    pub rows: Vec<Row>,
    pub total: u64,
}

impl ListPage {
    /// Text for one cell; `null` and missing fields render empty.
    #[must_use]
    pub fn cell_text(row: &Row, column: &str) -> String {
        match row.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Decode a response body for `config`'s page and aggregate queries.
///
/// # Errors
///
/// Returns [`FetchError::Graphql`] when the body carries an `errors` array,
/// and [`FetchError::Decode`] when the expected fields are missing.
pub fn decode_list_page(config: &ListConfig, body: &Value) -> Result<ListPage, FetchError> {
    if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
        let errors: Vec<GraphqlError> = serde_json::from_value(errors.clone())?;
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FetchError::Graphql(joined));
        }
    }

    let data = body
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::Decode("response has no data object".into()))?;

    let rows = data
        .get(&config.table)
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Decode(format!("missing '{}' rows", config.table)))?
        .iter()
        .map(|row| {
            row.as_object()
                .cloned()
                .ok_or_else(|| FetchError::Decode(format!("non-object row in '{}'", config.table)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let aggregate = config.aggregate_table();
    let total = data
        .get(&aggregate)
        .and_then(|agg| agg.pointer("/aggregate/count"))
        .and_then(Value::as_u64)
        .ok_or_else(|| FetchError::Decode(format!("missing '{aggregate}.aggregate.count'")))?;

    Ok(ListPage { rows, total })
}
