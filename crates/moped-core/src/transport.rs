//! The seam between the list-view pipeline and a GraphQL client.
//!
//! The pipeline never talks to the network itself; callers hand it a
//! [`Transport`]. Tokens come from the identity provider outside this crate
//! and arrive here as "a token or none".

use crate::error::FetchError;
use serde::Serialize;
use serde_json::Value;

/// One GraphQL POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(skip)]
    pub bearer_token: Option<String>,
}

impl GraphqlRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            query: query.into(),
            bearer_token,
        }
    }

    /// `Authorization` header value, when a token is present.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.bearer_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| format!("Bearer {token}"))
    }
}

/// Executes GraphQL documents. Implementations do not retry.
pub trait Transport {
    /// Send `request` and return the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] when the request cannot be completed.
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, FetchError> {
        (**self).execute(request)
    }
}
