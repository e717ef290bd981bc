//! Last-good-result cache with request sequencing.
//!
//! Every fetch is issued a [`Ticket`] carrying a monotonically increasing
//! request id. A response is applied only if its id is newer than the last
//! settled (applied or failed) request; older responses are discarded. The
//! newest-issued request therefore always wins, whatever order responses
//! arrive in, and a late response can never overwrite newer rows.
//!
//! While a request is in flight, previously applied data stays visible and
//! is reported as stale. Errors are kept next to the data, never instead of
//! it.

use crate::assembler::QueryKey;
use crate::error::FetchError;
use std::fmt;

/// Identity of one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle returned by [`ResultCache::begin`] and consumed by
/// [`ResultCache::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: RequestId,
    pub key: QueryKey,
}

/// Outcome of resolving a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The response (data or error) is now what the cache reports.
    Applied,
    /// A newer request already settled; the response was dropped.
    Superseded,
}

/// What a renderer needs to know.
#[derive(Debug, PartialEq)]
pub struct CacheView<'a, T> {
    pub data: Option<&'a T>,
    /// Data is shown while a newer request is pending.
    pub stale: bool,
    /// Any request newer than the shown data is still pending.
    pub loading: bool,
    pub error: Option<&'a FetchError>,
}

#[derive(Debug)]
pub struct ResultCache<T> {
    data: Option<T>,
    data_key: Option<QueryKey>,
    error: Option<FetchError>,
    latest_issued: u64,
    last_settled: u64,
}

impl<T> Default for ResultCache<T> {
    fn default() -> Self {
        Self {
            data: None,
            data_key: None,
            error: None,
            latest_issued: 0,
            last_settled: 0,
        }
    }
}

impl<T> ResultCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new in-flight request for `key`.
    pub fn begin(&mut self, key: QueryKey) -> Ticket {
        self.latest_issued += 1;
        let id = RequestId(self.latest_issued);
        tracing::debug!(request = %id, key = key.short(), stale = self.data.is_some(), "fetch started");
        Ticket { id, key }
    }

    /// Apply a response unless a newer one has already settled.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<T, FetchError>) -> Resolution {
        let id = ticket.id.get();
        if id <= self.last_settled || id > self.latest_issued {
            tracing::warn!(
                request = %ticket.id,
                last_settled = self.last_settled,
                "discarding superseded response"
            );
            return Resolution::Superseded;
        }

        self.last_settled = id;
        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.data_key = Some(ticket.key);
                self.error = None;
                tracing::debug!(request = %ticket.id, "response applied");
            }
            Err(err) => {
                tracing::debug!(request = %ticket.id, error = %err, "fetch failed; keeping previous data");
                self.error = Some(err);
            }
        }
        Resolution::Applied
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.latest_issued > self.last_settled
    }

    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.is_loading() && self.data.is_some()
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Key of the query whose response is currently shown.
    #[must_use]
    pub const fn data_key(&self) -> Option<&QueryKey> {
        self.data_key.as_ref()
    }

    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    #[must_use]
    pub const fn view(&self) -> CacheView<'_, T> {
        CacheView {
            data: self.data.as_ref(),
            stale: self.is_stale(),
            loading: self.is_loading(),
            error: self.error.as_ref(),
        }
    }
}
