//! Offset pagination as an explicit state machine.
//!
//! Invariant: `offset` is always a multiple of `limit`.

use crate::error::QueryError;
use std::num::NonZeroU32;

/// Transitions accepted by [`PaginationState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationEvent {
    /// Jump to a zero-based page.
    ChangePage(u32),
    /// Change rows per page. Always returns to the first page.
    ChangeLimit(u32),
    /// Search or filter changed; the old page may no longer exist.
    FilterChanged,
}

/// Current page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    limit: NonZeroU32,
    offset: u32,
}

impl PaginationState {
    /// Start on the first page with `limit` rows.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::ZeroLimit`] when `limit` is zero.
    pub fn new(limit: u32) -> Result<Self, QueryError> {
        let limit = NonZeroU32::new(limit).ok_or(QueryError::ZeroLimit)?;
        Ok(Self { limit, offset: 0 })
    }

    /// Start at `offset`, rounded down to a page boundary.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::ZeroLimit`] when `limit` is zero.
    pub fn with_offset(limit: u32, offset: u32) -> Result<Self, QueryError> {
        let mut state = Self::new(limit)?;
        state.offset = offset - offset % state.limit.get();
        Ok(state)
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit.get()
    }

    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.offset / self.limit.get()
    }

    /// Apply one transition.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero limit or a page whose offset overflows;
    /// the state is unchanged in both cases.
    pub fn apply(&mut self, event: PaginationEvent) -> Result<(), QueryError> {
        match event {
            PaginationEvent::ChangePage(page) => {
                let offset = page
                    .checked_mul(self.limit.get())
                    .ok_or(QueryError::PageOverflow {
                        page,
                        limit: self.limit.get(),
                    })?;
                self.offset = offset;
            }
            PaginationEvent::ChangeLimit(limit) => {
                self.limit = NonZeroU32::new(limit).ok_or(QueryError::ZeroLimit)?;
                self.offset = 0;
            }
            PaginationEvent::FilterChanged => self.offset = 0,
        }
        tracing::debug!(?event, limit = self.limit.get(), offset = self.offset, "pagination");
        Ok(())
    }

    /// # Errors
    ///
    /// See [`PaginationState::apply`].
    pub fn change_page(&mut self, page: u32) -> Result<(), QueryError> {
        self.apply(PaginationEvent::ChangePage(page))
    }

    /// # Errors
    ///
    /// See [`PaginationState::apply`].
    pub fn change_limit(&mut self, limit: u32) -> Result<(), QueryError> {
        self.apply(PaginationEvent::ChangeLimit(limit))
    }

    pub fn filter_changed(&mut self) {
        self.offset = 0;
    }

    /// Number of pages needed for `total` rows (at least one).
    #[must_use]
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit.get())).max(1)
    }

    #[must_use]
    pub fn has_next(&self, total: u64) -> bool {
        u64::from(self.offset) + u64::from(self.limit.get()) < total
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.offset > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_is_rejected() {
        assert_eq!(PaginationState::new(0), Err(QueryError::ZeroLimit));
        let mut state = PaginationState::new(25).unwrap();
        assert_eq!(state.change_limit(0), Err(QueryError::ZeroLimit));
        assert_eq!(state.limit(), 25);
    }

    #[test]
    fn change_page_sets_offset() {
        let mut state = PaginationState::new(25).unwrap();
        state.change_page(4).unwrap();
        assert_eq!(state.offset(), 100);
        assert_eq!(state.page(), 4);
        assert!(state.has_previous());
    }

    #[test]
    fn change_limit_resets_to_first_page() {
        let mut state = PaginationState::new(25).unwrap();
        state.change_page(3).unwrap();
        state.change_limit(50).unwrap();
        assert_eq!((state.limit(), state.offset()), (50, 0));
    }

    #[test]
    fn filter_changed_resets_offset() {
        let mut state = PaginationState::new(10).unwrap();
        state.change_page(5).unwrap();
        state.apply(PaginationEvent::FilterChanged).unwrap();
        assert_eq!(state.offset(), 0);
        assert_eq!(state.limit(), 10);
    }

    #[test]
    fn overflowing_page_leaves_state_untouched() {
        let mut state = PaginationState::new(1000).unwrap();
        state.change_page(2).unwrap();
        assert!(matches!(
            state.change_page(u32::MAX),
            Err(QueryError::PageOverflow { .. })
        ));
        assert_eq!(state.offset(), 2000);
    }

    #[test]
    fn with_offset_rounds_to_page_boundary() {
        let state = PaginationState::with_offset(25, 60).unwrap();
        assert_eq!(state.offset(), 50);
    }

    #[test]
    fn page_count_and_has_next() {
        let state = PaginationState::new(25).unwrap();
        assert_eq!(state.page_count(0), 1);
        assert_eq!(state.page_count(25), 1);
        assert_eq!(state.page_count(26), 2);
        assert!(state.has_next(26));
        assert!(!state.has_next(25));
    }
}
