//! Bookmark search with last-request-wins ordering.
//!
//! Each query takes a ticket; results are only delivered for the most
//! recently issued ticket, so a slow answer to an old keystroke never
//! overwrites the answer to a newer one.

use tracing::debug;

use crate::managers::bookmark_manager::TreeStore;
use crate::types::bookmark::BookmarkNode;
use crate::types::errors::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Tickets are issued internally; caller sequence numbers are tracked on
/// their own so the two never advance each other.
#[derive(Debug, Default)]
pub struct SearchTracker {
    latest: u64,
    newest_seq: Option<u64>,
}

impl SearchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket, superseding every earlier one.
    pub fn begin(&mut self) -> SearchTicket {
        self.latest += 1;
        SearchTicket(self.latest)
    }

    /// Registers a request numbered by the caller (e.g. the popup's request
    /// sequence). Returns `false` if a newer request was already seen;
    /// repeating the newest number is fine.
    pub fn observe(&mut self, seq: u64) -> bool {
        if matches!(self.newest_seq, Some(newest) if seq < newest) {
            return false;
        }
        self.newest_seq = Some(seq);
        true
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Passes `results` through only if `ticket` is still the newest.
    pub fn accept<T>(&self, ticket: SearchTicket, results: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(results)
        } else {
            debug!(ticket = ticket.0, latest = self.latest, "discarding stale search results");
            None
        }
    }

    /// Runs `query` against the store under a fresh ticket.
    pub fn run<S: TreeStore + ?Sized>(
        &mut self,
        store: &S,
        query: &str,
        limit: usize,
    ) -> Result<(SearchTicket, Vec<BookmarkNode>), StoreError> {
        let ticket = self.begin();
        let results = store.search(query, limit)?;
        Ok((ticket, results))
    }
}
