//! Sequenced result fetching.
//!
//! Every fetch takes a ticket from a monotonically increasing counter. Only
//! the response for the most recently issued ticket is reported as fresh;
//! older responses (and older failures) are discarded, so rapid filter
//! changes resolve to the last request rather than the slowest one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;

use crate::api::{MatchPage, MatchQuery, MatchmakingApi};
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fresh { ticket: u64, page: MatchPage },
    /// A newer fetch was issued while this one was in flight.
    Superseded,
}

pub struct ResultFetcher {
    api: Arc<dyn MatchmakingApi>,
    project_key: String,
    latest: AtomicU64,
}

impl ResultFetcher {
    pub fn new(api: Arc<dyn MatchmakingApi>, project_key: impl Into<String>) -> Self {
        Self {
            api,
            project_key: project_key.into(),
            latest: AtomicU64::new(0),
        }
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    /// Whether `ticket` is still the latest issued.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Discards whatever is in flight.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// Fetches one page. Identical queries always hit the network.
    pub async fn fetch(&self, query: &MatchQuery) -> Result<FetchOutcome, ApiError> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "Fetching matches for '{}' (page {}, size {}, ticket {})",
            self.project_key, query.page, query.page_size, ticket
        );

        let result = self.api.top_matches(&self.project_key, query).await;

        if !self.is_current(ticket) {
            debug!(
                "Discarding stale matches response for '{}' (ticket {})",
                self.project_key, ticket
            );
            return Ok(FetchOutcome::Superseded);
        }

        result.map(|page| FetchOutcome::Fresh { ticket, page })
    }
}
