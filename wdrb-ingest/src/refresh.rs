//! Catalog view refresh
//!
//! There is no notification channel for "the backend finished indexing", so
//! the view is rebuilt by re-querying. Three ways to do that:
//! - [`CatalogRefresher::refresh`]: query now
//! - [`CatalogRefresher::refresh_after`]: wait the fixed delay, then query
//! - [`CatalogRefresher::await_new_items`]: poll with capped exponential
//!   backoff until new items show up or the attempt budget runs out
//!
//! A view that does not yet contain a just-uploaded item is stale, not wrong.

use crate::error::CatalogError;
use crate::services::CatalogQuery;
use std::sync::Arc;
use tracing::{debug, info};
use wdrb_common::config::RefreshPolicy;
use wdrb_common::events::{EventBus, WardrobeEvent};
use wdrb_common::models::CatalogView;
use wdrb_common::{time, CategoryFilter, UserId};

/// Result of waiting for the backend to index uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexWait {
    /// The expected number of new items is visible
    Visible(CatalogView),
    /// Budget exhausted; carries the last view fetched
    Pending(CatalogView),
}

impl IndexWait {
    pub fn view(&self) -> &CatalogView {
        match self {
            IndexWait::Visible(view) | IndexWait::Pending(view) => view,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, IndexWait::Visible(_))
    }
}

#[derive(Clone)]
pub struct CatalogRefresher {
    query: Arc<dyn CatalogQuery>,
    policy: RefreshPolicy,
    event_bus: Option<EventBus>,
}

impl CatalogRefresher {
    pub fn new(query: Arc<dyn CatalogQuery>, policy: RefreshPolicy) -> Self {
        Self {
            query,
            policy,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Query the catalog once and rebuild the view
    pub async fn refresh(
        &self,
        user_id: &str,
        filter: CategoryFilter,
    ) -> Result<CatalogView, CatalogError> {
        let user = UserId::new(user_id).ok_or(CatalogError::Unauthenticated)?;

        let items = self.query.list_items(&user, filter).await.map_err(|e| {
            tracing::warn!(user = %user, filter = %filter, "Catalog query failed: {}", e);
            CatalogError::from(e)
        })?;
        let view = CatalogView::from_items(filter, items);

        debug!(filter = %filter, items = view.len(), "Catalog refreshed");
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(WardrobeEvent::CatalogRefreshed {
                category: match filter {
                    CategoryFilter::All => None,
                    CategoryFilter::Only(c) => Some(c),
                },
                item_count: view.len(),
                timestamp: time::now(),
            });
        }

        Ok(view)
    }

    /// Wait the configured fixed delay, then refresh
    ///
    /// The delay is a guess at indexing lag; the result may still be stale.
    pub async fn refresh_after(
        &self,
        user_id: &str,
        filter: CategoryFilter,
    ) -> Result<CatalogView, CatalogError> {
        tokio::time::sleep(self.policy.fixed_delay).await;
        self.refresh(user_id, filter).await
    }

    /// Poll until at least `expected` items absent from `baseline` are listed
    ///
    /// Issues at most `policy.max_attempts` queries, sleeping
    /// `policy.delay_for_attempt(n)` before query `n`. Running out of attempts
    /// yields `IndexWait::Pending`, not an error. A failed query ends the wait
    /// with that error.
    pub async fn await_new_items(
        &self,
        user_id: &str,
        filter: CategoryFilter,
        baseline: &CatalogView,
        expected: usize,
    ) -> Result<IndexWait, CatalogError> {
        let expected = expected.max(1);
        let mut last = baseline.clone();

        for attempt in 0..self.policy.max_attempts {
            tokio::time::sleep(self.policy.delay_for_attempt(attempt)).await;

            let view = self.refresh(user_id, filter).await?;
            let fresh = view.new_since(baseline).len();
            debug!(attempt, fresh, expected, "Polled catalog for new items");

            if fresh >= expected {
                info!(filter = %filter, fresh, "New items indexed");
                return Ok(IndexWait::Visible(view));
            }
            last = view;
        }

        info!(
            filter = %filter,
            attempts = self.policy.max_attempts,
            "New items not indexed yet"
        );
        Ok(IndexWait::Pending(last))
    }
}
