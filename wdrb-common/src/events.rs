//! Event system for the wardrobe client
//!
//! Progress and outcome events for upload attempts and catalog refreshes,
//! broadcast to whatever view layer is listening.

use crate::models::{Category, StorageKey};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Wardrobe client events
///
/// Every event of an upload attempt carries that attempt's id, so a view can
/// track several concurrent uploads independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WardrobeEvent {
    /// Upload attempt began (before any network call)
    IngestStarted {
        attempt_id: Uuid,
        file_name: String,
        category: Category,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Upload URL issued; the transfer is about to start
    UploadAuthorized {
        attempt_id: Uuid,
        key: StorageKey,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Binary stored; the item will appear once the backend indexes it
    IngestAccepted {
        attempt_id: Uuid,
        key: StorageKey,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Upload attempt terminated with a failure
    IngestFailed {
        attempt_id: Uuid,
        /// Failure kind (`Unauthenticated`, `AuthorizationDenied`, `TransferFailed`)
        reason: String,
        /// User-visible message
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Catalog view re-fetched
    CatalogRefreshed {
        /// Category label, `None` when unfiltered
        category: Option<Category>,
        item_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl WardrobeEvent {
    /// Attempt id for upload events, `None` for catalog events
    pub fn attempt_id(&self) -> Option<Uuid> {
        match self {
            WardrobeEvent::IngestStarted { attempt_id, .. }
            | WardrobeEvent::UploadAuthorized { attempt_id, .. }
            | WardrobeEvent::IngestAccepted { attempt_id, .. }
            | WardrobeEvent::IngestFailed { attempt_id, .. } => Some(*attempt_id),
            WardrobeEvent::CatalogRefreshed { .. } => None,
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use wdrb_common::events::{EventBus, WardrobeEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(WardrobeEvent::CatalogRefreshed {
///     category: None,
///     item_count: 3,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(WardrobeEvent::CatalogRefreshed { item_count: 3, .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WardrobeEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<WardrobeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WardrobeEvent) {
        let _ = self.tx.send(event);
    }
}
