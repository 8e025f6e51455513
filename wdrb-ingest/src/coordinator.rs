//! Asset ingestion coordinator
//!
//! Drives one file from "selected" to "stored": request an upload URL, then
//! transfer the bytes to it. The two phases of an attempt run strictly in
//! that order; separate attempts are independent and may overlap.
//!
//! The coordinator never touches the catalog. A successful attempt only means
//! the object store holds the bytes; the backend indexes the item on its own
//! schedule and the caller re-queries through
//! [`CatalogRefresher`](crate::refresh::CatalogRefresher).
//!
//! No retries happen here. A failed attempt discards its storage key and the
//! caller decides whether to call `ingest` again.

use crate::error::IngestFailure;
use crate::file::LocalFile;
use crate::services::{ObjectStore, UploadAuthorizer, UploadRequest};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use wdrb_common::events::{EventBus, WardrobeEvent};
use wdrb_common::models::StorageKey;
use wdrb_common::{time, Category, UserId};

/// Result of one upload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Bytes stored under `key`; the item may not be listed yet
    Accepted { key: StorageKey },
    /// Attempt terminated; nothing to clean up
    Failed(IngestFailure),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    pub fn failure(&self) -> Option<&IngestFailure> {
        match self {
            Outcome::Failed(failure) => Some(failure),
            Outcome::Accepted { .. } => None,
        }
    }
}

/// Outcome of one file in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file_name: String,
    pub category: Category,
    pub outcome: Outcome,
}

/// Everything one attempt needs; dropped when the attempt ends
struct UploadIntent {
    attempt_id: Uuid,
    file: LocalFile,
    category: Category,
    user: UserId,
}

impl UploadIntent {
    fn request(&self) -> UploadRequest {
        UploadRequest {
            user_id: self.user.clone(),
            file_name: self.file.name().to_string(),
            content_type: self.file.content_type().to_string(),
            category: self.category,
        }
    }
}

/// Two-phase upload coordinator
///
/// Holds only its collaborators, so one instance can serve any number of
/// concurrent attempts.
#[derive(Clone)]
pub struct IngestionCoordinator {
    authorizer: Arc<dyn UploadAuthorizer>,
    store: Arc<dyn ObjectStore>,
    event_bus: Option<EventBus>,
}

impl IngestionCoordinator {
    pub fn new(authorizer: Arc<dyn UploadAuthorizer>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            authorizer,
            store,
            event_bus: None,
        }
    }

    /// Report attempt progress on `event_bus`
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Upload one file
    ///
    /// Calls the upload-URL service once and, only if that succeeds, the
    /// object store once. A blank `user_id` fails with `Unauthenticated`
    /// before either call.
    pub async fn ingest(&self, file: LocalFile, category: Category, user_id: &str) -> Outcome {
        let attempt_id = Uuid::new_v4();

        self.emit(WardrobeEvent::IngestStarted {
            attempt_id,
            file_name: file.name().to_string(),
            category,
            timestamp: time::now(),
        });

        let Some(user) = UserId::new(user_id) else {
            return self.fail(attempt_id, file.name(), IngestFailure::Unauthenticated);
        };

        let intent = UploadIntent {
            attempt_id,
            file,
            category,
            user,
        };

        self.run(intent).await
    }

    /// Upload several files concurrently
    ///
    /// Each file is its own attempt. Results come back in input order.
    pub async fn ingest_all(
        &self,
        files: Vec<LocalFile>,
        category: Category,
        user_id: &str,
    ) -> Vec<FileOutcome> {
        let attempts = files.into_iter().map(|file| async move {
            let file_name = file.name().to_string();
            let outcome = self.ingest(file, category, user_id).await;
            FileOutcome {
                file_name,
                category,
                outcome,
            }
        });

        join_all(attempts).await
    }

    async fn run(&self, intent: UploadIntent) -> Outcome {
        let attempt_id = intent.attempt_id;
        let request = intent.request();

        // Phase 1: upload authorization
        let grant = match self.authorizer.authorize(&request).await {
            Ok(grant) => grant,
            Err(e) => {
                return self.fail(
                    attempt_id,
                    &request.file_name,
                    IngestFailure::AuthorizationDenied(e.to_string()),
                );
            }
        };

        info!(
            attempt = %attempt_id,
            file = %request.file_name,
            key = %grant.key,
            "Upload authorized"
        );
        self.emit(WardrobeEvent::UploadAuthorized {
            attempt_id,
            key: grant.key.clone(),
            timestamp: time::now(),
        });

        // Phase 2: transfer; the file contents move into the request body
        let bytes = intent.file.into_bytes();
        if let Err(e) = self.store.put(&grant, &request.content_type, bytes).await {
            return self.fail(
                attempt_id,
                &request.file_name,
                IngestFailure::TransferFailed(e.to_string()),
            );
        }

        info!(
            attempt = %attempt_id,
            file = %request.file_name,
            category = %request.category,
            key = %grant.key,
            "Upload accepted, awaiting indexing"
        );
        self.emit(WardrobeEvent::IngestAccepted {
            attempt_id,
            key: grant.key.clone(),
            timestamp: time::now(),
        });

        Outcome::Accepted { key: grant.key }
    }

    fn fail(&self, attempt_id: Uuid, file_name: &str, failure: IngestFailure) -> Outcome {
        warn!(
            attempt = %attempt_id,
            file = %file_name,
            reason = failure.kind(),
            "Upload failed: {}",
            failure
        );
        self.emit(WardrobeEvent::IngestFailed {
            attempt_id,
            reason: failure.kind().to_string(),
            message: failure.to_string(),
            timestamp: time::now(),
        });

        Outcome::Failed(failure)
    }

    fn emit(&self, event: WardrobeEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}
