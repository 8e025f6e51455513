//! wdrb-ingest library
//!
//! Client-side upload-and-sync flow for the wardrobe: authorize an upload,
//! transfer the photo to storage, then re-query the catalog until the backend
//! has indexed it.

pub mod coordinator;
pub mod error;
pub mod file;
pub mod identity;
pub mod refresh;
pub mod services;
pub mod summary;

pub use crate::coordinator::{FileOutcome, IngestionCoordinator, Outcome};
pub use crate::error::{CatalogError, IngestFailure, ServiceError};
pub use crate::file::LocalFile;
pub use crate::identity::{IdentityProvider, StaticIdentity};
pub use crate::refresh::{CatalogRefresher, IndexWait};
pub use crate::summary::WardrobeSummary;

use crate::services::{build_http_client, HttpCatalogClient, HttpObjectStore, HttpUploadAuthorizer};
use std::sync::Arc;
use wdrb_common::config::{RefreshPolicy, ServiceEndpoints};
use wdrb_common::events::EventBus;

/// Coordinator and refresher wired to the HTTP backend
#[derive(Clone)]
pub struct WardrobeClient {
    pub coordinator: IngestionCoordinator,
    pub refresher: CatalogRefresher,
}

impl WardrobeClient {
    /// Build both halves on one shared HTTP client
    pub fn connect(
        endpoints: &ServiceEndpoints,
        policy: RefreshPolicy,
        event_bus: EventBus,
    ) -> Result<Self, ServiceError> {
        let http_client = build_http_client(endpoints.request_timeout)?;

        let authorizer = Arc::new(HttpUploadAuthorizer::new(
            http_client.clone(),
            endpoints.authorization_url.clone(),
            endpoints.auth_token.clone(),
        ));
        let store = Arc::new(HttpObjectStore::new(http_client.clone()));
        let catalog = Arc::new(HttpCatalogClient::new(
            http_client,
            endpoints.catalog_url.clone(),
            endpoints.auth_token.clone(),
        ));

        Ok(Self {
            coordinator: IngestionCoordinator::new(authorizer, store)
                .with_event_bus(event_bus.clone()),
            refresher: CatalogRefresher::new(catalog, policy).with_event_bus(event_bus),
        })
    }
}
