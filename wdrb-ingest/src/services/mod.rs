//! Backend service clients
//!
//! Each external collaborator sits behind a trait so the coordinator and the
//! refresher can be driven by in-memory fakes in tests. The `Http*` types are
//! the production implementations.

pub mod catalog_client;
pub mod object_store_client;
pub mod upload_url_client;

pub use catalog_client::HttpCatalogClient;
pub use object_store_client::HttpObjectStore;
pub use upload_url_client::HttpUploadAuthorizer;

use crate::error::ServiceError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use wdrb_common::models::UploadGrant;
use wdrb_common::{Category, CategoryFilter, UserId, WardrobeItem};

const USER_AGENT: &str = concat!("wdrb-ingest/", env!("CARGO_PKG_VERSION"));

/// Body of an upload-URL request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub user_id: UserId,
    pub file_name: String,
    pub content_type: String,
    pub category: Category,
}

/// Issues time-limited write URLs (phase one of an upload)
#[async_trait]
pub trait UploadAuthorizer: Send + Sync {
    async fn authorize(&self, request: &UploadRequest) -> Result<UploadGrant, ServiceError>;
}

/// Accepts direct binary transfers to a granted URL (phase two)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        grant: &UploadGrant,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ServiceError>;
}

/// Lists the items the backend has indexed for a user
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    async fn list_items(
        &self,
        user: &UserId,
        filter: CategoryFilter,
    ) -> Result<Vec<WardrobeItem>, ServiceError>;
}

/// Shared reqwest client for all backend calls
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::Network(e.to_string()))
}

/// Turn a non-success response into `ServiceError::Status`
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Status(status.as_u16(), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_wire_format() {
        let request = UploadRequest {
            user_id: UserId::new("user-42").unwrap(),
            file_name: "coat.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            category: Category::UpperWear,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "userId": "user-42",
                "fileName": "coat.jpg",
                "contentType": "image/jpeg",
                "category": "Upper Wear",
            })
        );
    }

    #[test]
    fn test_client_creation() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }
}
