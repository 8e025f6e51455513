//! Direct-to-storage transfer
//!
//! `PUT {uploadUrl}` with the raw bytes. The URL is pre-signed, so no bearer
//! token is sent; the content type must match what was declared in phase one.

use super::{ensure_success, ObjectStore};
use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use wdrb_common::models::UploadGrant;

pub struct HttpObjectStore {
    http_client: reqwest::Client,
}

impl HttpObjectStore {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        grant: &UploadGrant,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ServiceError> {
        tracing::debug!(key = %grant.key, size = bytes.len(), "Transferring object");

        let response = self
            .http_client
            .put(&grant.upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}
