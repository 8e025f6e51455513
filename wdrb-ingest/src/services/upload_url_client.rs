//! Upload-URL service client
//!
//! `POST {endpoint}` with `{userId, fileName, contentType, category}`;
//! answers `{uploadUrl, key}`.

use super::{ensure_success, UploadAuthorizer, UploadRequest};
use crate::error::ServiceError;
use async_trait::async_trait;
use wdrb_common::models::UploadGrant;

pub struct HttpUploadAuthorizer {
    http_client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpUploadAuthorizer {
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            auth_token,
        }
    }
}

#[async_trait]
impl UploadAuthorizer for HttpUploadAuthorizer {
    async fn authorize(&self, request: &UploadRequest) -> Result<UploadGrant, ServiceError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            file = %request.file_name,
            category = %request.category,
            "Requesting upload URL"
        );

        let mut builder = self.http_client.post(&self.endpoint).json(request);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let response = ensure_success(response).await?;

        let grant: UploadGrant = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        if grant.upload_url.trim().is_empty() {
            return Err(ServiceError::Parse("uploadUrl is empty".to_string()));
        }

        Ok(grant)
    }
}
