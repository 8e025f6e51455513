//! Catalog query client
//!
//! `GET {endpoint}?userId=..&category=..`. The backend answers either with a
//! bare JSON array of items or with `{"items": [...]}`.

use super::{ensure_success, CatalogQuery};
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::Deserialize;
use wdrb_common::{CategoryFilter, UserId, WardrobeItem};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogResponse {
    List(Vec<WardrobeItem>),
    Wrapped { items: Vec<WardrobeItem> },
}

impl CatalogResponse {
    fn into_items(self) -> Vec<WardrobeItem> {
        match self {
            CatalogResponse::List(items) | CatalogResponse::Wrapped { items } => items,
        }
    }
}

pub struct HttpCatalogClient {
    http_client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpCatalogClient {
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            auth_token,
        }
    }
}

#[async_trait]
impl CatalogQuery for HttpCatalogClient {
    async fn list_items(
        &self,
        user: &UserId,
        filter: CategoryFilter,
    ) -> Result<Vec<WardrobeItem>, ServiceError> {
        let mut query: Vec<(&str, &str)> = vec![("userId", user.as_str())];
        if let Some(label) = filter.as_label() {
            query.push(("category", label));
        }

        tracing::debug!(endpoint = %self.endpoint, user = %user, filter = %filter, "Querying catalog");

        let mut builder = self.http_client.get(&self.endpoint).query(&query);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let response = ensure_success(response).await?;

        let body: CatalogResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        Ok(body.into_items())
    }
}
