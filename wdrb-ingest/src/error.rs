//! Error types for wdrb-ingest
//!
//! Three layers:
//! - [`ServiceError`]: what a backend client reports (transport, status, body)
//! - [`IngestFailure`]: terminal reason of one upload attempt
//! - [`CatalogError`]: failure of a catalog refresh

use thiserror::Error;

/// Backend client errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request never produced a response (DNS, connect, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Service answered with a non-success status
    #[error("HTTP {0}: {1}")]
    Status(u16, String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Parse(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Why an upload attempt failed
///
/// All variants are terminal for the attempt. Retrying means calling
/// `ingest` again, which starts from a fresh authorization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestFailure {
    /// No signed-in user
    #[error("You need to sign in before uploading")]
    Unauthenticated,

    /// Upload-URL service refused or could not be reached; nothing was written
    #[error("Upload was not authorized: {0}")]
    AuthorizationDenied(String),

    /// Object store rejected or dropped the transfer
    #[error("Upload transfer failed: {0}")]
    TransferFailed(String),
}

impl IngestFailure {
    /// Stable name of the failure kind, used in events and logs
    pub fn kind(&self) -> &'static str {
        match self {
            IngestFailure::Unauthenticated => "Unauthenticated",
            IngestFailure::AuthorizationDenied(_) => "AuthorizationDenied",
            IngestFailure::TransferFailed(_) => "TransferFailed",
        }
    }
}

/// Catalog refresh errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("You need to sign in to view your wardrobe")]
    Unauthenticated,

    #[error("Catalog query failed: {0}")]
    QueryFailed(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_names() {
        assert_eq!(IngestFailure::Unauthenticated.kind(), "Unauthenticated");
        assert_eq!(
            IngestFailure::AuthorizationDenied("403".into()).kind(),
            "AuthorizationDenied"
        );
        assert_eq!(IngestFailure::TransferFailed("500".into()).kind(), "TransferFailed");
    }

    #[test]
    fn test_failure_messages_include_detail() {
        let failure = IngestFailure::TransferFailed("HTTP 503: busy".to_string());
        assert_eq!(failure.to_string(), "Upload transfer failed: HTTP 503: busy");
    }

    #[test]
    fn test_catalog_error_wraps_service_error() {
        let err: CatalogError = ServiceError::Status(500, "boom".to_string()).into();
        assert!(matches!(err, CatalogError::QueryFailed(ServiceError::Status(500, _))));
        assert_eq!(err.to_string(), "Catalog query failed: HTTP 500: boom");
    }
}
