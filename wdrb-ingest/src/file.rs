//! Local file selected for upload
//!
//! The bytes are read once when the file is loaded, so the OS handle is
//! released before any network call starts.

use std::path::Path;
use wdrb_common::{Error, Result};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file ready to be uploaded: name, declared content type, contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl LocalFile {
    /// Build from in-memory contents
    ///
    /// Name and content type must be non-empty.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let name = name.into();
        let content_type = content_type.into();

        if name.trim().is_empty() {
            return Err(Error::InvalidInput("File name must not be empty".to_string()));
        }
        if content_type.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "File {:?} has no content type",
                name
            )));
        }

        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    /// Read a file from disk and detect its content type
    pub async fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidInput(format!("Not a file path: {}", path.display())))?;

        let bytes = tokio::fs::read(path).await?;
        let content_type = detect_content_type(&name, &bytes);

        tracing::debug!(
            file = %name,
            content_type = %content_type,
            size = bytes.len(),
            "Loaded file for upload"
        );

        Self::new(name, content_type, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Consume the file, yielding its contents
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Content type from magic bytes, then extension, then octet-stream
pub fn detect_content_type(name: &str, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let by_extension = match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("bmp") => "image/bmp",
        _ => FALLBACK_CONTENT_TYPE,
    };

    by_extension.to_string()
}
