//! Local blob store for user uploads.
//!
//! Blobs live under a root directory and are served read-only at `/blobs`.

use std::path::{Path, PathBuf};

use crate::errors::AppError;

/// Route prefix the blob directory is served under.
pub const BLOB_ROUTE: &str = "/blobs";

pub struct BlobStore {
    root: PathBuf,
    public_base_url: String,
}

/// Split a blob path into safe segments.
fn segments(path: &str) -> Result<Vec<&str>, AppError> {
    let parts: Vec<&str> = path.split('/').collect();
    let valid = |s: &str| {
        !s.is_empty()
            && s != "."
            && s != ".."
            && s.bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
    };
    if parts.iter().all(|s| valid(s)) {
        Ok(parts)
    } else {
        Err(AppError::BadRequest(format!("Invalid blob path '{}'", path)))
    }
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL of the blob at `path`.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}{}/{}", self.public_base_url, BLOB_ROUTE, path)
    }

    /// Store `bytes` at `path`, replacing any previous blob, and return its public URL.
    pub async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, AppError> {
        let target = segments(path)?
            .into_iter()
            .fold(self.root.clone(), |acc, segment| acc.join(segment));

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write then rename so readers never see a partial file
        let staging = target.with_extension(format!("{}.part", uuid::Uuid::new_v4()));
        tokio::fs::write(&staging, bytes).await?;
        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            tokio::fs::remove_file(&staging).await.ok();
            return Err(e.into());
        }

        tracing::info!(path = %path, size = bytes.len(), "Stored blob");
        Ok(self.public_url(path))
    }
}

/// File extension for an accepted image content type.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}
