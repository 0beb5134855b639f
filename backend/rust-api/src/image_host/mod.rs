//! Image hosting client.
//!
//! Images are never stored locally: each file is pushed to a third-party host and only the
//! returned public URL is persisted. This module provides:
//! - [`ImageHost`], the provider seam
//! - [`ImgHippoHost`] and [`ImgBbHost`], the two live providers, picked via
//!   [`ImageHostProvider`]
//! - [`MockImageHost`] for tests and offline development
//! - [`ImageUploader`], which enforces the size limit and uploads batches in order

mod imgbb;
mod imghippo;
mod mock;

pub use imgbb::ImgBbHost;
pub use imghippo::ImgHippoHost;
pub use mock::MockImageHost;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("file {name} is {size} bytes, limit is {max}")]
    TooLarge { name: String, size: usize, max: usize },
    #[error("file {0} is empty")]
    EmptyFile(String),
    #[error("image host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid provider response")]
    InvalidResponse,
    #[error("image host unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One file as received from a client.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: Option<String>,
}

impl ImageFile {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>, file_name: Option<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            file_name,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    fn name(&self) -> &'static str;

    /// Upload one file, returning its public URL. Single attempt.
    async fn upload(&self, file: &ImageFile, display_name: &str) -> Result<String, UploadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageHostProvider {
    ImgHippo,
    ImgBb,
}

impl FromStr for ImageHostProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imghippo" => Ok(Self::ImgHippo),
            "imgbb" => Ok(Self::ImgBb),
            other => Err(format!("Unknown IMAGE_HOST_PROVIDER '{other}', expected imghippo or imgbb")),
        }
    }
}

pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
}

pub fn build_host(provider: ImageHostProvider, api_key: String, client: reqwest::Client) -> Arc<dyn ImageHost> {
    match provider {
        ImageHostProvider::ImgHippo => Arc::new(ImgHippoHost::new(client, api_key)),
        ImageHostProvider::ImgBb => Arc::new(ImgBbHost::new(client, api_key)),
    }
}

/// Size-checked, ordered uploads on top of an [`ImageHost`].
#[derive(Clone)]
pub struct ImageUploader {
    host: Arc<dyn ImageHost>,
    max_bytes: usize,
}

impl ImageUploader {
    pub fn new(host: Arc<dyn ImageHost>, max_bytes: usize) -> Self {
        Self { host, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn check(&self, file: &ImageFile, name: &str) -> Result<(), UploadError> {
        if file.is_empty() {
            return Err(UploadError::EmptyFile(name.to_string()));
        }
        if file.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                name: name.to_string(),
                size: file.len(),
                max: self.max_bytes,
            });
        }
        Ok(())
    }

    pub async fn upload_one(&self, file: &ImageFile) -> Result<String, UploadError> {
        let name = file.file_name.clone().unwrap_or_else(|| "upload".to_string());
        self.check(file, &name)?;
        self.host.upload(file, &name).await
    }

    /// Uploads sequentially and returns URLs in input order. Every file is size-checked
    /// before the first request goes out; any failure fails the whole batch.
    pub async fn upload_all(&self, files: &[ImageFile], title: &str) -> Result<Vec<String>, UploadError> {
        let names: Vec<String> = files
            .iter()
            .enumerate()
            .map(|(i, f)| f.file_name.clone().unwrap_or_else(|| format!("{}-{}", title, i + 1)))
            .collect();

        for (file, name) in files.iter().zip(&names) {
            self.check(file, name)?;
        }

        let mut urls = Vec::with_capacity(files.len());
        for (file, name) in files.iter().zip(&names) {
            let url = self.host.upload(file, name).await.map_err(|e| {
                tracing::error!("{} upload failed for {}: {}", self.host.name(), name, e);
                e
            })?;
            tracing::debug!("Uploaded {} to {}", name, url);
            urls.push(url);
        }
        Ok(urls)
    }
}

/// Trimmed body text for error messages.
fn body_snippet(body: &str) -> String {
    let trimmed = body.trim();
    trimmed.chars().take(500).collect()
}

/// Message for a non-2xx answer that carried no provider message.
pub(crate) fn fallback_message(body: &str) -> String {
    let snippet = body_snippet(body);
    if snippet.is_empty() {
        "Image upload failed".to_string()
    } else {
        snippet
    }
}
