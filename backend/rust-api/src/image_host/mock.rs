//! Deterministic in-process image host for tests and local development.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{ImageFile, ImageHost, UploadError};

pub struct MockImageHost {
    base_url: String,
    /// Number of uploads that succeed before every further one is rejected.
    succeed_limit: Option<usize>,
    attempts: AtomicUsize,
    uploaded: Mutex<Vec<String>>,
}

impl Default for MockImageHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageHost {
    pub fn new() -> Self {
        Self {
            base_url: "https://images.test".to_string(),
            succeed_limit: None,
            attempts: AtomicUsize::new(0),
            uploaded: Mutex::new(Vec::new()),
        }
    }

    /// A host that accepts `successes` uploads and rejects the rest with a 502.
    pub fn failing_after(successes: usize) -> Self {
        Self {
            succeed_limit: Some(successes),
            ..Self::new()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Display names of successful uploads, in order.
    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ImageHost for MockImageHost {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn upload(&self, _file: &ImageFile, display_name: &str) -> Result<String, UploadError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.succeed_limit.is_some_and(|limit| attempt >= limit) {
            return Err(UploadError::Rejected {
                status: 502,
                message: "mock upstream failure".to_string(),
            });
        }
        let mut uploaded = self.uploaded.lock().unwrap_or_else(PoisonError::into_inner);
        uploaded.push(display_name.to_string());
        Ok(format!("{}/{}/{}", self.base_url, uploaded.len(), display_name))
    }
}
