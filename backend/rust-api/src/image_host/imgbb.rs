use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::multipart::Form;
use serde::Deserialize;

use super::{fallback_message, ImageFile, ImageHost, UploadError};

const UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

#[derive(Debug, Deserialize)]
struct ImgBbData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgBbError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgBbResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ImgBbData>,
    #[serde(default)]
    error: Option<ImgBbError>,
}

impl ImgBbResponse {
    fn error_message(self) -> Option<String> {
        self.error.and_then(|e| e.message).filter(|m| !m.is_empty())
    }
}

/// Base64 uploads to ImgBB; the key travels as a query parameter.
pub struct ImgBbHost {
    client: reqwest::Client,
    api_key: String,
    upload_url: String,
}

impl ImgBbHost {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            upload_url: UPLOAD_URL.to_string(),
        }
    }

    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }
}

#[async_trait]
impl ImageHost for ImgBbHost {
    fn name(&self) -> &'static str {
        "imgbb"
    }

    async fn upload(&self, file: &ImageFile, display_name: &str) -> Result<String, UploadError> {
        let encoded = general_purpose::STANDARD.encode(&file.bytes);
        let form = Form::new()
            .text("image", encoded)
            .text("name", display_name.to_string());

        let response = self
            .client
            .post(&self.upload_url)
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}

pub(crate) fn parse_response(status: u16, body: &str) -> Result<String, UploadError> {
    let parsed: Option<ImgBbResponse> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .and_then(ImgBbResponse::error_message)
            .unwrap_or_else(|| fallback_message(body));
        return Err(UploadError::Rejected { status, message });
    }

    let parsed = parsed.ok_or(UploadError::InvalidResponse)?;
    if !parsed.success {
        return Err(UploadError::Rejected {
            status,
            message: parsed
                .error_message()
                .unwrap_or_else(|| "Image upload failed".to_string()),
        });
    }
    parsed
        .data
        .and_then(|d| d.url)
        .filter(|u| !u.trim().is_empty())
        .ok_or(UploadError::InvalidResponse)
}
