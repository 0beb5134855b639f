use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{fallback_message, ImageFile, ImageHost, UploadError};

const UPLOAD_URL: &str = "https://api.imghippo.com/v1/upload";
// The host sits behind a bot challenge that lets browser user agents through.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ImgHippoData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    direct_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgHippoResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    direct_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    data: Option<ImgHippoData>,
}

impl ImgHippoResponse {
    fn into_url(self) -> Option<String> {
        let nested = self.data.and_then(|d| d.direct_url.or(d.url));
        self.direct_url
            .or(self.url)
            .or(nested)
            .filter(|u| !u.trim().is_empty())
    }
}

/// Multipart uploads (`api_key`, `file`, `title`) to ImgHippo.
pub struct ImgHippoHost {
    client: reqwest::Client,
    api_key: String,
    upload_url: String,
}

impl ImgHippoHost {
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
impl ImageHost for ImgHippoHost {
    fn name(&self) -> &'static str {
        "imghippo"
    }

    async fn upload(&self, file: &ImageFile, display_name: &str) -> Result<String, UploadError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(display_name.to_string())
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .text("api_key", self.api_key.clone())
            .part("file", part)
            .text("title", display_name.to_string());

        let response = self
            .client
            .post(&self.upload_url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .multipart(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}

pub(crate) fn parse_response(status: u16, body: &str) -> Result<String, UploadError> {
    let parsed: Option<ImgHippoResponse> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .and_then(|p| p.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback_message(body));
        return Err(UploadError::Rejected { status, message });
    }

    let parsed = parsed.ok_or(UploadError::InvalidResponse)?;
    if !parsed.success {
        return Err(UploadError::Rejected {
            status,
            message: parsed.message.unwrap_or_else(|| "Image upload failed".to_string()),
        });
    }
    parsed.into_url().ok_or(UploadError::InvalidResponse)
}
