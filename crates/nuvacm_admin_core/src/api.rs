//! HTTP client for the CMS API (auth, events, blogs).

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use nuvacm_api::handlers::{CreateEventRequest, LoginRequest};
use nuvacm_api::image_host::UploadError;
use nuvacm_api::models::{BlogDraft, BlogPatch, BlogPost, Event, EventPatch, RecordId};
use nuvacm_api::services::Credential;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected before anything was sent.
    #[error("{0}")]
    Validation(String),
    /// Non-2xx answer; `message` is the server's own text.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[async_trait]
pub trait CmsApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ClientResult<Credential>;
    async fn logout(&self) -> ClientResult<()>;

    async fn list_events(&self) -> ClientResult<Vec<Event>>;
    async fn create_event(&self, request: &CreateEventRequest) -> ClientResult<Event>;
    async fn update_event(&self, id: RecordId, patch: &EventPatch) -> ClientResult<Event>;
    async fn delete_event(&self, id: RecordId) -> ClientResult<()>;

    async fn list_blogs(&self) -> ClientResult<Vec<BlogPost>>;
    async fn create_blog(&self, draft: &BlogDraft) -> ClientResult<BlogPost>;
    async fn update_blog(&self, id: RecordId, patch: &BlogPatch) -> ClientResult<BlogPost>;
    async fn delete_blog(&self, id: RecordId) -> ClientResult<()>;
}

/// Pulls the human-readable message out of an error body: `error`, then `message`, then
/// the raw text.
pub fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(text) = json.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let text = body.trim();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("Request failed").to_string()
    } else {
        text.to_string()
    }
}

pub struct HttpCmsApi {
    client: reqwest::Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

impl HttpCmsApi {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let request = match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            log::warn!("API call failed: {} - {}", status, text);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: server_message(status, &text),
            });
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CmsApi for HttpCmsApi {
    /// POST /auth/login; keeps the token for later calls.
    async fn login(&self, username: &str, password: &str) -> ClientResult<Credential> {
        let body = LoginRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        };
        let credential: Credential = self
            .send(self.client.post(self.url("/auth/login")).json(&body))
            .await?;
        self.set_token(Some(credential.token.clone()));
        Ok(credential)
    }

    /// Drops the token locally first, so a failed call still logs the console out.
    async fn logout(&self) -> ClientResult<()> {
        self.set_token(None);
        let _: serde_json::Value = self.send(self.client.post(self.url("/auth/logout"))).await?;
        Ok(())
    }

    async fn list_events(&self) -> ClientResult<Vec<Event>> {
        self.send(self.client.get(self.url("/events"))).await
    }

    async fn create_event(&self, request: &CreateEventRequest) -> ClientResult<Event> {
        self.send(self.client.post(self.url("/events")).json(request)).await
    }

    async fn update_event(&self, id: RecordId, patch: &EventPatch) -> ClientResult<Event> {
        self.send(self.client.put(self.url(&format!("/events/{id}"))).json(patch))
            .await
    }

    async fn delete_event(&self, id: RecordId) -> ClientResult<()> {
        let _: serde_json::Value = self
            .send(self.client.delete(self.url(&format!("/events/{id}"))))
            .await?;
        Ok(())
    }

    async fn list_blogs(&self) -> ClientResult<Vec<BlogPost>> {
        self.send(self.client.get(self.url("/blogs"))).await
    }

    async fn create_blog(&self, draft: &BlogDraft) -> ClientResult<BlogPost> {
        self.send(self.client.post(self.url("/blogs")).json(draft)).await
    }

    async fn update_blog(&self, id: RecordId, patch: &BlogPatch) -> ClientResult<BlogPost> {
        self.send(self.client.put(self.url(&format!("/blogs/{id}"))).json(patch))
            .await
    }

    async fn delete_blog(&self, id: RecordId) -> ClientResult<()> {
        let _: serde_json::Value = self
            .send(self.client.delete(self.url(&format!("/blogs/{id}"))))
            .await?;
        Ok(())
    }
}
