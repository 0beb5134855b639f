//! Provider requests as seen by a local stand-in for the image host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Query, State};
use axum::http::{header::USER_AGENT, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use nuvacm_api::image_host::{ImageFile, ImageHost, ImgBbHost, ImgHippoHost, UploadError};

#[derive(Debug, Clone)]
struct ReceivedPart {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl ReceivedPart {
    fn text(&self) -> String {
        String::from_utf8(self.bytes.clone()).expect("utf8 field")
    }
}

#[derive(Debug, Default)]
struct ReceivedUpload {
    query: HashMap<String, String>,
    user_agent: Option<String>,
    parts: HashMap<String, ReceivedPart>,
}

#[derive(Clone)]
struct StubHost {
    seen: Arc<Mutex<Vec<ReceivedUpload>>>,
    status: StatusCode,
    reply: String,
}

async fn record_upload(
    State(stub): State<StubHost>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    let mut parts = HashMap::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.expect("field bytes").to_vec();
        parts.insert(name, ReceivedPart { file_name, content_type, bytes });
    }
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.seen.lock().unwrap().push(ReceivedUpload { query, user_agent, parts });
    (stub.status, stub.reply.clone())
}

async fn spawn_stub(status: StatusCode, reply: &str) -> (String, Arc<Mutex<Vec<ReceivedUpload>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = StubHost {
        seen: seen.clone(),
        status,
        reply: reply.to_string(),
    };
    let app = Router::new().route("/upload", post(record_upload)).with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    (format!("http://{addr}/upload"), seen)
}

fn poster() -> ImageFile {
    ImageFile::new(vec![0x89, b'P', b'N', b'G', 1, 2, 3], "image/png", Some("poster.png".to_string()))
}

#[tokio::test]
async fn imghippo_sends_key_file_and_title_with_browser_agent() {
    let (url, seen) = spawn_stub(
        StatusCode::OK,
        r#"{"success":true,"direct_url":"https://i.imghippo.com/files/poster.png"}"#,
    )
    .await;
    let host = ImgHippoHost::new(reqwest::Client::new(), "hippo-key".to_string()).with_upload_url(url);

    let hosted = host.upload(&poster(), "poster.png").await.expect("upload");
    assert_eq!(hosted, "https://i.imghippo.com/files/poster.png");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let upload = &seen[0];
    assert_eq!(upload.parts["api_key"].text(), "hippo-key");
    assert_eq!(upload.parts["title"].text(), "poster.png");
    let file = &upload.parts["file"];
    assert_eq!(file.bytes, poster().bytes);
    assert_eq!(file.file_name.as_deref(), Some("poster.png"));
    assert_eq!(file.content_type.as_deref(), Some("image/png"));
    assert!(upload.user_agent.as_deref().is_some_and(|ua| ua.starts_with("Mozilla/5.0")));
    assert!(upload.query.is_empty());
}

#[tokio::test]
async fn imghippo_rejection_carries_provider_message() {
    let (url, _) = spawn_stub(StatusCode::UNAUTHORIZED, r#"{"success":false,"message":"Invalid API key"}"#).await;
    let host = ImgHippoHost::new(reqwest::Client::new(), "bad".to_string()).with_upload_url(url);

    match host.upload(&poster(), "poster.png").await {
        Err(UploadError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn imgbb_sends_key_query_and_base64_image() {
    let (url, seen) = spawn_stub(
        StatusCode::OK,
        r#"{"success":true,"status":200,"data":{"url":"https://i.ibb.co/x/poster.png"}}"#,
    )
    .await;
    let host = ImgBbHost::new(reqwest::Client::new(), "bb-key".to_string()).with_upload_url(url);

    let hosted = host.upload(&poster(), "poster.png").await.expect("upload");
    assert_eq!(hosted, "https://i.ibb.co/x/poster.png");

    let seen = seen.lock().unwrap();
    let upload = &seen[0];
    assert_eq!(upload.query.get("key").map(String::as_str), Some("bb-key"));
    let decoded = general_purpose::STANDARD
        .decode(upload.parts["image"].text())
        .expect("base64 image");
    assert_eq!(decoded, poster().bytes);
    assert_eq!(upload.parts["name"].text(), "poster.png");
}

#[tokio::test]
async fn imgbb_empty_error_body_gets_generic_message() {
    let (url, _) = spawn_stub(StatusCode::BAD_GATEWAY, "").await;
    let host = ImgBbHost::new(reqwest::Client::new(), "bb-key".to_string()).with_upload_url(url);

    match host.upload(&poster(), "poster.png").await {
        Err(UploadError::Rejected { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "Image upload failed");
        }
        other => panic!("unexpected: {other:?}"),
    }
}
