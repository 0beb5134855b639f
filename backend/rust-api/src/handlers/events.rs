use axum::{
    extract::{rejection::JsonRejection, FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::image_host::ImageFile;
use crate::models::{parse_record_id, Event, EventDraft, EventPatch};
use crate::store::EventRecords;

/// Most files a single create request may carry in its `images` parts.
pub const MAX_EVENT_IMAGES: usize = 10;

/// Body of `POST /events`, JSON or multipart. Files are handled separately; only
/// already-hosted URLs travel in `imageUrls`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(rename = "Heading", alias = "heading", default)]
    pub heading: Option<String>,
    #[serde(rename = "Description", alias = "description", default)]
    pub description: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_link: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub reverse: bool,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
}

impl CreateEventRequest {
    /// Keeps only `http(s)://` URLs and turns blank optional strings into absent ones.
    pub fn into_draft(self) -> EventDraft {
        EventDraft {
            heading: self.heading.unwrap_or_default(),
            description: self.description,
            images: self
                .image_urls
                .into_iter()
                .map(|url| url.trim().to_string())
                .filter(|url| is_http_url(url))
                .collect(),
            date: non_blank(self.date),
            form_link: non_blank(self.form_link),
            qr_link: non_blank(self.qr_link),
            reverse: self.reverse,
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrText {
    Bool(bool),
    Text(String),
}

// Form posts send "true"/"false" as text.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<BoolOrText>::deserialize(deserializer)? {
        Some(BoolOrText::Bool(b)) => b,
        Some(BoolOrText::Text(t)) => t.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(url)) => vec![url],
        Some(OneOrMany::Many(urls)) => urls,
        None => Vec::new(),
    })
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

async fn read_multipart(mut multipart: Multipart) -> Result<(CreateEventRequest, Vec<ImageFile>), ApiError> {
    let mut request = CreateEventRequest::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" {
            let file_name = field.file_name().filter(|n| !n.is_empty()).map(str::to_string);
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(|e| ApiError::bad_request(e.body_text()))?;
            // Browsers send an empty unnamed part for an untouched file input.
            if bytes.is_empty() && file_name.is_none() {
                continue;
            }
            if files.len() == MAX_EVENT_IMAGES {
                return Err(ApiError::bad_request(format!("At most {MAX_EVENT_IMAGES} images per event")));
            }
            files.push(ImageFile::new(bytes.to_vec(), content_type, file_name));
            continue;
        }

        let text = field.text().await.map_err(|e| ApiError::bad_request(e.body_text()))?;
        match name.as_str() {
            "Heading" | "heading" => request.heading = Some(text),
            "Description" | "description" => request.description = Value::String(text),
            "date" => request.date = Some(text),
            "formLink" => request.form_link = Some(text),
            "qrLink" => request.qr_link = Some(text),
            "reverse" => request.reverse = text.trim().eq_ignore_ascii_case("true"),
            "imageUrls" => request.image_urls.push(text),
            other => tracing::debug!("Ignoring form field {}", other),
        }
    }

    Ok((request, files))
}

pub async fn create_event(
    State(state): State<AppState>,
    req: Request,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let (request, files) = if is_multipart(&req) {
        let multipart = Multipart::from_request(req, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        read_multipart(multipart).await?
    } else {
        let Json(request) = Json::<CreateEventRequest>::from_request(req, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        (request, Vec::new())
    };

    let mut draft = request.into_draft();
    // Nothing is uploaded for a request that would be rejected anyway.
    draft.validate().map_err(ApiError::bad_request)?;

    if !files.is_empty() {
        let mut images = state
            .uploader
            .upload_all(&files, &draft.heading)
            .await
            .map_err(|e| ApiError::from_upload("Failed to create event", e))?;
        images.append(&mut draft.images);
        draft.images = images;
    }

    let event = state
        .store
        .create_event(draft)
        .await
        .map_err(|e| ApiError::from_store("Failed to create event", e))?;

    tracing::info!("Created event {} (#{})", event.id, event.event_number);
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state
        .store
        .list_events()
        .await
        .map_err(|e| ApiError::from_store("Failed to fetch events", e))?;
    Ok(Json(events))
}

pub async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Event>, ApiError> {
    let id = parse_record_id(&id).ok_or(ApiError::NotFound)?;
    let event = state
        .store
        .get_event(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to fetch event", e))?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EventPatch>, JsonRejection>,
) -> Result<Json<Event>, ApiError> {
    let id = parse_record_id(&id).ok_or(ApiError::NotFound)?;
    let Json(patch) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let event = state
        .store
        .update_event(id, patch)
        .await
        .map_err(|e| ApiError::from_store("Failed to update event", e))?;

    tracing::info!("Updated event {}", event.id);
    Ok(Json(event))
}

pub async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_record_id(&id).ok_or(ApiError::NotFound)?;
    state
        .store
        .delete_event(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to delete event", e))?;

    tracing::info!("Deleted event {}", id);
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_urls_accept_a_single_string() {
        let request: CreateEventRequest = serde_json::from_value(json!({
            "Heading": "Hack Night",
            "Description": "Intro",
            "imageUrls": "https://i.example/a.png"
        }))
        .unwrap();
        assert_eq!(request.image_urls, vec!["https://i.example/a.png"]);
    }

    #[test]
    fn reverse_accepts_text_and_bool() {
        let text: CreateEventRequest = serde_json::from_value(json!({ "reverse": "true" })).unwrap();
        assert!(text.reverse);
        let flag: CreateEventRequest = serde_json::from_value(json!({ "reverse": false })).unwrap();
        assert!(!flag.reverse);
        let missing: CreateEventRequest = serde_json::from_value(json!({})).unwrap();
        assert!(!missing.reverse);
    }

    #[test]
    fn draft_drops_non_http_urls_and_blank_links() {
        let request = CreateEventRequest {
            heading: Some("Hack Night".to_string()),
            description: json!("Intro"),
            form_link: Some("  ".to_string()),
            qr_link: Some("https://qr.example/1".to_string()),
            image_urls: vec![
                "https://i.example/a.png".to_string(),
                "ftp://files.example/b.png".to_string(),
                "data:image/png;base64,AAAA".to_string(),
                " http://i.example/c.png ".to_string(),
            ],
            ..Default::default()
        };
        let draft = request.into_draft();
        assert_eq!(draft.images, vec!["https://i.example/a.png", "http://i.example/c.png"]);
        assert_eq!(draft.form_link, None);
        assert_eq!(draft.qr_link.as_deref(), Some("https://qr.example/1"));
    }

    #[test]
    fn lowercase_heading_is_accepted() {
        let request: CreateEventRequest =
            serde_json::from_value(json!({ "heading": "lower", "description": "d" })).unwrap();
        assert!(request.into_draft().validate().is_ok());
    }
}
