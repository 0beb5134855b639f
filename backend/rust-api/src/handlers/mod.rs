pub mod auth;
pub mod blogs;
pub mod events;

use axum::response::Json;
use serde_json::{json, Value};

pub use auth::{login, logout, verify, LoginRequest};
pub use blogs::{create_blog, delete_blog, get_blog, list_blogs, update_blog};
pub use events::{create_event, delete_event, get_event, list_events, update_event, CreateEventRequest};

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
