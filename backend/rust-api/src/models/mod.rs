//! Domain records (events, blog posts), their drafts and their partial-update structs.

pub mod blog;
pub mod event;
pub mod ids;
pub mod patch;

pub use blog::{BlogDraft, BlogPatch, BlogPost, DEFAULT_BLOG_TAG};
pub use event::{Event, EventDraft, EventPatch};
pub use ids::{new_record_id, parse_record_id, RecordId};
pub use patch::Patch;

/// True when a free-form JSON field carries no usable content:
/// `null`, or a string that is empty after trimming.
pub fn is_blank_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn is_blank_text(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}
