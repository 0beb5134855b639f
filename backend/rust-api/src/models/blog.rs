use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{is_blank_text, Patch, RecordId};

pub const DEFAULT_BLOG_TAG: &str = "Blog";
pub const BLOG_REQUIRED_FIELDS: &str = "Title and excerpt are required";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: RecordId,
    pub title: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    pub excerpt: String,
    /// Empty string means "no image".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDraft {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl BlogDraft {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() || self.excerpt.trim().is_empty() {
            return Err(BLOG_REQUIRED_FIELDS);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub date: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub read_time: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub image: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub content: Patch<Value>,
}

fn tag_or_default(tag: Option<String>) -> String {
    tag.filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BLOG_TAG.to_string())
}

impl BlogPost {
    pub fn from_draft(id: RecordId, draft: BlogDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            tag: tag_or_default(draft.tag),
            date: draft.date,
            read_time: draft.read_time,
            excerpt: draft.excerpt,
            image: draft.image.unwrap_or_default(),
            content: draft.content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }

    pub fn apply(&mut self, patch: BlogPatch, now: DateTime<Utc>) -> Result<(), &'static str> {
        if patch.title.as_deref().is_some_and(|t| is_blank_text(Some(t)))
            || patch.excerpt.as_deref().is_some_and(|e| is_blank_text(Some(e)))
        {
            return Err(BLOG_REQUIRED_FIELDS);
        }

        if let Some(title) = patch.title {
            self.title = title;
        }
        if patch.tag.is_some() {
            self.tag = tag_or_default(patch.tag);
        }
        patch.date.apply_to(&mut self.date);
        patch.read_time.apply_to(&mut self.read_time);
        if let Some(excerpt) = patch.excerpt {
            self.excerpt = excerpt;
        }
        patch.image.apply_or_default(&mut self.image);
        patch.content.apply_to(&mut self.content);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::new_record_id;
    use serde_json::json;

    fn draft() -> BlogDraft {
        serde_json::from_value(json!({
            "title": "Why Rust",
            "excerpt": "Short take",
            "readTime": "4 min"
        }))
        .unwrap()
    }

    #[test]
    fn draft_defaults_tag_and_blank_image() {
        let post = BlogPost::from_draft(new_record_id(), draft(), Utc::now());
        assert_eq!(post.tag, DEFAULT_BLOG_TAG);
        assert_eq!(post.image, "");
        assert!(!post.has_image());
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["readTime"], "4 min");
        assert_eq!(value["image"], "");
    }

    #[test]
    fn draft_without_excerpt_is_rejected() {
        let draft: BlogDraft = serde_json::from_value(json!({ "title": "Only title" })).unwrap();
        assert_eq!(draft.validate(), Err(BLOG_REQUIRED_FIELDS));
        let draft: BlogDraft = serde_json::from_value(json!({ "title": "t", "excerpt": null })).unwrap();
        assert_eq!(draft.validate(), Err(BLOG_REQUIRED_FIELDS));
    }

    #[test]
    fn image_patch_states() {
        let mut post = BlogPost::from_draft(new_record_id(), draft(), Utc::now());
        post.image = "https://i.example/cover.png".to_string();

        post.apply(BlogPatch::default(), Utc::now()).unwrap();
        assert_eq!(post.image, "https://i.example/cover.png");

        let clear: BlogPatch = serde_json::from_value(json!({ "image": null })).unwrap();
        post.apply(clear, Utc::now()).unwrap();
        assert!(!post.has_image());
    }

    #[test]
    fn blank_tag_patch_falls_back_to_default() {
        let mut post = BlogPost::from_draft(new_record_id(), draft(), Utc::now());
        let retag: BlogPatch = serde_json::from_value(json!({ "tag": "Release" })).unwrap();
        post.apply(retag, Utc::now()).unwrap();
        assert_eq!(post.tag, "Release");

        let blank: BlogPatch = serde_json::from_value(json!({ "tag": "  " })).unwrap();
        post.apply(blank, Utc::now()).unwrap();
        assert_eq!(post.tag, DEFAULT_BLOG_TAG);
    }

    #[test]
    fn stored_null_image_reads_as_empty() {
        let value = json!({
            "id": new_record_id(),
            "title": "t",
            "tag": "Blog",
            "excerpt": "e",
            "image": null,
            "createdAt": "2026-10-01T10:00:00Z",
            "updatedAt": "2026-10-01T10:00:00Z"
        });
        let post: BlogPost = serde_json::from_value(value).unwrap();
        assert_eq!(post.image, "");
    }
}
