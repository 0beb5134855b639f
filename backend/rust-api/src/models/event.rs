use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{is_blank_text, is_blank_value, Patch, RecordId};

pub const EVENT_REQUIRED_FIELDS: &str = "Heading and Description are required";

/// A stored event. `Heading`/`Description` keep their capitalised wire names because the
/// public site reads them that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: RecordId,
    #[serde(rename = "Heading", alias = "heading")]
    pub heading: String,
    #[serde(rename = "Description", alias = "description")]
    pub description: Value,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_link: Option<String>,
    #[serde(default)]
    pub reverse: bool,
    pub event_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating an event. Images are already hosted URLs at this point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub heading: String,
    pub description: Value,
    pub images: Vec<String>,
    pub date: Option<String>,
    pub form_link: Option<String>,
    pub qr_link: Option<String>,
    pub reverse: bool,
}

impl EventDraft {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.heading.trim().is_empty() || is_blank_value(&self.description) {
            return Err(EVENT_REQUIRED_FIELDS);
        }
        Ok(())
    }
}

/// Mutable event fields. `eventNumber`, `id` and timestamps are not listed and are
/// ignored if a client sends them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(rename = "Heading", alias = "heading", default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(rename = "Description", alias = "description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub images: Patch<Vec<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub date: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub form_link: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub qr_link: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
}

impl Event {
    pub fn from_draft(id: RecordId, event_number: i64, draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            heading: draft.heading,
            description: draft.description,
            images: draft.images,
            date: draft.date,
            form_link: draft.form_link,
            qr_link: draft.qr_link,
            reverse: draft.reverse,
            event_number,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow merge. Required fields may be replaced but not blanked.
    pub fn apply(&mut self, patch: EventPatch, now: DateTime<Utc>) -> Result<(), &'static str> {
        if patch.heading.as_deref().is_some_and(|h| is_blank_text(Some(h)))
            || patch.description.as_ref().is_some_and(is_blank_value)
        {
            return Err(EVENT_REQUIRED_FIELDS);
        }

        if let Some(heading) = patch.heading {
            self.heading = heading;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        patch.images.apply_or_default(&mut self.images);
        patch.date.apply_to(&mut self.date);
        patch.form_link.apply_to(&mut self.form_link);
        patch.qr_link.apply_to(&mut self.qr_link);
        if let Some(reverse) = patch.reverse {
            self.reverse = reverse;
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::new_record_id;
    use chrono::Duration;
    use serde_json::json;

    fn sample() -> Event {
        let draft = EventDraft {
            heading: "Hack Night".to_string(),
            description: json!("Intro to systems"),
            images: vec!["https://i.example/1.png".to_string()],
            date: Some("2026-10-20".to_string()),
            form_link: Some("https://forms.example/x".to_string()),
            ..Default::default()
        };
        Event::from_draft(new_record_id(), 1, draft, Utc::now())
    }

    #[test]
    fn serializes_with_public_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["Heading"], "Hack Night");
        assert_eq!(value["Description"], "Intro to systems");
        assert_eq!(value["formLink"], "https://forms.example/x");
        assert_eq!(value["eventNumber"], 1);
        assert!(value.get("qrLink").is_none());
        assert!(value.get("_id").is_none());
    }

    #[test]
    fn draft_requires_heading_and_description() {
        let mut draft = EventDraft {
            heading: "  ".to_string(),
            description: json!("x"),
            ..Default::default()
        };
        assert_eq!(draft.validate(), Err(EVENT_REQUIRED_FIELDS));
        draft.heading = "ok".to_string();
        draft.description = Value::Null;
        assert_eq!(draft.validate(), Err(EVENT_REQUIRED_FIELDS));
        draft.description = json!({ "blocks": [] });
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn empty_patch_only_touches_updated_at() {
        let original = sample();
        let mut event = original.clone();
        let later = original.updated_at + Duration::seconds(5);
        event.apply(EventPatch::default(), later).unwrap();
        assert_eq!(event.updated_at, later);
        event.updated_at = original.updated_at;
        assert_eq!(event, original);
    }

    #[test]
    fn patch_clears_optional_fields_and_ignores_event_number() {
        let mut event = sample();
        let patch: EventPatch = serde_json::from_value(json!({
            "images": null,
            "formLink": null,
            "qrLink": "https://qr.example/1",
            "eventNumber": 99,
            "reverse": true
        }))
        .unwrap();
        event.apply(patch, Utc::now()).unwrap();
        assert!(event.images.is_empty());
        assert_eq!(event.form_link, None);
        assert_eq!(event.qr_link.as_deref(), Some("https://qr.example/1"));
        assert_eq!(event.event_number, 1);
        assert!(event.reverse);
    }

    #[test]
    fn patch_rejects_blank_heading() {
        let mut event = sample();
        let patch = EventPatch {
            heading: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(event.apply(patch, Utc::now()), Err(EVENT_REQUIRED_FIELDS));
        assert_eq!(event.heading, "Hack Night");
    }
}
