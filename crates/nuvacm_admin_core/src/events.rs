//! Event screen: list, create with image uploads, edit with per-image removal, delete.

use std::collections::BTreeSet;
use std::sync::Arc;

use nuvacm_api::handlers::CreateEventRequest;
use nuvacm_api::image_host::{ImageFile, ImageUploader};
use nuvacm_api::models::{event::EVENT_REQUIRED_FIELDS, Event, EventPatch, Patch, RecordId};
use serde_json::Value;

use crate::api::{ClientError, ClientResult, CmsApi};
use crate::state::{optional_text, text_patch, FormState};
use crate::status::Status;

/// Text inputs of the event form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub heading: String,
    pub description: String,
    pub date: String,
    pub form_link: String,
    pub qr_link: String,
    pub reverse: bool,
}

impl EventForm {
    fn from_event(event: &Event) -> Self {
        Self {
            heading: event.heading.clone(),
            description: description_text(&event.description),
            date: event.date.clone().unwrap_or_default(),
            form_link: event.form_link.clone().unwrap_or_default(),
            qr_link: event.qr_link.clone().unwrap_or_default(),
            reverse: event.reverse,
        }
    }
}

fn description_text(description: &Value) -> String {
    match description {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub struct EventFormController<A: CmsApi> {
    api: Arc<A>,
    uploader: ImageUploader,
    state: FormState,
    pub form: EventForm,
    /// Description text as loaded by `begin_edit`; an untouched description is not resent.
    loaded_description: Option<String>,
    existing_images: Vec<String>,
    marked_for_removal: BTreeSet<usize>,
    pending_files: Vec<ImageFile>,
    events: Vec<Event>,
    status: Status,
}

impl<A: CmsApi> EventFormController<A> {
    pub fn new(api: Arc<A>, uploader: ImageUploader) -> Self {
        Self {
            api,
            uploader,
            state: FormState::default(),
            form: EventForm::default(),
            loaded_description: None,
            existing_images: Vec::new(),
            marked_for_removal: BTreeSet::new(),
            pending_files: Vec::new(),
            events: Vec::new(),
            status: Status::default(),
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn existing_images(&self) -> &[String] {
        &self.existing_images
    }

    pub fn is_marked_for_removal(&self, index: usize) -> bool {
        self.marked_for_removal.contains(&index)
    }

    /// Replaces the file selection.
    pub fn select_files(&mut self, files: Vec<ImageFile>) {
        self.pending_files = files;
    }

    pub fn begin_edit(&mut self, event: &Event) {
        self.state = FormState::editing(event.id);
        self.form = EventForm::from_event(event);
        self.loaded_description = Some(self.form.description.clone());
        self.existing_images = event.images.clone();
        self.marked_for_removal.clear();
        self.pending_files.clear();
        self.status = Status::info(format!("Editing \"{}\"", event.heading));
    }

    /// Toggles the removal mark on an existing image. Returns whether it is now marked.
    pub fn toggle_image_removal(&mut self, index: usize) -> bool {
        if !self.state.is_edit() || index >= self.existing_images.len() {
            return false;
        }
        if self.marked_for_removal.remove(&index) {
            false
        } else {
            self.marked_for_removal.insert(index);
            true
        }
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.form = EventForm::default();
        self.loaded_description = None;
        self.existing_images.clear();
        self.marked_for_removal.clear();
        self.pending_files.clear();
    }

    /// Images kept from the record being edited, in their stored order.
    fn kept_images(&self) -> Vec<String> {
        self.existing_images
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.marked_for_removal.contains(i))
            .map(|(_, url)| url.clone())
            .collect()
    }

    pub async fn load(&mut self) -> ClientResult<()> {
        self.status = Status::loading("Loading events...");
        match self.api.list_events().await {
            Ok(events) => {
                self.events = events;
                self.status = Status::success("Events loaded successfully");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load events: {}", e);
                self.status = Status::error("Failed to load events");
                Err(e)
            }
        }
    }

    pub async fn submit(&mut self) -> ClientResult<Event> {
        let heading = self.form.heading.trim().to_string();
        let description = self.form.description.trim().to_string();
        if heading.is_empty() || description.is_empty() {
            self.status = Status::error(EVENT_REQUIRED_FIELDS);
            return Err(ClientError::Validation(EVENT_REQUIRED_FIELDS.to_string()));
        }

        let editing = self.state.edit_target();
        match self.save(editing, heading, description).await {
            Ok(event) => {
                let message = if editing.is_some() {
                    "Event updated successfully"
                } else {
                    "Event saved successfully"
                };
                log::info!("{} ({})", message, event.id);
                self.reset();
                if let Err(e) = self.load().await {
                    log::warn!("Reload after save failed: {}", e);
                }
                self.status = Status::success(message);
                Ok(event)
            }
            Err(e) => {
                self.status = Status::error(format!("Failed to save event: {}", e));
                Err(e)
            }
        }
    }

    async fn save(&mut self, editing: Option<RecordId>, heading: String, description: String) -> ClientResult<Event> {
        let uploaded = if self.pending_files.is_empty() {
            Vec::new()
        } else {
            self.status = Status::loading("Uploading images...");
            self.uploader.upload_all(&self.pending_files, &heading).await?
        };

        self.status = Status::loading("Saving event...");
        match editing {
            None => {
                let request = CreateEventRequest {
                    heading: Some(heading),
                    description: Value::String(description),
                    date: optional_text(&self.form.date),
                    form_link: optional_text(&self.form.form_link),
                    qr_link: optional_text(&self.form.qr_link),
                    reverse: self.form.reverse,
                    image_urls: uploaded,
                };
                self.api.create_event(&request).await
            }
            Some(id) => {
                let mut images = self.kept_images();
                images.extend(uploaded);
                let description_changed = self.loaded_description.as_deref().map(str::trim) != Some(description.as_str());
                let patch = EventPatch {
                    heading: Some(heading),
                    description: description_changed.then_some(Value::String(description)),
                    images: Patch::SetTo(images),
                    date: text_patch(&self.form.date),
                    form_link: text_patch(&self.form.form_link),
                    qr_link: text_patch(&self.form.qr_link),
                    reverse: Some(self.form.reverse),
                };
                self.api.update_event(id, &patch).await
            }
        }
    }

    pub async fn delete(&mut self, id: RecordId) -> ClientResult<()> {
        self.status = Status::loading("Deleting event...");
        match self.api.delete_event(id).await {
            Ok(()) => {
                if self.state.edit_target() == Some(id) {
                    self.reset();
                }
                self.events.retain(|e| e.id != id);
                self.status = Status::success("Event deleted successfully");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to delete event {}: {}", id, e);
                self.status = Status::error("Failed to delete event");
                Err(e)
            }
        }
    }
}
