//! Blog screen. A post carries at most one cover image; on edit the image is left alone
//! unless a new file is picked or the current one is marked for removal.

use std::sync::Arc;

use nuvacm_api::image_host::{ImageFile, ImageUploader};
use nuvacm_api::models::{blog::BLOG_REQUIRED_FIELDS, BlogDraft, BlogPatch, BlogPost, Patch, RecordId};
use serde_json::Value;

use crate::api::{ClientError, ClientResult, CmsApi};
use crate::state::{optional_text, text_patch, FormState};
use crate::status::Status;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogForm {
    pub title: String,
    pub tag: String,
    pub date: String,
    pub read_time: String,
    pub excerpt: String,
    pub content: String,
}

impl BlogForm {
    fn from_post(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            tag: post.tag.clone(),
            date: post.date.clone().unwrap_or_default(),
            read_time: post.read_time.clone().unwrap_or_default(),
            excerpt: post.excerpt.clone(),
            content: match &post.content {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            },
        }
    }
}

/// Image part of a blog edit, decided from the upload and the removal mark.
pub fn image_patch(uploaded: Option<String>, marked_for_removal: bool) -> Patch<String> {
    match (uploaded, marked_for_removal) {
        (Some(url), _) => Patch::SetTo(url),
        (None, true) => Patch::Clear,
        (None, false) => Patch::Unchanged,
    }
}

pub struct BlogFormController<A: CmsApi> {
    api: Arc<A>,
    uploader: ImageUploader,
    state: FormState,
    pub form: BlogForm,
    loaded_content: Option<String>,
    current_image: Option<String>,
    image_marked_for_removal: bool,
    pending_image: Option<ImageFile>,
    blogs: Vec<BlogPost>,
    status: Status,
}

impl<A: CmsApi> BlogFormController<A> {
    pub fn new(api: Arc<A>, uploader: ImageUploader) -> Self {
        Self {
            api,
            uploader,
            state: FormState::default(),
            form: BlogForm::default(),
            loaded_content: None,
            current_image: None,
            image_marked_for_removal: false,
            pending_image: None,
            blogs: Vec::new(),
            status: Status::default(),
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn blogs(&self) -> &[BlogPost] {
        &self.blogs
    }

    pub fn current_image(&self) -> Option<&str> {
        self.current_image.as_deref()
    }

    pub fn is_image_marked_for_removal(&self) -> bool {
        self.image_marked_for_removal
    }

    pub fn select_image(&mut self, file: Option<ImageFile>) {
        self.pending_image = file;
    }

    pub fn begin_edit(&mut self, post: &BlogPost) {
        self.state = FormState::editing(post.id);
        self.form = BlogForm::from_post(post);
        self.loaded_content = Some(self.form.content.clone());
        self.current_image = post.has_image().then(|| post.image.clone());
        self.image_marked_for_removal = false;
        self.pending_image = None;
        self.status = Status::info(format!("Editing \"{}\"", post.title));
    }

    pub fn mark_image_for_removal(&mut self) {
        if self.state.is_edit() && self.current_image.is_some() {
            self.image_marked_for_removal = true;
        }
    }

    pub fn unmark_image_removal(&mut self) {
        self.image_marked_for_removal = false;
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.form = BlogForm::default();
        self.loaded_content = None;
        self.current_image = None;
        self.image_marked_for_removal = false;
        self.pending_image = None;
    }

    pub async fn load(&mut self) -> ClientResult<()> {
        self.status = Status::loading("Loading blogs...");
        match self.api.list_blogs().await {
            Ok(blogs) => {
                self.blogs = blogs;
                self.status = Status::success("Blogs loaded successfully");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load blogs: {}", e);
                self.status = Status::error("Failed to load blogs");
                Err(e)
            }
        }
    }

    pub async fn submit(&mut self) -> ClientResult<BlogPost> {
        let title = self.form.title.trim().to_string();
        let excerpt = self.form.excerpt.trim().to_string();
        if title.is_empty() || excerpt.is_empty() {
            self.status = Status::error(BLOG_REQUIRED_FIELDS);
            return Err(ClientError::Validation(BLOG_REQUIRED_FIELDS.to_string()));
        }

        let editing = self.state.edit_target();
        match self.save(editing, title, excerpt).await {
            Ok(post) => {
                let message = if editing.is_some() {
                    "Blog post updated successfully"
                } else {
                    "Blog post saved successfully"
                };
                log::info!("{} ({})", message, post.id);
                self.reset();
                if let Err(e) = self.load().await {
                    log::warn!("Reload after save failed: {}", e);
                }
                self.status = Status::success(message);
                Ok(post)
            }
            Err(e) => {
                self.status = Status::error(format!("Failed to save blog: {}", e));
                Err(e)
            }
        }
    }

    async fn save(&mut self, editing: Option<RecordId>, title: String, excerpt: String) -> ClientResult<BlogPost> {
        let uploaded = match &self.pending_image {
            Some(file) => {
                self.status = Status::loading("Uploading image...");
                Some(self.uploader.upload_one(file).await?)
            }
            None => None,
        };

        self.status = Status::loading("Saving blog post...");
        match editing {
            None => {
                let draft = BlogDraft {
                    title,
                    tag: optional_text(&self.form.tag),
                    date: optional_text(&self.form.date),
                    read_time: optional_text(&self.form.read_time),
                    excerpt,
                    image: uploaded,
                    content: optional_text(&self.form.content).map(Value::String),
                };
                self.api.create_blog(&draft).await
            }
            Some(id) => {
                let content = self.form.content.trim();
                let content = if self.loaded_content.as_deref().map(str::trim) == Some(content) {
                    Patch::Unchanged
                } else {
                    match text_patch(content) {
                        Patch::SetTo(text) => Patch::SetTo(Value::String(text)),
                        Patch::Clear => Patch::Clear,
                        Patch::Unchanged => Patch::Unchanged,
                    }
                };
                let patch = BlogPatch {
                    title: Some(title),
                    tag: optional_text(&self.form.tag),
                    date: text_patch(&self.form.date),
                    read_time: text_patch(&self.form.read_time),
                    excerpt: Some(excerpt),
                    image: image_patch(uploaded, self.image_marked_for_removal),
                    content,
                };
                self.api.update_blog(id, &patch).await
            }
        }
    }

    pub async fn delete(&mut self, id: RecordId) -> ClientResult<()> {
        self.status = Status::loading("Deleting blog post...");
        match self.api.delete_blog(id).await {
            Ok(()) => {
                if self.state.edit_target() == Some(id) {
                    self.reset();
                }
                self.blogs.retain(|b| b.id != id);
                self.status = Status::success("Blog post deleted successfully");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to delete blog {}: {}", id, e);
                self.status = Status::error("Failed to delete blog post");
                Err(e)
            }
        }
    }
}
