//! In-process store used by the test suite and for running the API without Postgres.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{validation, BlogRecords, EventRecords, StoreError, StoreResult};
use crate::models::{new_record_id, BlogDraft, BlogPatch, BlogPost, Event, EventDraft, EventPatch, RecordId};

#[derive(Default)]
struct Collections {
    // Insertion order; listing sorts a copy.
    events: Vec<Event>,
    blogs: Vec<BlogPost>,
}

impl Collections {
    fn max_event_number(&self) -> i64 {
        self.events.iter().map(|e| e.event_number).max().unwrap_or(0)
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    inner: RwLock<Collections>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRecords for MemoryRecordStore {
    async fn next_event_number(&self) -> StoreResult<i64> {
        Ok(self.inner.read().await.max_event_number() + 1)
    }

    async fn create_event(&self, draft: EventDraft) -> StoreResult<Event> {
        draft.validate().map_err(validation)?;
        // Number is read and consumed under the same write guard.
        let mut inner = self.inner.write().await;
        let number = inner.max_event_number() + 1;
        let event = Event::from_draft(new_record_id(), number, draft, Utc::now());
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let mut events = self.inner.read().await.events.clone();
        events.sort_by(|a, b| {
            a.event_number
                .cmp(&b.event_number)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(events)
    }

    async fn get_event(&self, id: RecordId) -> StoreResult<Event> {
        self.inner
            .read()
            .await
            .events
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_event(&self, id: RecordId, patch: EventPatch) -> StoreResult<Event> {
        let mut inner = self.inner.write().await;
        let event = inner
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound)?;
        // Merge on a copy so a rejected patch leaves the stored record untouched.
        let mut updated = event.clone();
        updated.apply(patch, Utc::now()).map_err(validation)?;
        *event = updated.clone();
        Ok(updated)
    }

    async fn delete_event(&self, id: RecordId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let before = inner.events.len();
        inner.events.retain(|e| e.id != id);
        if inner.events.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl BlogRecords for MemoryRecordStore {
    async fn create_blog(&self, draft: BlogDraft) -> StoreResult<BlogPost> {
        draft.validate().map_err(validation)?;
        let post = BlogPost::from_draft(new_record_id(), draft, Utc::now());
        self.inner.write().await.blogs.push(post.clone());
        Ok(post)
    }

    async fn list_blogs(&self) -> StoreResult<Vec<BlogPost>> {
        // Reverse first so equal timestamps still come out newest-inserted first.
        let mut blogs: Vec<BlogPost> = self.inner.read().await.blogs.iter().rev().cloned().collect();
        blogs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(blogs)
    }

    async fn get_blog(&self, id: RecordId) -> StoreResult<BlogPost> {
        self.inner
            .read()
            .await
            .blogs
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_blog(&self, id: RecordId, patch: BlogPatch) -> StoreResult<BlogPost> {
        let mut inner = self.inner.write().await;
        let post = inner
            .blogs
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound)?;
        let mut updated = post.clone();
        updated.apply(patch, Utc::now()).map_err(validation)?;
        *post = updated.clone();
        Ok(updated)
    }

    async fn delete_blog(&self, id: RecordId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let before = inner.blogs.len();
        inner.blogs.retain(|b| b.id != id);
        if inner.blogs.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
