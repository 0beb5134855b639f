// In-process CmsApi backed by the API's memory store.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nuvacm_admin_core::{ClientError, ClientResult, CmsApi};
use nuvacm_api::handlers::CreateEventRequest;
use nuvacm_api::image_host::{ImageFile, ImageUploader, MockImageHost};
use nuvacm_api::models::{BlogDraft, BlogPatch, BlogPost, Event, EventPatch, RecordId};
use nuvacm_api::services::{AuthGate, Credential};
use nuvacm_api::store::{BlogRecords, EventRecords, MemoryRecordStore, StoreError};

pub struct FakeCmsApi {
    pub store: MemoryRecordStore,
    auth: AuthGate,
    pub calls: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub last_event_request: Mutex<Option<CreateEventRequest>>,
    pub last_event_patch: Mutex<Option<EventPatch>>,
    pub last_blog_patch: Mutex<Option<BlogPatch>>,
    pub logged_out: AtomicBool,
}

impl FakeCmsApi {
    pub fn new() -> Self {
        Self {
            store: MemoryRecordStore::new(),
            auth: AuthGate::new("fake-secret", "admin", "correct-horse"),
            calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
            last_event_request: Mutex::new(None),
            last_event_patch: Mutex::new(None),
            last_blog_patch: Mutex::new(None),
            logged_out: AtomicBool::new(false),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn track(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_write(&self) -> ClientResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Server {
                status: 500,
                message: "Failed to save".to_string(),
            });
        }
        Ok(())
    }
}

fn to_client(err: StoreError) -> ClientError {
    let status = match err {
        StoreError::Validation(_) => 400,
        StoreError::NotFound => 404,
        StoreError::Database(_) => 500,
    };
    ClientError::Server {
        status,
        message: err.to_string(),
    }
}

#[async_trait]
impl CmsApi for FakeCmsApi {
    async fn login(&self, username: &str, password: &str) -> ClientResult<Credential> {
        self.track();
        self.auth.login(username, password).map_err(|e| ClientError::Server {
            status: 401,
            message: e.to_string(),
        })
    }

    async fn logout(&self) -> ClientResult<()> {
        self.track();
        self.logged_out.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn list_events(&self) -> ClientResult<Vec<Event>> {
        self.track();
        self.store.list_events().await.map_err(to_client)
    }

    async fn create_event(&self, request: &CreateEventRequest) -> ClientResult<Event> {
        self.track();
        self.check_write()?;
        *self.last_event_request.lock().unwrap() = Some(request.clone());
        self.store.create_event(request.clone().into_draft()).await.map_err(to_client)
    }

    async fn update_event(&self, id: RecordId, patch: &EventPatch) -> ClientResult<Event> {
        self.track();
        self.check_write()?;
        *self.last_event_patch.lock().unwrap() = Some(patch.clone());
        self.store.update_event(id, patch.clone()).await.map_err(to_client)
    }

    async fn delete_event(&self, id: RecordId) -> ClientResult<()> {
        self.track();
        self.check_write()?;
        self.store.delete_event(id).await.map_err(to_client)
    }

    async fn list_blogs(&self) -> ClientResult<Vec<BlogPost>> {
        self.track();
        self.store.list_blogs().await.map_err(to_client)
    }

    async fn create_blog(&self, draft: &BlogDraft) -> ClientResult<BlogPost> {
        self.track();
        self.check_write()?;
        self.store.create_blog(draft.clone()).await.map_err(to_client)
    }

    async fn update_blog(&self, id: RecordId, patch: &BlogPatch) -> ClientResult<BlogPost> {
        self.track();
        self.check_write()?;
        *self.last_blog_patch.lock().unwrap() = Some(patch.clone());
        self.store.update_blog(id, patch.clone()).await.map_err(to_client)
    }

    async fn delete_blog(&self, id: RecordId) -> ClientResult<()> {
        self.track();
        self.check_write()?;
        self.store.delete_blog(id).await.map_err(to_client)
    }
}

pub fn uploader() -> (ImageUploader, Arc<MockImageHost>) {
    let host = Arc::new(MockImageHost::new());
    (ImageUploader::new(host.clone(), 1024 * 1024), host)
}

pub fn png(name: &str) -> ImageFile {
    ImageFile::new(vec![1, 2, 3, 4], "image/png", Some(name.to_string()))
}
