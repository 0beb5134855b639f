//! Record persistence for both entity kinds.
//!
//! The HTTP layer only sees [`RecordStore`]; production wires in [`PgRecordStore`] and tests
//! use [`MemoryRecordStore`]. Both implementations honour the same ordering and merge rules,
//! and both assign event numbers atomically on create.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BlogDraft, BlogPatch, BlogPost, Event, EventDraft, EventPatch, RecordId};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EventRecords: Send + Sync {
    /// `max(eventNumber) + 1`, or 1 on an empty collection. A read only; creation does its
    /// own fetch-and-increment and never relies on this value.
    async fn next_event_number(&self) -> StoreResult<i64>;
    async fn create_event(&self, draft: EventDraft) -> StoreResult<Event>;
    /// Ordered by `(eventNumber asc, createdAt asc)`.
    async fn list_events(&self) -> StoreResult<Vec<Event>>;
    async fn get_event(&self, id: RecordId) -> StoreResult<Event>;
    async fn update_event(&self, id: RecordId, patch: EventPatch) -> StoreResult<Event>;
    async fn delete_event(&self, id: RecordId) -> StoreResult<()>;
}

#[async_trait]
pub trait BlogRecords: Send + Sync {
    async fn create_blog(&self, draft: BlogDraft) -> StoreResult<BlogPost>;
    /// Newest `createdAt` first.
    async fn list_blogs(&self) -> StoreResult<Vec<BlogPost>>;
    async fn get_blog(&self, id: RecordId) -> StoreResult<BlogPost>;
    async fn update_blog(&self, id: RecordId, patch: BlogPatch) -> StoreResult<BlogPost>;
    async fn delete_blog(&self, id: RecordId) -> StoreResult<()>;
}

pub trait RecordStore: EventRecords + BlogRecords {}

impl<T> RecordStore for T where T: EventRecords + BlogRecords {}

pub(crate) fn validation(message: &str) -> StoreError {
    StoreError::Validation(message.to_string())
}
