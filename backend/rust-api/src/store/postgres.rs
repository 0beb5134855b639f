use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{postgres::PgRow, FromRow, Postgres, Row, Transaction};

use super::{validation, BlogRecords, EventRecords, StoreError, StoreResult};
use crate::database::DatabasePool;
use crate::models::{new_record_id, BlogDraft, BlogPatch, BlogPost, Event, EventDraft, EventPatch, RecordId};

const EVENT_COUNTER: &str = "events";

/// `TIMESTAMPTZ` keeps microseconds; stamping at that precision keeps returned records equal to
/// what a later read yields.
fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

const EVENT_COLUMNS: &str =
    "id, heading, description, images, date, form_link, qr_link, reverse, event_number, created_at, updated_at";
const BLOG_COLUMNS: &str =
    "id, title, tag, date, read_time, excerpt, image, content, created_at, updated_at";

impl<'r> FromRow<'r, PgRow> for Event {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            heading: row.try_get("heading")?,
            description: row.try_get("description")?,
            images: row.try_get("images")?,
            date: row.try_get("date")?,
            form_link: row.try_get("form_link")?,
            qr_link: row.try_get("qr_link")?,
            reverse: row.try_get("reverse")?,
            event_number: row.try_get("event_number")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for BlogPost {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            tag: row.try_get("tag")?,
            date: row.try_get("date")?,
            read_time: row.try_get("read_time")?,
            excerpt: row.try_get("excerpt")?,
            image: row.try_get::<Option<String>, _>("image")?.unwrap_or_default(),
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Clone)]
pub struct PgRecordStore {
    pool: DatabasePool,
}

impl PgRecordStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Fetch-and-increment for event numbers. The counter row lock serialises creators, so
    /// the maximum read here cannot be raced by another insert before this transaction
    /// commits.
    async fn claim_event_number(tx: &mut Transaction<'_, Postgres>) -> Result<i64, sqlx::Error> {
        sqlx::query("INSERT INTO record_counters (name, value) VALUES ($1, 0) ON CONFLICT (name) DO NOTHING")
            .bind(EVENT_COUNTER)
            .execute(&mut **tx)
            .await?;

        sqlx::query("SELECT value FROM record_counters WHERE name = $1 FOR UPDATE")
            .bind(EVENT_COUNTER)
            .execute(&mut **tx)
            .await?;

        let next = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(event_number), 0) + 1 FROM events")
            .fetch_one(&mut **tx)
            .await?;

        sqlx::query("UPDATE record_counters SET value = $2 WHERE name = $1")
            .bind(EVENT_COUNTER)
            .bind(next)
            .execute(&mut **tx)
            .await?;

        Ok(next)
    }

    async fn write_event(tx: &mut Transaction<'_, Postgres>, event: &Event) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE events
            SET heading = $2, description = $3, images = $4, date = $5, form_link = $6,
                qr_link = $7, reverse = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(event.id)
        .bind(&event.heading)
        .bind(&event.description)
        .bind(&event.images)
        .bind(&event.date)
        .bind(&event.form_link)
        .bind(&event.qr_link)
        .bind(event.reverse)
        .bind(event.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn write_blog(tx: &mut Transaction<'_, Postgres>, post: &BlogPost) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE blogs
            SET title = $2, tag = $3, date = $4, read_time = $5, excerpt = $6, image = $7,
                content = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.tag)
        .bind(&post.date)
        .bind(&post.read_time)
        .bind(&post.excerpt)
        .bind(&post.image)
        .bind(&post.content)
        .bind(post.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl EventRecords for PgRecordStore {
    async fn next_event_number(&self) -> StoreResult<i64> {
        let next = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(event_number), 0) + 1 FROM events")
            .fetch_one(&*self.pool)
            .await?;
        Ok(next)
    }

    async fn create_event(&self, draft: EventDraft) -> StoreResult<Event> {
        draft.validate().map_err(validation)?;

        let mut tx = self.pool.begin().await?;
        let number = Self::claim_event_number(&mut tx).await?;
        let event = Event::from_draft(new_record_id(), number, draft, db_now());

        sqlx::query(
            r#"
            INSERT INTO events
            (id, heading, description, images, date, form_link, qr_link, reverse, event_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(event.id)
        .bind(&event.heading)
        .bind(&event.description)
        .bind(&event.images)
        .bind(&event.date)
        .bind(&event.form_link)
        .bind(&event.qr_link)
        .bind(event.reverse)
        .bind(event.event_number)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!("Created event {} with number {}", event.id, event.event_number);
        Ok(event)
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY event_number ASC, created_at ASC"
        ))
        .fetch_all(&*self.pool)
        .await?;
        Ok(events)
    }

    async fn get_event(&self, id: RecordId) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update_event(&self, id: RecordId, patch: EventPatch) -> StoreResult<Event> {
        let mut tx = self.pool.begin().await?;
        let mut event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        event.apply(patch, db_now()).map_err(validation)?;
        Self::write_event(&mut tx, &event).await?;
        tx.commit().await?;
        Ok(event)
    }

    async fn delete_event(&self, id: RecordId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl BlogRecords for PgRecordStore {
    async fn create_blog(&self, draft: BlogDraft) -> StoreResult<BlogPost> {
        draft.validate().map_err(validation)?;
        let post = BlogPost::from_draft(new_record_id(), draft, db_now());

        sqlx::query(
            r#"
            INSERT INTO blogs
            (id, title, tag, date, read_time, excerpt, image, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.tag)
        .bind(&post.date)
        .bind(&post.read_time)
        .bind(&post.excerpt)
        .bind(&post.image)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&*self.pool)
        .await?;

        Ok(post)
    }

    async fn list_blogs(&self) -> StoreResult<Vec<BlogPost>> {
        let blogs = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs ORDER BY created_at DESC"
        ))
        .fetch_all(&*self.pool)
        .await?;
        Ok(blogs)
    }

    async fn get_blog(&self, id: RecordId) -> StoreResult<BlogPost> {
        sqlx::query_as::<_, BlogPost>(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update_blog(&self, id: RecordId, patch: BlogPatch) -> StoreResult<BlogPost> {
        let mut tx = self.pool.begin().await?;
        let mut post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        post.apply(patch, db_now()).map_err(validation)?;
        Self::write_blog(&mut tx, &post).await?;
        tx.commit().await?;
        Ok(post)
    }

    async fn delete_blog(&self, id: RecordId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
