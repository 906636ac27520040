use crate::analytics::{EventType, NewEvent, RawEvent};
use crate::models::ContentEntity;
use crate::storage::rows::EventRow;
use crate::storage::{EventStore, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS content_entities (
                id TEXT PRIMARY KEY,
                title TEXT,
                slug TEXT,
                published_at TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        // No foreign key: events outlive the entities they point at.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS content_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_id TEXT NOT NULL,
                event_type TEXT NOT NULL,
                actor_id TEXT,
                context TEXT,
                occurred_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_content_events_occurred_at ON content_events(occurred_at)",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn fetch_events_since(
        &self,
        from: DateTime<Utc>,
        limit: i64,
    ) -> StorageResult<Vec<RawEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT e.id, e.entity_id, e.event_type, e.occurred_at,
                   json_object(
                       'id', c.id,
                       'title', c.title,
                       'slug', c.slug,
                       'published_at', c.published_at
                   ) AS entity
            FROM content_events e
            LEFT JOIN content_entities c ON c.id = e.entity_id
            WHERE e.occurred_at >= ?
            ORDER BY e.occurred_at DESC, e.id DESC
            LIMIT ?
            "#,
        )
        .bind(from.timestamp_millis())
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(EventRow::into_raw_event).collect()
    }

    async fn record_events(
        &self,
        event_type: &EventType,
        events: &[NewEvent],
        occurred_at: DateTime<Utc>,
    ) -> StorageResult<usize> {
        let mut tx = self.pool.begin().await?;

        for event in events {
            sqlx::query(
                r#"
                INSERT INTO content_events (entity_id, event_type, actor_id, context, occurred_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&event.entity_id)
            .bind(event_type.as_str())
            .bind(event.actor_id.as_deref())
            .bind(event.context.as_ref().map(|c| c.to_string()))
            .bind(occurred_at.timestamp_millis())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(events.len())
    }

    async fn upsert_entity(&self, entity: &ContentEntity) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO content_entities (id, title, slug, published_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                slug = excluded.slug,
                published_at = excluded.published_at
            "#,
        )
        .bind(&entity.id)
        .bind(entity.title.as_deref())
        .bind(entity.slug.as_deref())
        .bind(entity.published_at.as_deref())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn delete_entity(&self, id: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM content_entities WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
