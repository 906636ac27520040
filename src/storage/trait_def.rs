use crate::analytics::{EventType, NewEvent, RawEvent};
use crate::models::ContentEntity;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("event row {id} has an unreadable timestamp: {occurred_at}")]
    InvalidRow { id: i64, occurred_at: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Other(err.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Initialize the storage (create tables, indexes)
    async fn init(&self) -> Result<()>;

    /// Events with `occurred_at >= from`, newest first, at most `limit` rows.
    /// Each row carries whatever entity metadata is currently joinable.
    async fn fetch_events_since(
        &self,
        from: DateTime<Utc>,
        limit: i64,
    ) -> StorageResult<Vec<RawEvent>>;

    /// Append events of one type, stamped with `occurred_at`
    async fn record_events(
        &self,
        event_type: &EventType,
        events: &[NewEvent],
        occurred_at: DateTime<Utc>,
    ) -> StorageResult<usize>;

    /// Insert or replace a content entity
    async fn upsert_entity(&self, entity: &ContentEntity) -> StorageResult<()>;

    /// Remove a content entity; its events stay behind unjoinable
    async fn delete_entity(&self, id: &str) -> StorageResult<bool>;
}
