use chrono::DateTime;
use sqlx::FromRow;

use crate::analytics::{EventType, RawEvent};
use crate::storage::resolve::resolve_metadata_text;
use crate::storage::{StorageError, StorageResult};

/// Event row joined with its entity, as both SQL backends select it
#[derive(Debug, FromRow)]
pub(crate) struct EventRow {
    pub id: i64,
    pub entity_id: String,
    pub event_type: String,
    /// Unix timestamp in milliseconds
    pub occurred_at: i64,
    /// Joined entity rendered as JSON text, or NULL
    pub entity: Option<String>,
}

impl EventRow {
    pub(crate) fn into_raw_event(self) -> StorageResult<RawEvent> {
        let occurred_at =
            DateTime::from_timestamp_millis(self.occurred_at).ok_or(StorageError::InvalidRow {
                id: self.id,
                occurred_at: self.occurred_at,
            })?;

        Ok(RawEvent {
            id: self.id,
            entity: resolve_metadata_text(self.entity.as_deref()),
            entity_id: self.entity_id,
            event_type: EventType::from(self.event_type.as_str()),
            occurred_at,
        })
    }
}
