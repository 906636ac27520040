use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Content item that events point at
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentEntity {
    pub id: String,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventsRequest {
    pub events: Vec<crate::analytics::NewEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventsResponse {
    pub recorded: usize,
}
