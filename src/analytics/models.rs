//! Data models for content analytics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of interaction recorded for a content item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    /// The item was displayed to a viewer
    Impression,
    /// The item was opened
    DetailView,
    /// Anything else the store hands back; ignored by aggregation
    Unrecognized(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Impression => "impression",
            EventType::DetailView => "detail_view",
            EventType::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        match value {
            "impression" => EventType::Impression,
            "detail_view" => EventType::DetailView,
            other => EventType::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a content entity joined onto an event at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    pub id: String,
    pub title: Option<String>,
    pub slug: Option<String>,
    /// Publish timestamp as stored; compared as a plain string when ranking
    pub published_at: Option<String>,
}

/// A single interaction event as returned by the event source
#[derive(Debug, Clone)]
pub struct RawEvent {
    /// Store identifier, kept for traceability only
    pub id: i64,

    /// Entity id as written on the event row
    pub entity_id: String,

    pub event_type: EventType,

    pub occurred_at: DateTime<Utc>,

    /// Joined entity; `None` when the entity was deleted or never existed
    pub entity: Option<EntityMetadata>,
}

/// Event to append through the event sink
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub entity_id: String,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

/// Trailing window an aggregation covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// UTC midnight of the first day in the window
    pub from: DateTime<Utc>,
    /// Exact instant the aggregation ran
    pub to: DateTime<Utc>,
    pub days: u32,
}

/// Per-entity totals, ranked
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStats {
    pub entity_id: String,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub published_at: Option<String>,
    pub impressions: u64,
    pub views: u64,
    pub ctr: f64,
}

/// One day of the trend series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// UTC midnight of the day
    pub date: DateTime<Utc>,
    pub impressions: u64,
    pub views: u64,
    pub ctr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_impressions: u64,
    pub total_views: u64,
    pub overall_ctr: f64,
    pub top_entities: Vec<EntityStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub days: u32,
}

impl From<TimeWindow> for WindowRange {
    fn from(window: TimeWindow) -> Self {
        Self {
            from: window.from,
            to: window.to,
            days: window.days,
        }
    }
}

/// Output of one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub summary: Summary,
    pub trend: Vec<TrendPoint>,
    pub entities: Vec<EntityStats>,
    pub generated_at: DateTime<Utc>,
    pub range: WindowRange,
}
