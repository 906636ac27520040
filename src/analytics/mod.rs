//! Content interaction analytics
//!
//! Impressions and detail views are aggregated over a trailing window of
//! whole UTC days into per-entity totals, a zero-filled daily trend and a
//! top-N ranking. The aggregation itself lives in [`engine`] and performs no
//! I/O; [`service`] wires it to an [`EventStore`](crate::storage::EventStore).

pub mod engine;
pub mod models;
pub mod service;

pub use engine::{aggregate, ctr, day_start, AggregationError};
pub use models::{
    AnalyticsResult, EntityMetadata, EntityStats, EventType, NewEvent, RawEvent, Summary,
    TimeWindow, TrendPoint, WindowRange,
};
pub use service::{AnalyticsError, AnalyticsService, Clock, FixedClock, SystemClock};
