//! Glue between the event store and the aggregation engine

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::analytics::engine::{aggregate, AggregationError};
use crate::analytics::models::{AnalyticsResult, EventType, NewEvent, TimeWindow};
use crate::storage::{EventStore, StorageError};

/// Default cap on rows pulled from the event source per report
pub const DEFAULT_ROW_CAP: i64 = 50_000;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("analytics temporarily unavailable")]
    Unavailable(#[source] StorageError),
    #[error("{kind}")]
    RecordFailed {
        kind: &'static str,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

/// Source of "now" for a report
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct AnalyticsService {
    store: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
    row_cap: i64,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn EventStore>, clock: Arc<dyn Clock>, row_cap: i64) -> Self {
        Self {
            store,
            clock,
            row_cap: row_cap.max(1),
        }
    }

    /// Build the report for the trailing `days` window.
    ///
    /// Nothing is returned if the event source fails.
    pub async fn report(&self, days: i64, top_n: i64) -> Result<AnalyticsResult, AnalyticsError> {
        let now = self.clock.now();
        let window = TimeWindow::resolve(days, now)?;

        let events = self
            .store
            .fetch_events_since(window.from, self.row_cap)
            .await
            .map_err(|e| {
                error!("Failed to fetch analytics events: {}", e);
                AnalyticsError::Unavailable(e)
            })?;

        if events.len() as i64 >= self.row_cap {
            info!(
                "Analytics event fetch reached the row cap of {}; older events in the window may be missing",
                self.row_cap
            );
        }
        debug!("Fetched {} events since {}", events.len(), window.from);

        Ok(aggregate(&events, days, top_n, now)?)
    }

    pub async fn record_impressions(&self, events: &[NewEvent]) -> Result<usize, AnalyticsError> {
        self.record(EventType::Impression, events, "failed to record impressions")
            .await
    }

    pub async fn record_views(&self, events: &[NewEvent]) -> Result<usize, AnalyticsError> {
        self.record(EventType::DetailView, events, "failed to record views")
            .await
    }

    async fn record(
        &self,
        event_type: EventType,
        events: &[NewEvent],
        kind: &'static str,
    ) -> Result<usize, AnalyticsError> {
        let recorded = self
            .store
            .record_events(&event_type, events, self.clock.now())
            .await
            .map_err(|source| {
                error!("{}: {}", kind, source);
                AnalyticsError::RecordFailed { kind, source }
            })?;

        debug!("Recorded {} {} events", recorded, event_type);
        Ok(recorded)
    }
}
