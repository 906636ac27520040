//! Windowed aggregation of impression and detail-view events
//!
//! `aggregate` is a pure function of its inputs: the caller injects `now`,
//! and all accumulator state lives and dies inside a single call. The event
//! source is trusted to return only rows inside the window; rows that fall
//! on earlier days still count and get their own trend bucket.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

use crate::analytics::models::{
    AnalyticsResult, EntityMetadata, EntityStats, EventType, RawEvent, Summary, TimeWindow,
    TrendPoint,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("a window of {days} days cannot be represented")]
    WindowOutOfRange { days: i64 },
}

/// Click-through rate with the zero-impression guard
pub fn ctr(views: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        0.0
    } else {
        views as f64 / impressions as f64
    }
}

/// Truncate an instant to 00:00:00.000 UTC of the same day
pub fn day_start(instant: DateTime<Utc>) -> DateTime<Utc> {
    midnight(instant.date_naive())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl TimeWindow {
    /// Resolve the trailing window ending at `now`. `days` is clamped to at least 1.
    pub fn resolve(days: i64, now: DateTime<Utc>) -> Result<Self, AggregationError> {
        let clamped = days.max(1);
        let days_u32 =
            u32::try_from(clamped).map_err(|_| AggregationError::WindowOutOfRange { days })?;

        let first_day = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(days_u32) - 1))
            .ok_or(AggregationError::WindowOutOfRange { days })?;

        Ok(Self {
            from: midnight(first_day),
            to: now,
            days: days_u32,
        })
    }

    fn first_day(&self) -> NaiveDate {
        self.from.date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    impressions: u64,
    views: u64,
}

impl Counts {
    fn bump(&mut self, kind: Interaction) {
        match kind {
            Interaction::Impression => self.impressions += 1,
            Interaction::View => self.views += 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Interaction {
    Impression,
    View,
}

impl Interaction {
    fn of(event_type: &EventType) -> Option<Self> {
        match event_type {
            EventType::Impression => Some(Interaction::Impression),
            EventType::DetailView => Some(Interaction::View),
            EventType::Unrecognized(_) => None,
        }
    }
}

struct EntityAccumulator<'a> {
    metadata: &'a EntityMetadata,
    counts: Counts,
}

/// Aggregate `events` over the `days`-day window ending at `now`.
///
/// `days` and `top_n` are clamped to at least 1. Events whose entity cannot be
/// resolved contribute nothing. Events of unrecognized type create their
/// entity and day bucket but add no counts.
pub fn aggregate(
    events: &[RawEvent],
    days: i64,
    top_n: i64,
    now: DateTime<Utc>,
) -> Result<AnalyticsResult, AggregationError> {
    let window = TimeWindow::resolve(days, now)?;
    let top_n = usize::try_from(top_n.max(1)).unwrap_or(usize::MAX);

    // Every day in the window gets a bucket before any event is looked at.
    let mut buckets: BTreeMap<DateTime<Utc>, Counts> = BTreeMap::new();
    let mut day = window.first_day();
    for _ in 0..window.days {
        buckets.insert(midnight(day), Counts::default());
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    // Entities are kept in first-seen order so equal-ranked entries sort the
    // same way on every run with the same input.
    let mut entities: Vec<EntityAccumulator<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals = Counts::default();
    let mut unresolved = 0usize;
    let mut unrecognized = 0usize;

    for event in events {
        let Some(metadata) = event.entity.as_ref().filter(|m| !m.id.is_empty()) else {
            unresolved += 1;
            continue;
        };
        let slot = *index.entry(metadata.id.as_str()).or_insert_with(|| {
            entities.push(EntityAccumulator {
                metadata,
                counts: Counts::default(),
            });
            entities.len() - 1
        });
        let bucket = buckets.entry(day_start(event.occurred_at)).or_default();

        // Unrecognized types still create their entity and bucket, but count nothing.
        let Some(kind) = Interaction::of(&event.event_type) else {
            unrecognized += 1;
            continue;
        };
        bucket.bump(kind);
        entities[slot].counts.bump(kind);
        totals.bump(kind);
    }

    let mut ranked: Vec<EntityStats> = entities
        .into_iter()
        .map(|acc| EntityStats {
            entity_id: acc.metadata.id.clone(),
            title: acc.metadata.title.clone(),
            slug: acc.metadata.slug.clone(),
            published_at: acc.metadata.published_at.clone(),
            impressions: acc.counts.impressions,
            views: acc.counts.views,
            ctr: ctr(acc.counts.views, acc.counts.impressions),
        })
        .collect();
    ranked.sort_by(rank);

    let top_entities = ranked.iter().take(top_n).cloned().collect();

    let trend = buckets
        .into_iter()
        .map(|(date, counts)| TrendPoint {
            date,
            impressions: counts.impressions,
            views: counts.views,
            ctr: ctr(counts.views, counts.impressions),
        })
        .collect::<Vec<_>>();

    debug!(
        "Aggregated {} events into {} entities and {} day buckets ({} unresolved, {} unrecognized)",
        events.len(),
        ranked.len(),
        trend.len(),
        unresolved,
        unrecognized
    );

    Ok(AnalyticsResult {
        summary: Summary {
            total_impressions: totals.impressions,
            total_views: totals.views,
            overall_ctr: ctr(totals.views, totals.impressions),
            top_entities,
        },
        trend,
        entities: ranked,
        generated_at: now,
        range: window.into(),
    })
}

/// Views desc, then impressions desc, then newest `published_at` first.
/// A missing `published_at` compares as the empty string.
pub fn rank(a: &EntityStats, b: &EntityStats) -> Ordering {
    b.views
        .cmp(&a.views)
        .then_with(|| b.impressions.cmp(&a.impressions))
        .then_with(|| {
            let a_published = a.published_at.as_deref().unwrap_or("");
            let b_published = b.published_at.as_deref().unwrap_or("");
            b_published.cmp(a_published)
        })
}
