use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::{AnalyticsError, AnalyticsResult, AnalyticsService, NewEvent};
use crate::config::AnalyticsConfig;
use crate::models::{RecordEventsRequest, RecordEventsResponse};

/// Largest batch accepted by the event endpoints
pub const MAX_EVENT_BATCH: usize = 500;

pub struct AppState {
    pub analytics: Arc<AnalyticsService>,
    pub limits: AnalyticsConfig,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQueryParams {
    /// Trailing window length in days
    pub days: Option<i64>,

    /// Number of entities in the summary ranking
    #[serde(alias = "topN")]
    pub top_n: Option<i64>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn bounded(name: &str, value: Option<i64>, default: i64, max: i64) -> Result<i64, ApiError> {
    let value = value.unwrap_or(default);
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("{name} must be between 1 and {max}"),
        ))
    }
}

fn analytics_error(err: AnalyticsError) -> ApiError {
    match err {
        AnalyticsError::RecordFailed { kind, .. } => {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, kind)
        }
        AnalyticsError::Unavailable(_) | AnalyticsError::Aggregation(_) => api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "analytics temporarily unavailable",
        ),
    }
}

/// Aggregated impressions, views and CTR over the requested window
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AnalyticsQueryParams>, QueryRejection>,
) -> Result<Json<AnalyticsResult>, ApiError> {
    let Query(params) = params.map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid query parameters: {}", e.body_text()),
        )
    })?;

    let limits = &state.limits;
    let days = bounded("days", params.days, limits.default_days, limits.max_days)?;
    let top_n = bounded("top_n", params.top_n, limits.default_top_n, limits.max_top_n)?;

    let result = state
        .analytics
        .report(days, top_n)
        .await
        .map_err(analytics_error)?;

    Ok(Json(result))
}

fn validate_batch(events: &[NewEvent]) -> Result<(), ApiError> {
    if events.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "events cannot be empty",
        ));
    }
    if events.len() > MAX_EVENT_BATCH {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("at most {MAX_EVENT_BATCH} events may be recorded per request"),
        ));
    }
    if events.iter().any(|e| e.entity_id.trim().is_empty()) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "entityId cannot be empty",
        ));
    }
    Ok(())
}

/// Record a batch of impressions
pub async fn record_impressions(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecordEventsRequest>,
) -> Result<(StatusCode, Json<RecordEventsResponse>), ApiError> {
    validate_batch(&payload.events)?;

    let recorded = state
        .analytics
        .record_impressions(&payload.events)
        .await
        .map_err(analytics_error)?;

    Ok((StatusCode::CREATED, Json(RecordEventsResponse { recorded })))
}

/// Record a batch of detail views
pub async fn record_views(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecordEventsRequest>,
) -> Result<(StatusCode, Json<RecordEventsResponse>), ApiError> {
    validate_batch(&payload.events)?;

    let recorded = state
        .analytics
        .record_views(&payload.events)
        .await
        .map_err(analytics_error)?;

    Ok((StatusCode::CREATED, Json(RecordEventsResponse { recorded })))
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
