use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::analytics::AnalyticsService;
use crate::config::AnalyticsConfig;

use super::handlers::{get_analytics, health_check, record_impressions, record_views, AppState};

pub fn create_api_router(analytics: Arc<AnalyticsService>, limits: AnalyticsConfig) -> Router {
    let state = Arc::new(AppState { analytics, limits });

    let api_routes = Router::new()
        .route("/analytics", get(get_analytics))
        .route("/events/impressions", post(record_impressions))
        .route("/events/views", post(record_views))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
