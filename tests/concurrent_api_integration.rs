//! Concurrent API integration tests
//!
//! Event writes arriving in parallel must all be counted, and reports taken
//! while writes are in flight must stay internally consistent.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use beacon::analytics::{AnalyticsService, FixedClock};
use beacon::api::create_api_router;
use beacon::config::AnalyticsConfig;
use beacon::models::ContentEntity;
use beacon::storage::{EventStore, SqliteStore};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create test storage
async fn create_test_store() -> Arc<dyn EventStore> {
    let store = SqliteStore::new("sqlite::memory:", 1).await.unwrap();
    store.init().await.unwrap();
    Arc::new(store)
}

#[tokio::test]
async fn test_concurrent_event_recording() {
    let store = create_test_store().await;
    for id in ["p1", "p2", "p3"] {
        store
            .upsert_entity(&ContentEntity {
                id: id.to_string(),
                title: None,
                slug: None,
                published_at: None,
            })
            .await
            .unwrap();
    }

    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap());
    let service = Arc::new(AnalyticsService::new(store, Arc::new(clock), 50_000));
    let app = create_api_router(service, AnalyticsConfig::default());

    let mut handles = vec![];
    for i in 0..30 {
        let app_clone = app.clone();
        let handle = tokio::spawn(async move {
            let (path, entity) = if i % 3 == 0 {
                ("/api/events/views", format!("p{}", i % 2 + 1))
            } else {
                ("/api/events/impressions", format!("p{}", i % 3 + 1))
            };
            let request = Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(format!(r#"{{"events": [{{"entityId": "{entity}"}}]}}"#)))
                .unwrap();

            app_clone.oneshot(request).await.unwrap()
        });
        handles.push((i, handle));
    }

    for (i, handle) in handles {
        let response = handle
            .await
            .unwrap_or_else(|e| panic!("Request {} failed: {:?}", i, e));
        assert_eq!(response.status(), StatusCode::CREATED, "request {i}");
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/analytics?days=1&top_n=3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["summary"]["totalImpressions"], 20);
    assert_eq!(json["summary"]["totalViews"], 10);

    let entities = json["entities"].as_array().unwrap();
    let impressions: u64 = entities
        .iter()
        .map(|e| e["impressions"].as_u64().unwrap())
        .sum();
    let views: u64 = entities.iter().map(|e| e["views"].as_u64().unwrap()).sum();
    assert_eq!(impressions, 20);
    assert_eq!(views, 10);
}

#[tokio::test]
async fn test_concurrent_reports_agree() {
    let store = create_test_store().await;
    store
        .upsert_entity(&ContentEntity {
            id: "p1".to_string(),
            title: Some("Only".to_string()),
            slug: None,
            published_at: None,
        })
        .await
        .unwrap();

    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap());
    let service = Arc::new(AnalyticsService::new(store, Arc::new(clock), 50_000));
    service
        .record_impressions(&[beacon::analytics::NewEvent {
            entity_id: "p1".to_string(),
            actor_id: None,
            context: None,
        }])
        .await
        .unwrap();

    let mut handles = vec![];
    for _ in 0..8 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            serde_json::to_string(&service.report(7, 5).await.unwrap()).unwrap()
        }));
    }

    let mut bodies = vec![];
    for handle in handles {
        bodies.push(handle.await.unwrap());
    }
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}
