use actix_web::{http::StatusCode, test::TestRequest};
use recon_engine::{ServiceMonitor, StatsUpdate, INGESTION_SERVICE};
use serde_json::Value;

use super::helpers::{cleanup, send, test_db};

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let (status, body) = send(&db, &ServiceMonitor::new(), TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
    cleanup(db).await;
}

#[actix_web::test]
async fn service_stats() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let monitor = ServiceMonitor::new();
    monitor.initialize(INGESTION_SERVICE);
    monitor.update(INGESTION_SERVICE, StatsUpdate::default().with_processed_users(4).with_running(true));
    let (status, body) = send(&db, &monitor, TestRequest::get().uri("/api/service-stats")).await;
    assert_eq!(status, StatusCode::OK);
    let stats: Value = serde_json::from_str(&body).unwrap();
    let ingestion = &stats[INGESTION_SERVICE];
    assert_eq!(ingestion["processed_users"], 4);
    assert_eq!(ingestion["matched_transactions"], 0);
    assert_eq!(ingestion["is_running"], true);
    assert!(ingestion["last_run_time"].is_null());
    cleanup(db).await;
}
