use actix_web::{http::StatusCode, test::TestRequest};
use recon_engine::{ReconciliationStore, ServiceMonitor};
use serde_json::{json, Value};

use super::helpers::{cleanup, send, test_db};

fn post(body: Value) -> TestRequest {
    TestRequest::post().uri("/api/local_transactions").set_json(body)
}

#[actix_web::test]
async fn record_a_local_transaction() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let monitor = ServiceMonitor::new();
    let body = json!({
        "user_id": 5,
        "order_id": "P2P-1001",
        "status": "completed",
        "total_fiat": "1 500,00",
        "amount": 16.25,
        "completed_at": "2024-03-01T10:00:00Z"
    });
    let (status, response) = send(&db, &monitor, post(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let tx: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(tx["order_id"], "P2P-1001");
    assert_eq!(tx["processed"], false);

    // A repeat is acknowledged with the stored copy
    let (status, repeat) = send(&db, &monitor, post(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repeat, response);

    let stored = db.fetch_local_transaction(tx["id"].as_i64().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.total_fiat.value(), 1_500_000_000);
    assert_eq!(stored.amount.value(), 16_250_000);
    cleanup(db).await;
}

#[actix_web::test]
async fn bad_amounts_are_rejected() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let body = json!({
        "user_id": 5,
        "order_id": "P2P-1002",
        "total_fiat": "fifteen hundred",
        "completed_at": "2024-03-01T10:00:00Z"
    });
    let (status, response) = send(&db, &ServiceMonitor::new(), post(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.contains("Invalid amount"), "{response}");
    assert!(db.fetch_users_with_pending_local_transactions().await.unwrap().is_empty());
    cleanup(db).await;
}

#[actix_web::test]
async fn order_ids_are_required() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let body = json!({
        "user_id": 5,
        "order_id": "  ",
        "total_fiat": 100,
        "completed_at": "2024-03-01T10:00:00Z"
    });
    let (status, _) = send(&db, &ServiceMonitor::new(), post(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    cleanup(db).await;
}
