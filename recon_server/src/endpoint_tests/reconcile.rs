use actix_web::{http::StatusCode, test::TestRequest};
use chrono::{Duration, TimeZone, Utc};
use recon_engine::{
    db_types::{MicroUnits, NewGateTransaction, NewLocalTransaction},
    GateLedger,
    ReconciliationStore,
    ServiceMonitor,
};
use serde_json::{json, Value};

use super::helpers::{cleanup, send, test_db};

#[actix_web::test]
async fn reconcile_on_demand() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let t = Utc.timestamp_opt(Utc::now().timestamp() - 3600, 0).unwrap();
    let amount = MicroUnits::from_units(2_000);
    db.insert_local_transaction(NewLocalTransaction::new(8, "P2P-8", amount, t)).await.unwrap();
    let gate = NewGateTransaction::new("G-8", amount, 7).with_approved_at(t + Duration::minutes(4));
    let gate = db.upsert_gate_transaction(gate).await.unwrap().into_transaction();
    db.claim_gate_transaction(8, gate.id).await.unwrap();

    let req = || TestRequest::post().uri("/api/reconcile/8");
    let (status, body) = send(&db, &ServiceMonitor::new(), req()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "user_id": 8, "matched": 1 }));
    let record = db.fetch_match_for_gate_transaction(gate.id).await.unwrap().unwrap();
    assert_eq!(record.time_difference, 4);

    let (status, body) = send(&db, &ServiceMonitor::new(), req()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "user_id": 8, "matched": 0 }));
    cleanup(db).await;
}

#[actix_web::test]
async fn user_ids_must_be_numbers() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let (status, _) = send(&db, &ServiceMonitor::new(), TestRequest::post().uri("/api/reconcile/alice")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    cleanup(db).await;
}
