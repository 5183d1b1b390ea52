use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use log::debug;
use recon_engine::{
    events::EventProducers,
    test_utils::prepare_env::{drop_database, prepare_test_env, random_db_path},
    LedgerApi,
    MatchSettings,
    MatchingApi,
    ServiceMonitor,
    SqliteDatabase,
};

use crate::routes::{health, service_stats, LocalTransactionRoute, ReconcileRoute};

pub async fn test_db() -> SqliteDatabase {
    prepare_test_env(&random_db_path()).await
}

pub async fn cleanup(db: SqliteDatabase) {
    drop_database(db).await;
}

/// Sends `req` to an app wired up the way the server does it, and returns the status and body.
pub async fn send(db: &SqliteDatabase, monitor: &ServiceMonitor, req: TestRequest) -> (StatusCode, String) {
    let matcher = MatchingApi::new(db.clone(), MatchSettings::default(), EventProducers::default());
    let app = App::new()
        .app_data(web::Data::new(LedgerApi::new(db.clone())))
        .app_data(web::Data::new(matcher))
        .app_data(web::Data::new(monitor.clone()))
        .service(health)
        .service(
            web::scope("/api")
                .service(service_stats)
                .service(ReconcileRoute::<SqliteDatabase>::new())
                .service(LocalTransactionRoute::<SqliteDatabase>::new()),
        );
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
