use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use gate_tools::{GateApi, MarketplaceApi};
use log::*;
use recon_engine::{
    events::{EventHandlers, EventHooks},
    IngestionApi,
    IngestionSettings,
    LedgerApi,
    MatchingApi,
    OrderIntakeApi,
    ServiceMonitor,
    SqliteDatabase,
    INGESTION_SERVICE,
    MATCHING_SERVICE,
    TOKEN_VALIDATION_SERVICE,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{gate::GatePayoutFeed, marketplace::MarketplaceOrderFeed},
    routes::{health, service_stats, LocalTransactionRoute, ReconcileRoute},
    workers::{start_ingestion_worker, start_matching_worker, start_token_validation_worker, BackgroundLoop},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
        info!("🚀️ Database migrations are up to date");
    }
    let monitor = ServiceMonitor::new();
    let handlers = EventHandlers::new(128, create_event_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let matcher = MatchingApi::new(db.clone(), config.match_settings.clone(), producers);
    let gate = GateApi::new(config.gate.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let settings = IngestionSettings { user_delay: config.user_delay };
    let ingestion =
        IngestionApi::new(db.clone(), GatePayoutFeed::new(gate), matcher.clone(), monitor.clone(), settings);

    let ingestion_worker = BackgroundLoop::new(INGESTION_SERVICE, config.poll_interval, monitor.clone());
    start_ingestion_worker(&ingestion_worker, Arc::new(ingestion));
    let matching_worker = BackgroundLoop::new(MATCHING_SERVICE, config.match_interval, monitor.clone());
    if config.enable_matching_worker {
        start_matching_worker(&matching_worker, Arc::new(matcher.clone()), monitor.clone(), config.user_delay);
    }

    let token_worker = BackgroundLoop::new(TOKEN_VALIDATION_SERVICE, config.token_interval, monitor.clone());
    if config.enable_token_worker {
        let marketplace = MarketplaceApi::new(config.marketplace.clone())
            .map_err(|e| ServerError::InitializeError(e.to_string()))?;
        let intake =
            OrderIntakeApi::new(db.clone(), MarketplaceOrderFeed::new(marketplace), monitor.clone(), config.user_delay);
        start_token_validation_worker(&token_worker, Arc::new(intake));
    }

    let srv = create_server_instance(config, db.clone(), matcher, monitor)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    ingestion_worker.stop();
    matching_worker.stop();
    token_worker.stop();
    db.close().await;
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    matcher: MatchingApi<SqliteDatabase>,
    monitor: ServiceMonitor,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let ledger_api = LedgerApi::new(db.clone());
        let api_scope = web::scope("/api")
            .service(service_stats)
            .service(ReconcileRoute::<SqliteDatabase>::new())
            .service(LocalTransactionRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("recon::access_log"))
            .app_data(web::Data::new(ledger_api))
            .app_data(web::Data::new(matcher.clone()))
            .app_data(web::Data::new(monitor.clone()))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Subscribers for engine events. New matches are logged; this is where a notifier would hook in.
pub fn create_event_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_match_created(|ev| {
        Box::pin(async move {
            let record = ev.record;
            info!(
                "🔔️ Match #{} for user {}: local transaction #{} and gate transaction #{}, {} min apart",
                record.id, record.user_id, record.local_tx_id, record.gate_tx_id, record.time_difference
            );
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}
