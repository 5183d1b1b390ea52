//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Each worker thread processes its requests sequentially, so handlers must never block. Database and network access
//! is always awaited.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use recon_engine::{
    db_types::NewLocalTransaction,
    InsertLocalTransactionResult,
    LedgerApi,
    MatchingApi,
    ReconciliationStore,
    ServiceMonitor,
};

use crate::{
    data_objects::{LocalTransactionRequest, ReconcileResult},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Stats  ----------------------------------------------------
/// The statistics of every background loop, keyed by service name.
#[get("/service-stats")]
pub async fn service_stats(monitor: web::Data<ServiceMonitor>) -> impl Responder {
    trace!("💻️ Received service stats request");
    HttpResponse::Ok().json(monitor.snapshot())
}

// ----------------------------------------------   Reconcile  ----------------------------------------------------
route!(reconcile => Post "/reconcile/{user_id}" impl ReconciliationStore);
/// Runs the matcher for one user right away, rather than waiting for the next cycle.
pub async fn reconcile<B: ReconciliationStore>(
    path: web::Path<i64>,
    api: web::Data<MatchingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    debug!("💻️ POST reconcile for user {user_id}");
    let matched = api.reconcile(user_id).await?;
    Ok(HttpResponse::Ok().json(ReconcileResult { user_id, matched }))
}

// ----------------------------------------------   Local transactions  ------------------------------------------------
route!(local_transaction => Post "/local_transactions" impl ReconciliationStore);
/// Records a completed marketplace transaction. Responds with 201 the first time an order is seen, and with 200 and
/// the stored copy for every repeat.
pub async fn local_transaction<B: ReconciliationStore>(
    body: web::Json<LocalTransactionRequest>,
    api: web::Data<LedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST local transaction [{}] for user {}", request.order_id, request.user_id);
    let transaction = NewLocalTransaction::try_from(request)?;
    let response = match api.record_local_transaction(transaction).await? {
        InsertLocalTransactionResult::Inserted(tx) => HttpResponse::Created().json(tx),
        InsertLocalTransactionResult::AlreadyExists(tx) => HttpResponse::Ok().json(tx),
    };
    Ok(response)
}
