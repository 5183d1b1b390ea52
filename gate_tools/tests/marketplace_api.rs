use gate_tools::{MarketplaceApi, MarketplaceConfig, MARKETPLACE_TRANSACTIONS_PATH, ORDERS_PATH};
use httpmock::prelude::*;
use serde_json::json;

fn api_for(server: &MockServer) -> MarketplaceApi {
    let _ = env_logger::try_init();
    let config =
        MarketplaceConfig::default().with_marketplace_url(server.base_url()).with_orders_url(server.base_url());
    MarketplaceApi::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn live_tokens_are_accepted() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(MARKETPLACE_TRANSACTIONS_PATH).header("authorization", "Bearer tok-1");
            then.status(200).json_body(json!({ "status": "SUCCESS", "data": [] }));
        })
        .await;
    let api = api_for(&server);
    assert!(api.validate_token("tok-1").await);
    mock.assert_async().await;
}

#[tokio::test]
async fn expired_tokens_are_rejected() {
    for code in ["token_expired", "creds_not_provided"] {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(MARKETPLACE_TRANSACTIONS_PATH);
                then.status(401).json_body(json!({ "code": code, "detail": "Token is invalid" }));
            })
            .await;
        let api = api_for(&server);
        let err = api.check_token("tok-old").await.unwrap_err();
        assert!(err.is_auth_error(), "{code} should be an auth error");
        assert!(!api.validate_token("tok-old").await);
    }
}

#[tokio::test]
async fn other_error_codes_do_not_reject_the_token() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(MARKETPLACE_TRANSACTIONS_PATH);
            then.status(429).json_body(json!({ "code": "throttled" }));
        })
        .await;
    let api = api_for(&server);
    assert!(api.validate_token("tok-1").await);
}

#[tokio::test]
async fn unreadable_answers_count_as_invalid() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(MARKETPLACE_TRANSACTIONS_PATH);
            then.status(502).body("<html>Bad gateway</html>");
        })
        .await;
    let api = api_for(&server);
    let err = api.check_token("tok-1").await.unwrap_err();
    assert!(!err.is_auth_error());
    assert!(!api.validate_token("tok-1").await);
}

#[tokio::test]
async fn orders_are_listed_for_the_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(ORDERS_PATH).x_www_form_urlencoded_tuple("token", "tok/1+x");
            then.status(200).json_body(json!([
                {
                    "order_id": 11,
                    "status": "COMPLETED",
                    "volume": { "value": "16.25" },
                    "amount": { "value": "1500,00" },
                    "buyer_id": 5,
                    "payment_method": "SBP",
                    "status_update_time": "2024-03-01T10:00:00Z"
                },
                { "order_id": 12 },
                { "status": "COMPLETED", "status_update_time": "2024-03-01T10:00:00Z" }
            ]));
        })
        .await;
    let api = api_for(&server);
    let orders = api.fetch_order_records("tok/1+x").await.unwrap();
    mock.assert_async().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, "11");
    assert_eq!(orders[0].total_fiat.value(), 1_500_000_000);
    assert_eq!(orders[0].payment_method.as_deref(), Some("SBP"));
}

#[tokio::test]
async fn order_listing_failures_are_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(ORDERS_PATH).x_www_form_urlencoded_tuple("token", "down");
            then.status(500).body("boom");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(ORDERS_PATH).x_www_form_urlencoded_tuple("token", "odd");
            then.status(200).json_body(json!({ "orders": [] }));
        })
        .await;
    let api = api_for(&server);
    assert!(api.fetch_orders("down").await.is_err());
    assert!(api.fetch_orders("odd").await.is_err());
}
