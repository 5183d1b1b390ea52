use gate_tools::{MarketplaceApi, MarketplaceOrder};
use log::*;
use recon_engine::{
    db_types::{MarketplaceToken, NewLocalTransaction},
    OrderFeed,
    OrderFeedError,
};

/// The live P2P marketplace, as seen by the token validation loop.
#[derive(Clone)]
pub struct MarketplaceOrderFeed {
    api: MarketplaceApi,
}

impl MarketplaceOrderFeed {
    pub fn new(api: MarketplaceApi) -> Self {
        Self { api }
    }
}

impl OrderFeed for MarketplaceOrderFeed {
    async fn validate_token(&self, token: &MarketplaceToken) -> bool {
        trace!("🌐️ Validating marketplace token for user {}", token.user_id);
        self.api.validate_token(token.token.reveal()).await
    }

    async fn fetch_orders(&self, token: &MarketplaceToken) -> Result<Vec<NewLocalTransaction>, OrderFeedError> {
        let orders =
            self.api.fetch_order_records(token.token.reveal()).await.map_err(|e| OrderFeedError(e.to_string()))?;
        debug!("🌐️ User {} has {} marketplace order(s)", token.user_id, orders.len());
        Ok(orders.into_iter().map(|o| new_local_transaction_from_order(token.user_id, o)).collect())
    }
}

pub fn new_local_transaction_from_order(user_id: i64, order: MarketplaceOrder) -> NewLocalTransaction {
    NewLocalTransaction {
        user_id,
        order_id: order.order_id,
        status: order.status,
        amount: order.volume,
        total_fiat: order.total_fiat,
        buyer_name: order.buyer_id,
        method: Some(order.payment_method.unwrap_or_else(|| "unknown".to_string())),
        completed_at: order.completed_at,
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn order_conversion() {
        let order = json!({
            "order_id": 55,
            "status": "COMPLETED",
            "volume": { "value": "16.25" },
            "amount": { "value": "1 500,00" },
            "buyer_id": 90210,
            "status_update_time": "2024-03-01T10:15:00Z"
        });
        let order = MarketplaceOrder::from_json(&order).unwrap();
        let tx = new_local_transaction_from_order(3, order);
        assert_eq!(tx.user_id, 3);
        assert_eq!(tx.order_id, "55");
        assert_eq!(tx.amount.value(), 16_250_000);
        assert_eq!(tx.total_fiat.value(), 1_500_000_000);
        assert_eq!(tx.buyer_name.as_deref(), Some("90210"));
        assert_eq!(tx.method.as_deref(), Some("unknown"));
        assert_eq!(tx.completed_at, Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap());
    }
}
