use chrono::{DateTime, Utc};
use recon_common::MicroUnits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    helpers::{json_amount, json_f64, json_i64, json_string, json_timestamp},
    GateApiError,
};

/// Key of the fiat (RUB) entry in the gate's per-currency amount maps.
pub const FIAT_CURRENCY_CODE: &str = "643";
/// Key of the stablecoin (USDT) entry in the gate's per-currency amount maps.
pub const STABLE_CURRENCY_CODE: &str = "000001";

/// A single payout from the gate listing, flattened into the fields we keep.
///
/// The listing is loosely typed and fields come and go, so [`PayoutRecord::from_json`] is total: apart from the
/// transaction id, anything missing or malformed is left at its default rather than rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub transaction_id: String,
    pub payment_method_id: Option<i64>,
    pub wallet: Option<String>,
    pub amount_fiat: MicroUnits,
    pub amount_stable: MicroUnits,
    pub total_fiat: MicroUnits,
    pub total_stable: MicroUnits,
    pub status: i64,
    pub bank_name: Option<String>,
    pub bank_code: Option<String>,
    pub bank_label: Option<String>,
    pub payment_method: Option<String>,
    pub course: Option<f64>,
    pub success_count: Option<i64>,
    pub success_rate: Option<f64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub trader_id: Option<i64>,
    pub trader_name: Option<String>,
    pub attachments: Option<Value>,
}

impl PayoutRecord {
    pub fn from_json(payout: &Value) -> Result<Self, GateApiError> {
        let transaction_id = json_string(&payout["id"])
            .ok_or_else(|| GateApiError::MalformedResponse(format!("Payout without an id: {payout}")))?;
        let amount = &payout["amount"]["trader"];
        let total = &payout["total"]["trader"];
        let attachments = match &payout["attachments"] {
            Value::Null => None,
            v => Some(v.clone()),
        };
        Ok(Self {
            transaction_id,
            payment_method_id: json_i64(&payout["payment_method_id"]),
            wallet: json_string(&payout["wallet"]),
            amount_fiat: json_amount(&amount[FIAT_CURRENCY_CODE]),
            amount_stable: json_amount(&amount[STABLE_CURRENCY_CODE]),
            total_fiat: json_amount(&total[FIAT_CURRENCY_CODE]),
            total_stable: json_amount(&total[STABLE_CURRENCY_CODE]),
            status: json_i64(&payout["status"]).unwrap_or_default(),
            bank_name: json_string(&payout["bank"]["name"]),
            bank_code: json_string(&payout["bank"]["code"]),
            bank_label: json_string(&payout["bank"]["label"]),
            payment_method: json_string(&payout["method"]["label"]),
            course: json_f64(&payout["meta"]["courses"]["trader"]),
            success_count: json_i64(&payout["tooltip"]["payments"]["success"]),
            success_rate: json_f64(&payout["tooltip"]["payments"]["percent"]),
            approved_at: json_timestamp(&payout["approved_at"]),
            expired_at: json_timestamp(&payout["expired_at"]),
            created_at: json_timestamp(&payout["created_at"]),
            updated_at: json_timestamp(&payout["updated_at"]),
            trader_id: json_i64(&payout["trader"]["id"]),
            trader_name: json_string(&payout["trader"]["name"]),
            attachments,
        })
    }

    /// True once the gate has confirmed the payout. Only approved payouts are eligible for reconciliation.
    pub fn is_approved(&self) -> bool {
        self.approved_at.is_some()
    }
}

/// A completed P2P order as listed by the order export service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceOrder {
    pub order_id: String,
    pub status: Option<String>,
    /// The crypto volume of the order.
    pub volume: MicroUnits,
    /// The fiat total paid by the buyer.
    pub total_fiat: MicroUnits,
    pub buyer_id: Option<String>,
    pub payment_method: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl MarketplaceOrder {
    /// Orders need an id and a completion time. Amounts default to zero.
    pub fn from_json(order: &Value) -> Result<Self, GateApiError> {
        let order_id = json_string(&order["order_id"])
            .ok_or_else(|| GateApiError::MalformedResponse(format!("Order without an id: {order}")))?;
        let completed_at = json_timestamp(&order["status_update_time"]).ok_or_else(|| {
            GateApiError::MalformedResponse(format!("Order {order_id} has no valid status_update_time"))
        })?;
        Ok(Self {
            order_id,
            status: json_string(&order["status"]),
            volume: json_amount(&order["volume"]["value"]),
            total_fiat: json_amount(&order["amount"]["value"]),
            buyer_id: json_string(&order["buyer_id"]),
            payment_method: json_string(&order["payment_method"]),
            completed_at,
        })
    }
}
