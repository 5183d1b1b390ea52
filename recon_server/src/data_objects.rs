use std::str::FromStr;

use chrono::{DateTime, Utc};
use recon_engine::db_types::{MicroUnits, NewLocalTransaction};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

/// An amount as it arrives over the wire: a JSON number, or a string in the marketplace's format (`"1 250,50"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountValue {
    Number(f64),
    Text(String),
}

impl TryFrom<AmountValue> for MicroUnits {
    type Error = ServerError;

    fn try_from(value: AmountValue) -> Result<Self, Self::Error> {
        let result = match &value {
            AmountValue::Number(v) => MicroUnits::try_from(*v),
            AmountValue::Text(s) => MicroUnits::from_str(s),
        };
        result.map_err(|e| ServerError::InvalidRequestBody(format!("Invalid amount {value:?}. {e}")))
    }
}

/// Body of `POST /api/local_transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalTransactionRequest {
    pub user_id: i64,
    pub order_id: String,
    pub status: Option<String>,
    /// The crypto side of the trade, if known.
    pub amount: Option<AmountValue>,
    pub total_fiat: AmountValue,
    pub buyer_name: Option<String>,
    pub method: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl TryFrom<LocalTransactionRequest> for NewLocalTransaction {
    type Error = ServerError;

    fn try_from(req: LocalTransactionRequest) -> Result<Self, Self::Error> {
        let total_fiat = MicroUnits::try_from(req.total_fiat)?;
        let mut tx = NewLocalTransaction::new(req.user_id, req.order_id, total_fiat, req.completed_at);
        if let Some(amount) = req.amount {
            tx = tx.with_amount(MicroUnits::try_from(amount)?);
        }
        if let Some(status) = req.status {
            tx = tx.with_status(status);
        }
        tx.buyer_name = req.buyer_name;
        tx.method = req.method;
        Ok(tx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub user_id: i64,
    pub matched: usize,
}
