//! Data types that are persisted by the reconciliation engine.
//!
//! Amounts are [`MicroUnits`], i.e. integer millionths of the currency unit. Timestamps are UTC.
use chrono::{DateTime, Utc};
pub use recon_common::{MicroUnits, Secret};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

//--------------------------------------     GateSession       ---------------------------------------------------------
/// A stored gate login belonging to one user.
///
/// `is_active` flips to false as soon as the gate rejects the credential, and stays false until the session is
/// registered again.
#[derive(Debug, Clone, FromRow)]
pub struct GateSession {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub credential: Secret<String>,
    pub is_active: bool,
    pub last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   MarketplaceToken      -------------------------------------------------------
/// A user's API token for the P2P marketplace. A user has at most one; it is removed as soon as the marketplace
/// reports it expired.
#[derive(Debug, Clone, FromRow)]
pub struct MarketplaceToken {
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub token: Secret<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   GateTransaction       -------------------------------------------------------
/// A payout as last observed on the gate. There is exactly one row per gate `transaction_id`, no matter how many
/// sessions report it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct GateTransaction {
    pub id: i64,
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
    /// Raw JSON, kept as reported.
    pub attachments: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewGateTransaction {
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
    pub attachments: Option<String>,
}

impl NewGateTransaction {
    pub fn new<S: Into<String>>(transaction_id: S, amount_fiat: MicroUnits, status: i64) -> Self {
        Self { transaction_id: transaction_id.into(), amount_fiat, status, ..Default::default() }
    }

    pub fn with_approved_at(mut self, approved_at: DateTime<Utc>) -> Self {
        self.approved_at = Some(approved_at);
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn with_amount_stable(mut self, amount_stable: MicroUnits) -> Self {
        self.amount_stable = amount_stable;
        self
    }
}

impl GateTransaction {
    /// True if `observed` carries a change to one of the fields that may still move after the first sighting: the
    /// status, the update timestamp, or an approval timestamp that was not known before.
    pub fn is_changed_by(&self, observed: &NewGateTransaction) -> bool {
        self.status != observed.status ||
            self.updated_at != observed.updated_at ||
            (self.approved_at.is_none() && observed.approved_at.is_some())
    }
}

//--------------------------------------    OwnershipLink       -------------------------------------------------------
/// Records that a user's session has seen a gate transaction.
///
/// `matched` is set once some match references the transaction. Links created after that point start out matched.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OwnershipLink {
    pub id: i64,
    pub user_id: i64,
    pub gate_transaction_id: i64,
    pub matched: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   LocalTransaction       ------------------------------------------------------
/// A completed P2P marketplace transaction belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LocalTransaction {
    pub id: i64,
    pub user_id: i64,
    /// The marketplace's own order identifier. Unique per user.
    pub order_id: String,
    pub status: Option<String>,
    /// The crypto-side amount.
    pub amount: MicroUnits,
    /// The fiat total paid by the buyer.
    pub total_fiat: MicroUnits,
    pub buyer_name: Option<String>,
    pub method: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocalTransaction {
    pub user_id: i64,
    pub order_id: String,
    pub status: Option<String>,
    pub amount: MicroUnits,
    pub total_fiat: MicroUnits,
    pub buyer_name: Option<String>,
    pub method: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl NewLocalTransaction {
    pub fn new<S: Into<String>>(user_id: i64, order_id: S, total_fiat: MicroUnits, completed_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            order_id: order_id.into(),
            status: None,
            amount: MicroUnits::default(),
            total_fiat,
            buyer_name: None,
            method: None,
            completed_at,
        }
    }

    pub fn with_amount(mut self, amount: MicroUnits) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_status<S: Into<String>>(mut self, status: S) -> Self {
        self.status = Some(status.into());
        self
    }
}

//--------------------------------------     MatchRecord       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: i64,
    pub user_id: i64,
    pub local_tx_id: i64,
    pub gate_tx_id: i64,
    /// Whole minutes between the local completion time and the gate approval time.
    pub time_difference: i64,
    pub is_auto_matched: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub user_id: i64,
    pub local_tx_id: i64,
    pub gate_tx_id: i64,
    pub time_difference: i64,
    pub is_auto_matched: bool,
}

impl NewMatch {
    pub fn auto(user_id: i64, local_tx_id: i64, gate_tx_id: i64, time_difference: i64) -> Self {
        Self { user_id, local_tx_id, gate_tx_id, time_difference, is_auto_matched: true }
    }
}
