use serde::{Deserialize, Serialize};

use crate::db_types::{GateTransaction, LocalTransaction, OwnershipLink};

/// The outcome of storing a gate payout observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpsertResult {
    /// First sighting of this transaction id.
    Inserted(GateTransaction),
    /// The transaction was known and one of its mutable fields moved.
    Updated(GateTransaction),
    /// The transaction was known and nothing changed.
    Unchanged(GateTransaction),
}

impl UpsertResult {
    pub fn transaction(&self) -> &GateTransaction {
        match self {
            Self::Inserted(t) | Self::Updated(t) | Self::Unchanged(t) => t,
        }
    }

    pub fn into_transaction(self) -> GateTransaction {
        match self {
            Self::Inserted(t) | Self::Updated(t) | Self::Unchanged(t) => t,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimResult {
    Claimed(OwnershipLink),
    AlreadyClaimed,
}

impl ClaimResult {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Claimed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertLocalTransactionResult {
    Inserted(LocalTransaction),
    AlreadyExists(LocalTransaction),
}

impl InsertLocalTransactionResult {
    pub fn transaction(&self) -> &LocalTransaction {
        match self {
            Self::Inserted(t) | Self::AlreadyExists(t) => t,
        }
    }
}
