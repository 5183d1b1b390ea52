use serde::{Deserialize, Serialize};

use crate::db_types::MatchRecord;

/// Emitted after a match has been committed to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCreatedEvent {
    pub record: MatchRecord,
}

impl MatchCreatedEvent {
    pub fn new(record: MatchRecord) -> Self {
        Self { record }
    }
}
