use log::*;
use sqlx::SqliteConnection;

use crate::{
    db_types::{MatchRecord, NewMatch},
    traits::ReconciliationError,
};

/// Inserts the match record. This is not atomic on its own; [`crate::SqliteDatabase`] wraps it in a transaction
/// together with the processed and matched flag updates.
pub async fn insert_match(new_match: NewMatch, conn: &mut SqliteConnection) -> Result<MatchRecord, ReconciliationError> {
    let gate_tx_id = new_match.gate_tx_id;
    let record: MatchRecord = sqlx::query_as(
        r#"
        INSERT INTO transaction_matches (user_id, local_tx_id, gate_tx_id, time_difference, is_auto_matched)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *;
        "#,
    )
    .bind(new_match.user_id)
    .bind(new_match.local_tx_id)
    .bind(new_match.gate_tx_id)
    .bind(new_match.time_difference)
    .bind(new_match.is_auto_matched)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => ReconciliationError::AlreadyMatched(gate_tx_id),
        e => ReconciliationError::from(e),
    })?;
    debug!("🔗️ Match #{} created: local #{} <-> gate #{}", record.id, record.local_tx_id, record.gate_tx_id);
    Ok(record)
}

pub async fn match_exists(gate_tx_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM transaction_matches WHERE gate_tx_id = $1)")
        .bind(gate_tx_id)
        .fetch_one(conn)
        .await
}

pub async fn fetch_for_gate_transaction(
    gate_tx_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchRecord>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transaction_matches WHERE gate_tx_id = $1")
        .bind(gate_tx_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<MatchRecord>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transaction_matches WHERE user_id = $1 ORDER BY id ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}
