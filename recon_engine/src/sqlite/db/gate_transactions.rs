use log::*;
use sqlx::SqliteConnection;

use crate::{
    db_types::{GateTransaction, NewGateTransaction},
    traits::{GateLedgerError, UpsertResult},
};

pub async fn fetch_by_transaction_id(
    transaction_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<GateTransaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM gate_transactions WHERE transaction_id = $1")
        .bind(transaction_id)
        .fetch_optional(conn)
        .await
}

/// Stores a payout observation, returning what happened to the record.
///
/// An insert that loses a race against another writer for the same transaction id falls back to the update path.
pub async fn idempotent_upsert(
    transaction: NewGateTransaction,
    conn: &mut SqliteConnection,
) -> Result<UpsertResult, GateLedgerError> {
    if let Some(existing) = fetch_by_transaction_id(&transaction.transaction_id, conn).await? {
        return update_if_changed(existing, &transaction, conn).await;
    }
    match insert_gate_transaction(transaction.clone(), conn).await {
        Ok(inserted) => {
            debug!("📝️ Gate transaction [{}] inserted with id {}", inserted.transaction_id, inserted.id);
            Ok(UpsertResult::Inserted(inserted))
        },
        Err(GateLedgerError::TransactionAlreadyExists(id)) => {
            debug!("📝️ Gate transaction [{id}] was inserted concurrently. Updating instead.");
            let existing = fetch_by_transaction_id(&id, conn)
                .await?
                .ok_or_else(|| GateLedgerError::TransactionNotFound(id.clone()))?;
            update_if_changed(existing, &transaction, conn).await
        },
        Err(e) => Err(e),
    }
}

async fn update_if_changed(
    existing: GateTransaction,
    observed: &NewGateTransaction,
    conn: &mut SqliteConnection,
) -> Result<UpsertResult, GateLedgerError> {
    if !existing.is_changed_by(observed) {
        trace!("📝️ Gate transaction [{}] is unchanged", existing.transaction_id);
        return Ok(UpsertResult::Unchanged(existing));
    }
    let updated: GateTransaction = sqlx::query_as(
        r#"
        UPDATE gate_transactions SET
            status = $1,
            updated_at = $2,
            approved_at = COALESCE(approved_at, $3)
        WHERE id = $4
        RETURNING *;
        "#,
    )
    .bind(observed.status)
    .bind(observed.updated_at)
    .bind(observed.approved_at)
    .bind(existing.id)
    .fetch_one(conn)
    .await?;
    debug!(
        "📝️ Gate transaction [{}] updated. Status {} -> {}",
        updated.transaction_id, existing.status, updated.status
    );
    Ok(UpsertResult::Updated(updated))
}

/// Inserts a new gate transaction. This is not atomic. You can embed this call inside a transaction if you need to
/// ensure atomicity, and pass `&mut *tx` as the connection argument.
async fn insert_gate_transaction(
    transaction: NewGateTransaction,
    conn: &mut SqliteConnection,
) -> Result<GateTransaction, GateLedgerError> {
    let transaction_id = transaction.transaction_id.clone();
    sqlx::query_as(
        r#"
        INSERT INTO gate_transactions (
            transaction_id,
            payment_method_id,
            wallet,
            amount_fiat,
            amount_stable,
            total_fiat,
            total_stable,
            status,
            bank_name,
            bank_code,
            bank_label,
            payment_method,
            course,
            success_count,
            success_rate,
            approved_at,
            expired_at,
            created_at,
            updated_at,
            trader_id,
            trader_name,
            attachments
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
        RETURNING *;
        "#,
    )
    .bind(transaction.transaction_id)
    .bind(transaction.payment_method_id)
    .bind(transaction.wallet)
    .bind(transaction.amount_fiat)
    .bind(transaction.amount_stable)
    .bind(transaction.total_fiat)
    .bind(transaction.total_stable)
    .bind(transaction.status)
    .bind(transaction.bank_name)
    .bind(transaction.bank_code)
    .bind(transaction.bank_label)
    .bind(transaction.payment_method)
    .bind(transaction.course)
    .bind(transaction.success_count)
    .bind(transaction.success_rate)
    .bind(transaction.approved_at)
    .bind(transaction.expired_at)
    .bind(transaction.created_at)
    .bind(transaction.updated_at)
    .bind(transaction.trader_id)
    .bind(transaction.trader_name)
    .bind(transaction.attachments)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            GateLedgerError::TransactionAlreadyExists(transaction_id)
        },
        e => GateLedgerError::from(e),
    })
}

/// Approved gate transactions that `user_id` holds an unmatched ownership link to, oldest approval first.
pub async fn fetch_match_candidates(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<GateTransaction>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT gate_transactions.* FROM gate_transactions
        JOIN gate_transaction_owners ON gate_transaction_owners.gate_transaction_id = gate_transactions.id
        WHERE gate_transaction_owners.user_id = $1
          AND gate_transaction_owners.matched = 0
          AND gate_transactions.approved_at IS NOT NULL
        ORDER BY gate_transactions.approved_at ASC, gate_transactions.id ASC;
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}
