use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqliteConnection;

use crate::{
    db_types::{LocalTransaction, NewLocalTransaction},
    traits::{InsertLocalTransactionResult, ReconciliationError},
};

/// Inserts the marketplace transaction unless the user already has one with the same order id.
pub async fn idempotent_insert(
    transaction: NewLocalTransaction,
    conn: &mut SqliteConnection,
) -> Result<InsertLocalTransactionResult, ReconciliationError> {
    let user_id = transaction.user_id;
    let order_id = transaction.order_id.clone();
    let inserted: Option<LocalTransaction> = sqlx::query_as(
        r#"
        INSERT INTO local_transactions (
            user_id,
            order_id,
            status,
            amount,
            total_fiat,
            buyer_name,
            method,
            completed_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, order_id) DO NOTHING
        RETURNING *;
        "#,
    )
    .bind(transaction.user_id)
    .bind(transaction.order_id)
    .bind(transaction.status)
    .bind(transaction.amount)
    .bind(transaction.total_fiat)
    .bind(transaction.buyer_name)
    .bind(transaction.method)
    .bind(transaction.completed_at)
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        Some(tx) => {
            debug!("📝️ Local transaction [{order_id}] for user {user_id} inserted with id {}", tx.id);
            Ok(InsertLocalTransactionResult::Inserted(tx))
        },
        None => {
            let existing = fetch_by_order_id(user_id, &order_id, conn).await?.ok_or_else(|| {
                ReconciliationError::DatabaseError(format!("Local transaction [{order_id}] vanished during insert"))
            })?;
            Ok(InsertLocalTransactionResult::AlreadyExists(existing))
        },
    }
}

pub async fn fetch_by_order_id(
    user_id: i64,
    order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<LocalTransaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM local_transactions WHERE user_id = $1 AND order_id = $2")
        .bind(user_id)
        .bind(order_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<LocalTransaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM local_transactions WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// Unprocessed transactions for the user that completed strictly after `since`, oldest first.
pub async fn fetch_unprocessed(
    user_id: i64,
    since: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<LocalTransaction>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM local_transactions
        WHERE user_id = $1 AND processed = 0 AND completed_at > $2
        ORDER BY completed_at ASC, id ASC;
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(conn)
    .await
}

/// Flips `processed` from false to true. Returns false if the transaction was already processed (or doesn't exist).
pub async fn mark_processed(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE local_transactions SET processed = 1 WHERE id = $1 AND processed = 0")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn users_with_pending_transactions(conn: &mut SqliteConnection) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT DISTINCT user_id FROM local_transactions WHERE processed = 0 ORDER BY user_id ASC")
        .fetch_all(conn)
        .await
}
