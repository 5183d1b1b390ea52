use sqlx::SqliteConnection;

use crate::db_types::OwnershipLink;

/// Creates the link between `user_id` and the gate transaction, returning `None` if it already exists.
///
/// The link starts out matched when a match already references the transaction, so a late claimant never sees a
/// settled payout as a candidate.
pub async fn claim(
    user_id: i64,
    gate_tx_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<OwnershipLink>, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO gate_transaction_owners (user_id, gate_transaction_id, matched)
        VALUES ($1, $2, EXISTS (SELECT 1 FROM transaction_matches WHERE gate_tx_id = $2))
        ON CONFLICT (user_id, gate_transaction_id) DO NOTHING
        RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(gate_tx_id)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_link(
    user_id: i64,
    gate_tx_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<OwnershipLink>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM gate_transaction_owners WHERE user_id = $1 AND gate_transaction_id = $2")
        .bind(user_id)
        .bind(gate_tx_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_links_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OwnershipLink>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM gate_transaction_owners WHERE user_id = $1 ORDER BY id ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

/// Marks every unmatched link to the gate transaction as matched. Returns the number of links changed.
pub async fn mark_matched(gate_tx_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE gate_transaction_owners SET matched = 1, updated_at = CURRENT_TIMESTAMP
        WHERE gate_transaction_id = $1 AND matched = 0;
        "#,
    )
    .bind(gate_tx_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
