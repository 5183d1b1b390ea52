use sqlx::SqliteConnection;

use crate::db_types::MarketplaceToken;

/// Stores the user's token, replacing any token already on file.
pub async fn upsert_token(
    user_id: i64,
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<MarketplaceToken, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO marketplace_tokens (user_id, token) VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET token = excluded.token, updated_at = CURRENT_TIMESTAMP
        RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(token)
    .fetch_one(conn)
    .await
}

pub async fn fetch_token(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<MarketplaceToken>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM marketplace_tokens WHERE user_id = $1").bind(user_id).fetch_optional(conn).await
}

pub async fn fetch_tokens(conn: &mut SqliteConnection) -> Result<Vec<MarketplaceToken>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM marketplace_tokens ORDER BY user_id ASC").fetch_all(conn).await
}

/// Returns true if there was a token to remove.
pub async fn delete_token(user_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM marketplace_tokens WHERE user_id = $1").bind(user_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
