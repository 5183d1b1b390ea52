use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{db_types::GateSession, traits::SessionStoreError};

pub async fn insert_session(
    user_id: i64,
    credential: &str,
    conn: &mut SqliteConnection,
) -> Result<GateSession, SessionStoreError> {
    let session = sqlx::query_as("INSERT INTO gate_sessions (user_id, credential) VALUES ($1, $2) RETURNING *;")
        .bind(user_id)
        .bind(credential)
        .fetch_one(conn)
        .await?;
    Ok(session)
}

pub async fn fetch_session(id: i64, conn: &mut SqliteConnection) -> Result<Option<GateSession>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM gate_sessions WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_active_sessions(conn: &mut SqliteConnection) -> Result<Vec<GateSession>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM gate_sessions WHERE is_active = 1 ORDER BY id ASC").fetch_all(conn).await
}

pub async fn update_validity(
    id: i64,
    valid: bool,
    checked_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<GateSession, SessionStoreError> {
    sqlx::query_as(
        r#"
        UPDATE gate_sessions SET is_active = $1, last_checked = $2, updated_at = CURRENT_TIMESTAMP
        WHERE id = $3
        RETURNING *;
        "#,
    )
    .bind(valid)
    .bind(checked_at)
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or(SessionStoreError::SessionNotFound(id))
}
