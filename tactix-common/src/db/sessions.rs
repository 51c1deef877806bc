//! Bearer-token sessions
//!
//! The raw token only exists in the login response; rows hold its digest.

use chrono::{Duration, Utc};
use sqlx::{Row, SqlitePool};

use crate::credentials::{generate_access_token, token_digest};
use crate::Result;

/// Identity behind a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
}

/// Start a session for `user_id`, returning the raw bearer token
pub async fn create_session(pool: &SqlitePool, user_id: i64, ttl: Duration) -> Result<String> {
    let token = generate_access_token();
    let now = Utc::now();
    let expires_at = (now + ttl).timestamp();

    sqlx::query(
        r#"
        INSERT INTO sessions (token_digest, user_id, created_at, expires_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(token_digest(&token))
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Resolve a bearer token; `None` when unknown, revoked or expired
pub async fn resolve_session(pool: &SqlitePool, token: &str) -> Result<Option<SessionUser>> {
    let row = sqlx::query(
        r#"
        SELECT s.user_id, u.username
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_digest = ? AND s.expires_at > ?
        "#,
    )
    .bind(token_digest(token))
    .bind(Utc::now().timestamp())
    .fetch_optional(pool)
    .await?;

    row.map(|r| -> Result<SessionUser> {
        Ok(SessionUser {
            user_id: r.try_get("user_id")?,
            username: r.try_get("username")?,
        })
    })
    .transpose()
}

/// Revoke a token; `false` if it was not active
pub async fn revoke_session(pool: &SqlitePool, token: &str) -> Result<bool> {
    let affected = sqlx::query("DELETE FROM sessions WHERE token_digest = ?")
        .bind(token_digest(token))
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

/// Drop expired sessions, returning how many were removed
pub async fn purge_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let affected = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected)
}
