//! User accounts

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::credentials::{generate_salt, hash_password, verify_password};
use crate::models::User;
use crate::{Error, Result};

/// Register a user with a freshly salted password hash
///
/// Returns `Error::Conflict` when the username is taken.
pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let salt = generate_salt();
    let hash = hash_password(password, &salt);
    let created_at = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, password_salt, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .bind(created_at)
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(User {
            id: done.last_insert_rowid(),
            username: username.to_string(),
            password_hash: hash,
            password_salt: salt,
            created_at,
        }),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            Error::Conflict(format!("Username '{}' is already taken", username)),
        ),
        Err(e) => Err(e.into()),
    }
}

pub async fn find_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, password_hash, password_salt, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Look up a user and check the password; `None` on any mismatch
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Result<Option<User>> {
    let user = find_user_by_username(pool, username).await?;
    Ok(user.filter(|u| verify_password(password, &u.password_salt, &u.password_hash)))
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        password_salt: row.try_get("password_salt")?,
        created_at: row.try_get("created_at")?,
    })
}
