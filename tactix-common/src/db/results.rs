//! Training results (append-only, per user)

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::TrainingResult;
use crate::Result;

/// Record an attempt for `user_id`
pub async fn insert_result(
    pool: &SqlitePool,
    user_id: i64,
    exercise_id: i64,
    outcome: &str,
) -> Result<TrainingResult> {
    let created_at = Utc::now();

    let id = sqlx::query(
        r#"
        INSERT INTO results (exercise_id, user_id, outcome, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(exercise_id)
    .bind(user_id)
    .bind(outcome)
    .bind(created_at)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(TrainingResult {
        id,
        exercise_id,
        user_id,
        outcome: outcome.to_string(),
        created_at,
    })
}

/// Results owned by `user_id`, oldest first
pub async fn list_results_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<TrainingResult>> {
    let rows = sqlx::query(
        r#"
        SELECT id, exercise_id, user_id, outcome, created_at
        FROM results
        WHERE user_id = ?
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(result_from_row).collect()
}

fn result_from_row(row: &SqliteRow) -> Result<TrainingResult> {
    Ok(TrainingResult {
        id: row.try_get("id")?,
        exercise_id: row.try_get("exercise_id")?,
        user_id: row.try_get("user_id")?,
        outcome: row.try_get("outcome")?,
        created_at: row.try_get("created_at")?,
    })
}
