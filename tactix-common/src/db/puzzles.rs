//! Puzzle store queries
//!
//! Callers validate before inserting; the store never re-checks legality.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::{NewPuzzle, Puzzle, SideToMove};
use crate::{Error, Result};

/// Insert a validated puzzle, returning its new id
pub async fn insert_puzzle(pool: &SqlitePool, puzzle: &NewPuzzle) -> Result<i64> {
    let moves = serde_json::to_string(&puzzle.moves)?;

    let id = sqlx::query(
        r#"
        INSERT INTO exercises (initial_position, side_to_move, moves, category, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&puzzle.initial_position)
    .bind(puzzle.side_to_move.as_str())
    .bind(moves)
    .bind(puzzle.category.as_deref())
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Full snapshot of the store in creation order
pub async fn list_puzzles(pool: &SqlitePool) -> Result<Vec<Puzzle>> {
    let rows = sqlx::query(
        r#"
        SELECT id, initial_position, side_to_move, moves, category, created_at
        FROM exercises
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(puzzle_from_row).collect()
}

/// Delete by id; `false` when no such puzzle exists
pub async fn delete_puzzle(pool: &SqlitePool, id: i64) -> Result<bool> {
    let affected = sqlx::query("DELETE FROM exercises WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

fn puzzle_from_row(row: &SqliteRow) -> Result<Puzzle> {
    let id: i64 = row.try_get("id")?;
    let side: String = row.try_get("side_to_move")?;
    let side_to_move: SideToMove = side
        .parse()
        .map_err(|_| Error::Internal(format!("exercise {} has side_to_move {:?}", id, side)))?;
    let moves: String = row.try_get("moves")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Puzzle {
        id,
        initial_position: row.try_get("initial_position")?,
        side_to_move,
        moves: serde_json::from_str(&moves)?,
        category: row.try_get("category")?,
        created_at,
    })
}
