//! Exercise (puzzle) endpoints
//!
//! Creation is all-or-nothing: the payload is parsed into typed moves, the
//! whole line is replayed through the legality oracle, and only then is the
//! row written.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tactix_common::db::puzzles;
use tactix_common::moves::parse_move_list;
use tactix_common::{NewPuzzle, Puzzle, SideToMove};
use tracing::{info, warn};

use super::MessageResponse;
use crate::{ApiError, AppState};

/// POST /api/exercises body
///
/// Field aliases accept the names used by older clients.
#[derive(Debug, Default, Deserialize)]
pub struct CreateExerciseRequest {
    #[serde(alias = "initial_fen")]
    pub initial_position: Option<String>,
    #[serde(alias = "starting_color")]
    pub side_to_move: Option<String>,
    pub moves: Option<Vec<String>>,
    #[serde(alias = "motives")]
    pub category: Option<String>,
}

impl CreateExerciseRequest {
    /// Structural validation; no chess rules are consulted here
    pub fn into_new_puzzle(self) -> Result<NewPuzzle, ApiError> {
        let initial_position = self
            .initial_position
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("initial_position"))?;

        let side_to_move: SideToMove = self
            .side_to_move
            .ok_or_else(|| missing("side_to_move"))?
            .parse()?;

        let raw_moves = self.moves.ok_or_else(|| missing("moves"))?;
        let moves = parse_move_list(raw_moves.as_slice())?;

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(NewPuzzle {
            initial_position,
            side_to_move,
            moves,
            category,
        })
    }
}

fn missing(field: &str) -> ApiError {
    ApiError::Validation(format!("Missing required field: {}", field))
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// One listed exercise
#[derive(Debug, Serialize)]
pub struct ExerciseResponse {
    pub id: i64,
    pub initial_position: String,
    pub moves: Vec<String>,
    pub side_to_move: SideToMove,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Puzzle> for ExerciseResponse {
    fn from(p: Puzzle) -> Self {
        Self {
            id: p.id,
            initial_position: p.initial_position,
            moves: p.moves,
            side_to_move: p.side_to_move,
            category: p.category,
            created_at: p.created_at,
        }
    }
}

/// GET /api/exercises
pub async fn list_exercises(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExerciseResponse>>, ApiError> {
    let puzzles = puzzles::list_puzzles(&state.db).await?;
    Ok(Json(puzzles.into_iter().map(ExerciseResponse::from).collect()))
}

/// POST /api/exercises
pub async fn create_exercise(
    State(state): State<AppState>,
    payload: Result<Json<CreateExerciseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(request) = payload?;

    let puzzle = request.into_new_puzzle().map_err(|e| {
        warn!("Rejected exercise payload: {}", e);
        e
    })?;

    state
        .oracle
        .validate(&puzzle.initial_position, puzzle.side_to_move, &puzzle.moves)
        .map_err(|e| {
            warn!("Rejected exercise: {}", e);
            ApiError::from(e)
        })?;

    let id = puzzles::insert_puzzle(&state.db, &puzzle).await?;
    info!(
        id,
        category = puzzle.category.as_deref().unwrap_or("<uncategorized>"),
        moves = puzzle.moves.len(),
        "Created exercise"
    );

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// DELETE /api/exercises/:id
pub async fn delete_exercise(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;

    if !puzzles::delete_puzzle(&state.db, id).await? {
        return Err(ApiError::NotFound("Exercise not found".to_string()));
    }

    info!(id, "Deleted exercise");
    Ok(Json(MessageResponse::new("Exercise deleted successfully")))
}
