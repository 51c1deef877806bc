//! Per-user training results
//!
//! Both endpoints are scoped to the token's user; there is no way to read or
//! write another user's history.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tactix_common::db::results;
use tactix_common::TrainingResult;
use tracing::info;

use super::auth::AuthenticatedUser;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SubmitResultRequest {
    pub exercise_id: Option<i64>,
    #[serde(alias = "outcome")]
    pub result: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResultResponse {
    pub message: String,
    pub id: i64,
}

/// One entry of the caller's history
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub id: i64,
    pub exercise_id: i64,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

impl From<TrainingResult> for ResultResponse {
    fn from(r: TrainingResult) -> Self {
        Self {
            id: r.id,
            exercise_id: r.exercise_id,
            result: r.outcome,
            created_at: r.created_at,
        }
    }
}

/// POST /api/results
pub async fn submit_result(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<SubmitResultRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResultResponse>), ApiError> {
    let Json(request) = payload?;

    let exercise_id = request
        .exercise_id
        .ok_or_else(|| ApiError::Validation("Missing required field: exercise_id".to_string()))?;
    let outcome = request
        .result
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing required field: result".to_string()))?;

    let recorded = results::insert_result(&state.db, user.user_id, exercise_id, &outcome).await?;
    info!(user_id = user.user_id, exercise_id, outcome = %outcome, "Recorded result");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResultResponse {
            message: "Result recorded".to_string(),
            id: recorded.id,
        }),
    ))
}

/// GET /api/results
pub async fn list_results(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ResultResponse>>, ApiError> {
    let history = results::list_results_for_user(&state.db, user.user_id).await?;
    Ok(Json(history.into_iter().map(ResultResponse::from).collect()))
}
