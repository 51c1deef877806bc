//! Registration, login and logout

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tactix_common::db::{sessions, users};
use tracing::{info, warn};

use super::auth::AuthenticatedUser;
use super::MessageResponse;
use crate::{ApiError, AppState};

/// Body of register and login requests
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    fn into_parts(self) -> Result<(String, String), ApiError> {
        let username = self
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::Validation("Missing required field: username".to_string()))?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Validation("Missing required field: password".to_string()))?;
        Ok((username, password))
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: i64,
    pub username: String,
}

/// POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = payload?;
    let (username, password) = request.into_parts()?;

    let user = users::create_user(&state.db, &username, &password).await?;
    info!(user_id = user.id, username = %user.username, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            username: user.username,
        }),
    ))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let (username, password) = request.into_parts()?;

    let Some(user) = users::authenticate(&state.db, &username, &password).await? else {
        warn!(username = %username, "Failed login");
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    };

    let access_token = sessions::create_session(&state.db, user.id, state.token_ttl).await?;
    info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        user_id: user.id,
        username: user.username,
    }))
}

/// POST /api/users/logout
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<MessageResponse>, ApiError> {
    sessions::revoke_session(&state.db, &user.token).await?;
    info!(user_id = user.user_id, "User logged out");
    Ok(Json(MessageResponse::new("Logged out")))
}
