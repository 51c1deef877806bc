//! Bearer-token authentication
//!
//! Protected handlers take an [`AuthenticatedUser`] argument; extraction
//! fails with 401 before the handler body runs.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tactix_common::db::sessions;
use tracing::debug;

use crate::{ApiError, AppState};

/// The caller behind a valid bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    /// Raw token, kept so logout can revoke it
    pub token: String,
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let Some(session) = sessions::resolve_session(&state.db, token).await? else {
            debug!("Rejected unknown or expired token");
            return Err(ApiError::Unauthorized(
                "Invalid or expired token".to_string(),
            ));
        };

        Ok(AuthenticatedUser {
            user_id: session.user_id,
            username: session.username,
            token: token.to_string(),
        })
    }
}
