//! HTTP error mapping
//!
//! Every failure leaves the service as `{"error": message}` with a status
//! chosen by kind. Nothing escapes a handler unhandled.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tactix_common::{LegalityError, MoveTokenError};
use thiserror::Error;
use tracing::error;

/// API error kinds
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed payload, missing field or illegal move
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or missing/invalid bearer token
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tactix_common::Error> for ApiError {
    fn from(err: tactix_common::Error) -> Self {
        use tactix_common::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::Validation(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            other => {
                error!("Request failed: {}", other);
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<MoveTokenError> for ApiError {
    fn from(err: MoveTokenError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<LegalityError> for ApiError {
    fn from(err: LegalityError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(format!("Invalid path: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized(String::new()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict(String::new()).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_common_errors_map_by_kind() {
        let not_found: ApiError = tactix_common::Error::NotFound("x".into()).into();
        assert!(matches!(not_found, ApiError::NotFound(_)));

        let internal: ApiError = tactix_common::Error::Internal("secret detail".into()).into();
        assert_eq!(internal.to_string(), "Internal server error");
    }

    #[test]
    fn test_illegal_move_message_names_token() {
        let err: ApiError = LegalityError::IllegalMove {
            index: 1,
            token: "e2e5".into(),
        }
        .into();
        assert!(err.to_string().contains("e2e5"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
