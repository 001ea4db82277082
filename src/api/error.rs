use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::services::{AuthError, WatchlistError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    /// Duplicate username or symbol; rendered as 400 to match the client contract.
    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ValidationError(msg) | Self::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidInput(msg) => Self::ValidationError(msg),
            AuthError::DuplicateUsername => Self::Conflict(err.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<WatchlistError> for ApiError {
    fn from(err: WatchlistError) -> Self {
        match err {
            WatchlistError::InvalidInput(msg) => Self::ValidationError(msg),
            WatchlistError::AlreadyWatched(_) => Self::Conflict(err.to_string()),
            WatchlistError::NotFound => Self::NotFound(err.to_string()),
            WatchlistError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("login required".to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn store_failures_map_to_one_generic_500_from_every_service() {
        let store_failure = || anyhow::anyhow!("disk I/O error").context("Failed to insert");

        let auth = AuthError::from(store_failure());
        assert!(matches!(auth, AuthError::Database(ref msg) if msg.contains("disk I/O error")));

        let watchlist = WatchlistError::from(store_failure());
        assert!(matches!(watchlist, WatchlistError::Database(_)));

        let (auth_status, auth_body) = render(ApiError::from(auth)).await;
        let (watch_status, watch_body) = render(ApiError::from(watchlist)).await;

        assert_eq!(auth_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(watch_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(auth_body, watch_body);
        assert_eq!(auth_body["error"], "A database error occurred");
    }

    #[tokio::test]
    async fn client_errors_keep_their_messages() {
        let (status, body) = render(ApiError::from(AuthError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({ "error": "invalid credentials" }));

        let (status, body) = render(ApiError::from(WatchlistError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "watchlist item not found");
    }
}
