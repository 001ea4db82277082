use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::{CredentialsRequest, ValidatedJson};
use super::{ApiError, AppState, LoginResponse, SuccessResponse};
use crate::domain::UserId;
use crate::services::UserInfo;

/// Session key holding the logged-in user's id.
pub const USER_ID_KEY: &str = "user_id";

/// The authenticated principal, inserted by [`require_user`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
}

impl From<UserInfo> for AuthUser {
    fn from(user: UserInfo) -> Self {
        Self { id: user.id }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Rejects requests without a live session with 401 before any handler runs.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = current_user(&state, &session)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    tracing::Span::current().record("user_id", user.id.value());
    request.extensions_mut().insert(AuthUser::from(user));
    Ok(next.run(request).await)
}

/// Resolves the session's user, if any. A session pointing at a vanished user is cleared.
pub async fn current_user(
    state: &AppState,
    session: &Session,
) -> Result<Option<UserInfo>, ApiError> {
    let Some(raw_id) = session
        .get::<i32>(USER_ID_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
    else {
        return Ok(None);
    };

    let user = state.auth.find_by_id(UserId::new(raw_id)).await?;
    if user.is_none() {
        session
            .flush()
            .await
            .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;
    }
    Ok(user)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CredentialsRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (username, password) = payload.into_registration()?;
    state.auth.register(&username, &password).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    ValidatedJson(payload): ValidatedJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (username, password) = payload.into_parts();
    let user = state.auth.verify_credentials(&username, &password).await?;

    // New id on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(USER_ID_KEY, user.id.value())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        success: true,
        username: user.username,
    }))
}

/// POST /api/logout
pub async fn logout(session: Session) -> Result<Json<SuccessResponse>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to end session: {e}")))?;
    Ok(Json(SuccessResponse::ok()))
}
