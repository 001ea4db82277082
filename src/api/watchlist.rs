use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::AuthUser;
use super::validation::{AddWatchRequest, ValidatedJson};
use super::{AddedResponse, ApiError, AppState, SuccessResponse, WatchItemDto};
use crate::domain::WatchItemId;
use crate::services::WatchlistError;

/// GET /api/watchlist
pub async fn list_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<WatchItemDto>>, ApiError> {
    Ok(Json(state.watchlist.view(user.id).await?))
}

/// POST /api/watchlist
pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<AddWatchRequest>,
) -> Result<Json<AddedResponse>, ApiError> {
    let (symbol, name) = payload.into_parts()?;
    let item = state.watchlist.add(user.id, &symbol, &name).await?;

    Ok(Json(AddedResponse {
        success: true,
        symbol: item.symbol,
    }))
}

/// DELETE /api/watchlist/{id}
pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    // A non-numeric id cannot name an item.
    let item_id = id
        .parse::<i32>()
        .map(WatchItemId::new)
        .map_err(|_| ApiError::from(WatchlistError::NotFound))?;

    state.watchlist.remove(user.id, item_id).await?;
    Ok(Json(SuccessResponse::ok()))
}
