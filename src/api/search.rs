use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::current_user;
use super::validation::validate_search_query;
use super::{ApiError, AppState, MoverDto, SearchResultDto};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/search?q=
pub async fn search_symbol(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResultDto>>, ApiError> {
    let Some(q) = validate_search_query(query.q.as_deref()) else {
        return Ok(Json(Vec::new()));
    };

    let viewer = current_user(&state, &session).await?.map(|u| u.id);
    Ok(Json(state.watchlist.search(q, viewer).await?))
}

/// GET /api/movers
pub async fn list_movers(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<Vec<MoverDto>>, ApiError> {
    let viewer = current_user(&state, &session).await?.map(|u| u.id);
    Ok(Json(state.movers.get_movers(viewer).await?))
}
