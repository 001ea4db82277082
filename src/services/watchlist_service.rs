//! Domain service for a user's watchlist.
//!
//! Reads are enriched with live quotes on every call; nothing quote-related
//! is persisted.

use thiserror::Error;

use crate::api::types::{SearchResultDto, WatchItemDto};
use crate::db::WatchItem;
use crate::domain::{UserId, WatchItemId};

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} is already in your watchlist")]
    AlreadyWatched(String),

    /// Absent, or owned by someone else; the two are not distinguished.
    #[error("watchlist item not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

/// Store failures arrive as `anyhow` errors.
impl From<anyhow::Error> for WatchlistError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait WatchlistService: Send + Sync {
    /// The user's items in insertion order, each with a fresh quote.
    async fn view(&self, user_id: UserId) -> Result<Vec<WatchItemDto>, WatchlistError>;

    /// Exact-symbol lookup. Always yields one result for a non-blank query,
    /// and none for a blank one.
    async fn search(
        &self,
        query: &str,
        viewer: Option<UserId>,
    ) -> Result<Vec<SearchResultDto>, WatchlistError>;

    /// Adds a symbol, normalized to trimmed uppercase.
    ///
    /// # Errors
    ///
    /// - [`WatchlistError::InvalidInput`] if the symbol is blank
    /// - [`WatchlistError::AlreadyWatched`] if the user already holds it
    async fn add(
        &self,
        user_id: UserId,
        symbol: &str,
        name: &str,
    ) -> Result<WatchItem, WatchlistError>;

    /// Removes one of the user's own items.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::NotFound`] when the item does not exist or is not the user's.
    async fn remove(&self, user_id: UserId, item_id: WatchItemId) -> Result<(), WatchlistError>;
}
