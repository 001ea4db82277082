//! `SeaORM` implementation of the `WatchlistService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::api::types::{SearchResultDto, WatchItemDto};
use crate::db::{Store, WatchItem};
use crate::domain::{Symbol, UserId, WatchItemId};
use crate::services::quotes::QuoteService;
use crate::services::watchlist_service::{WatchlistError, WatchlistService};

pub struct SeaOrmWatchlistService {
    store: Store,
    quotes: Arc<QuoteService>,
}

impl SeaOrmWatchlistService {
    #[must_use]
    pub const fn new(store: Store, quotes: Arc<QuoteService>) -> Self {
        Self { store, quotes }
    }
}

#[async_trait]
impl WatchlistService for SeaOrmWatchlistService {
    async fn view(&self, user_id: UserId) -> Result<Vec<WatchItemDto>, WatchlistError> {
        let items = self.store.list_watch_items(user_id).await?;
        let symbols: Vec<&str> = items.iter().map(|item| item.symbol.as_str()).collect();
        let snapshots = self.quotes.lookup_many(&symbols).await;

        Ok(items
            .into_iter()
            .zip(snapshots)
            .map(|(item, snapshot)| WatchItemDto {
                id: item.id,
                price: snapshot.formatted_price(),
                change: snapshot.formatted_change(),
                percent_change: snapshot.formatted_percent_change(),
                // Stored names win; fall back to the provider's for items added without one.
                name: if item.name.is_empty() {
                    snapshot.name
                } else {
                    item.name
                },
                symbol: item.symbol,
            })
            .collect())
    }

    async fn search(
        &self,
        query: &str,
        viewer: Option<UserId>,
    ) -> Result<Vec<SearchResultDto>, WatchlistError> {
        let Ok(symbol) = Symbol::parse(query) else {
            return Ok(Vec::new());
        };

        let snapshot = self.quotes.lookup(symbol.as_str()).await;

        let already_in_watchlist = match viewer {
            Some(user_id) if snapshot.available => self
                .store
                .watched_symbols(user_id)
                .await?
                .contains(symbol.as_str()),
            _ => false,
        };

        Ok(vec![SearchResultDto {
            symbol: symbol.into_inner(),
            name: snapshot.name,
            already_in_watchlist,
        }])
    }

    async fn add(
        &self,
        user_id: UserId,
        symbol: &str,
        name: &str,
    ) -> Result<WatchItem, WatchlistError> {
        let symbol =
            Symbol::parse(symbol).map_err(|e| WatchlistError::InvalidInput(e.to_string()))?;

        let item = self
            .store
            .add_watch_item(user_id, &symbol, name)
            .await?
            .ok_or_else(|| WatchlistError::AlreadyWatched(symbol.to_string()))?;

        info!(user_id = %user_id, symbol = %item.symbol, "Added to watchlist");
        Ok(item)
    }

    async fn remove(&self, user_id: UserId, item_id: WatchItemId) -> Result<(), WatchlistError> {
        if !self.store.remove_watch_item(user_id, item_id).await? {
            return Err(WatchlistError::NotFound);
        }

        info!(user_id = %user_id, item_id = %item_id, "Removed from watchlist");
        Ok(())
    }
}
