//! Landing-page movers: a fixed symbol list enriched with live quotes.

use std::sync::Arc;

use crate::api::types::MoverDto;
use crate::db::Store;
use crate::domain::UserId;
use crate::services::quotes::QuoteService;

pub struct MoversService {
    quotes: Arc<QuoteService>,
    store: Store,
    symbols: Vec<String>,
}

impl MoversService {
    #[must_use]
    pub const fn new(quotes: Arc<QuoteService>, store: Store, symbols: Vec<String>) -> Self {
        Self {
            quotes,
            store,
            symbols,
        }
    }

    /// Fetches every configured symbol, in configured order.
    ///
    /// `already_in_watchlist` is only ever true for an authenticated viewer.
    pub async fn get_movers(&self, viewer: Option<UserId>) -> anyhow::Result<Vec<MoverDto>> {
        let (snapshots, watched) = tokio::join!(self.quotes.lookup_many(&self.symbols), async {
            match viewer {
                Some(user_id) => self.store.watched_symbols(user_id).await.map(Some),
                None => Ok(None),
            }
        });
        let watched = watched?;

        Ok(snapshots
            .into_iter()
            .map(|snapshot| {
                let watching = watched
                    .as_ref()
                    .is_some_and(|set| set.contains(&snapshot.symbol));
                MoverDto::from_snapshot(snapshot, watching)
            })
            .collect())
    }
}
