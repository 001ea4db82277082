//! Movers command handler

use std::sync::Arc;
use std::time::Duration;

use super::quote::truncate;
use crate::clients::YahooQuoteClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{MoversService, QuoteService};

pub async fn cmd_movers(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let client = Arc::new(YahooQuoteClient::new(&config.quotes)?);
    let quotes = Arc::new(QuoteService::new(
        client,
        Duration::from_secs(config.quotes.request_timeout_seconds),
    ));
    let movers = MoversService::new(quotes, store, config.quotes.movers.clone());

    let rows = movers.get_movers(None).await?;

    println!("Market movers ({} symbols)", rows.len());
    println!("{:-<71}", "");

    for row in rows {
        println!(
            "{:<8} {:<28} {:>12} {:>10} {:>9}",
            row.symbol,
            truncate(&row.name, 28),
            row.price,
            row.change,
            row.percent_change
        );
    }

    Ok(())
}
