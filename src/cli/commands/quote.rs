//! Quote command handler

use std::sync::Arc;
use std::time::Duration;

use crate::clients::YahooQuoteClient;
use crate::config::Config;
use crate::domain::Symbol;
use crate::services::QuoteService;

pub async fn cmd_quote(config: &Config, raw_symbols: &[String]) -> anyhow::Result<()> {
    let symbols: Vec<Symbol> = raw_symbols
        .iter()
        .filter_map(|raw| Symbol::parse(raw).ok())
        .collect();

    if symbols.is_empty() {
        println!("No symbols given.");
        println!("Usage: stockwatch quote AAPL MSFT");
        return Ok(());
    }

    let client = Arc::new(YahooQuoteClient::new(&config.quotes)?);
    let quotes = QuoteService::new(
        client,
        Duration::from_secs(config.quotes.request_timeout_seconds),
    );

    let snapshots = quotes.lookup_many(&symbols).await;

    println!(
        "{:<8} {:<28} {:>12} {:>10} {:>9}",
        "SYMBOL", "NAME", "PRICE", "CHANGE", "%"
    );
    println!("{:-<71}", "");

    for snapshot in snapshots {
        let marker = if snapshot.available { "" } else { "  (unavailable)" };
        println!(
            "{:<8} {:<28} {:>12} {:>10} {:>9}{}",
            snapshot.symbol,
            truncate(&snapshot.name, 28),
            snapshot.formatted_price(),
            snapshot.formatted_change(),
            snapshot.formatted_percent_change(),
            marker
        );
    }

    Ok(())
}

pub(super) fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_keeps_short_names() {
        assert_eq!(truncate("Apple Inc.", 28), "Apple Inc.");
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Alphabet Inc. Class C", 8), "Alphabe…");
    }
}
