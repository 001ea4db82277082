//! Quote lookup adapter.
//!
//! Wraps a [`QuoteSource`] so callers always get a [`PriceSnapshot`]: any
//! provider failure, including a timeout, becomes a zero-valued snapshot and
//! is logged instead of propagated.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::quotes::{QuoteError, QuoteSource, RawQuote};

/// Rendered when the previous close is zero or the lookup failed.
pub const ZERO_PERCENT: &str = "0%";

/// A point-in-time price for one symbol. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
    /// False when the provider could not be reached or did not know the symbol.
    pub available: bool,
}

impl PriceSnapshot {
    #[must_use]
    pub fn unavailable(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: String::new(),
            price: 0.0,
            previous_close: 0.0,
            available: false,
        }
    }

    #[must_use]
    pub fn from_lookup(symbol: &str, lookup: Result<RawQuote, QuoteError>) -> Self {
        match lookup {
            Ok(raw) => Self {
                symbol: symbol.to_string(),
                name: raw.name,
                price: raw.price,
                previous_close: raw.previous_close,
                available: true,
            },
            Err(_) => Self::unavailable(symbol),
        }
    }

    #[must_use]
    pub fn change(&self) -> f64 {
        self.price - self.previous_close
    }

    #[must_use]
    pub fn formatted_price(&self) -> String {
        format_money(self.price)
    }

    #[must_use]
    pub fn formatted_change(&self) -> String {
        format_money(self.change())
    }

    #[must_use]
    pub fn formatted_percent_change(&self) -> String {
        if !self.available {
            return ZERO_PERCENT.to_string();
        }
        format_percent_change(self.price, self.previous_close)
    }
}

/// Two decimal places, e.g. `5` -> `"5.00"`.
#[must_use]
pub fn format_money(value: f64) -> String {
    format!("{value:.2}")
}

#[must_use]
pub fn format_percent_change(price: f64, previous_close: f64) -> String {
    if previous_close.abs() < f64::EPSILON {
        return ZERO_PERCENT.to_string();
    }
    let percent = (price - previous_close) / previous_close * 100.0;
    format!("{percent:.2}%")
}

pub struct QuoteService {
    source: Arc<dyn QuoteSource>,
    timeout: Duration,
}

impl QuoteService {
    #[must_use]
    pub fn new(source: Arc<dyn QuoteSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Looks up one symbol. Never fails; see [`PriceSnapshot::unavailable`].
    pub async fn lookup(&self, symbol: &str) -> PriceSnapshot {
        let lookup = match tokio::time::timeout(self.timeout, self.source.fetch(symbol)).await {
            Ok(result) => result,
            Err(_) => Err(QuoteError::Timeout(self.timeout)),
        };

        match &lookup {
            Ok(raw) => {
                metrics::counter!("quote_lookups_total", "outcome" => "ok").increment(1);
                debug!(symbol, price = raw.price, "Quote fetched");
            }
            Err(e) => {
                metrics::counter!("quote_lookups_total", "outcome" => "failed").increment(1);
                warn!(symbol, error = %e, "Quote lookup failed, using zero quote");
            }
        }

        PriceSnapshot::from_lookup(symbol, lookup)
    }

    /// Looks up several symbols concurrently; the result order matches `symbols`.
    pub async fn lookup_many<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<PriceSnapshot> {
        join_all(symbols.iter().map(|s| self.lookup(s.as_ref()))).await
    }
}
