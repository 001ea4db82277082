//! Market-data client for live quotes.
//!
//! [`QuoteSource`] is the seam the services depend on; [`YahooQuoteClient`]
//! implements it against the Yahoo Finance chart endpoint.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::QuotesConfig;

/// Fields read from the provider for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quote provider returned status {0}")]
    Status(u16),

    #[error("Quote lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<RawQuote, QuoteError>;
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
}

/// Parses a chart response body into a [`RawQuote`].
pub(crate) fn parse_chart(symbol: &str, body: &[u8]) -> Result<RawQuote, QuoteError> {
    let envelope: ChartEnvelope =
        serde_json::from_slice(body).map_err(|e| QuoteError::Malformed(e.to_string()))?;

    if let Some(err) = envelope.chart.error {
        debug!(
            "Chart error for {}: {} {}",
            symbol, err.code, err.description
        );
        return Err(QuoteError::UnknownSymbol(symbol.to_string()));
    }

    let meta = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|r| r.meta)
        .ok_or_else(|| QuoteError::UnknownSymbol(symbol.to_string()))?;

    let price = meta
        .regular_market_price
        .ok_or(QuoteError::MissingField("regularMarketPrice"))?;

    Ok(RawQuote {
        name: meta.short_name.or(meta.long_name).unwrap_or_default(),
        price,
        previous_close: meta
            .previous_close
            .or(meta.chart_previous_close)
            .unwrap_or(0.0),
    })
}

#[derive(Clone)]
pub struct YahooQuoteClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl YahooQuoteClient {
    pub fn new(config: &QuotesConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build quote HTTP client: {e}"))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid quote provider URL: {e}"))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, QuoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| QuoteError::Malformed("quote base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", "1d");
        Ok(url)
    }
}

#[async_trait::async_trait]
impl QuoteSource for YahooQuoteClient {
    async fn fetch(&self, symbol: &str) -> Result<RawQuote, QuoteError> {
        let url = self.chart_url(symbol)?;
        debug!("Fetching quote for {}", symbol);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                QuoteError::Timeout(self.timeout)
            } else {
                QuoteError::Http(e)
            }
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        // Unknown symbols come back as 404 with a chart.error payload, so parse before judging the status.
        match parse_chart(symbol, &body) {
            Err(QuoteError::Malformed(_)) if !status.is_success() => {
                Err(QuoteError::Status(status.as_u16()))
            }
            other => other,
        }
    }
}
