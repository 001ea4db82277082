pub mod quotes;

pub use quotes::{QuoteError, QuoteSource, RawQuote, YahooQuoteClient};
