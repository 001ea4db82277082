//! CLI module - Command-line interface for stockwatch
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// stockwatch - personal stock watchlist with live quotes
#[derive(Parser)]
#[command(name = "stockwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web", alias = "s")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Print live quotes for one or more symbols
    #[command(alias = "q")]
    Quote {
        /// Ticker symbols, e.g. AAPL MSFT
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Print the market movers table
    #[command(alias = "m")]
    Movers,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["stockwatch"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn quote_takes_many_symbols() {
        let cli = Cli::try_parse_from(["stockwatch", "quote", "aapl", "msft"]).unwrap();
        match cli.command {
            Some(Commands::Quote { symbols }) => assert_eq!(symbols, vec!["aapl", "msft"]),
            _ => panic!("expected quote command"),
        }
    }

    #[test]
    fn quote_requires_a_symbol() {
        assert!(Cli::try_parse_from(["stockwatch", "quote"]).is_err());
    }

    #[test]
    fn aliases_resolve() {
        let cli = Cli::try_parse_from(["stockwatch", "m"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Movers)));

        let cli = Cli::try_parse_from(["stockwatch", "web"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }
}
