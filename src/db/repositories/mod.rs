pub mod user;
pub mod watchlist;
