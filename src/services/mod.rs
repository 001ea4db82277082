pub mod quotes;
pub use quotes::{PriceSnapshot, QuoteService};

pub mod movers;
pub use movers::MoversService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod watchlist_service;
pub mod watchlist_service_impl;
pub use watchlist_service::{WatchlistError, WatchlistService};
pub use watchlist_service_impl::SeaOrmWatchlistService;
