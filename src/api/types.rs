use serde::Serialize;

use crate::domain::WatchItemId;
use crate::services::quotes::PriceSnapshot;

/// `{"success": true}`
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AddedResponse {
    pub success: bool,
    pub symbol: String,
}

/// One landing-page row; prices are pre-formatted strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoverDto {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub percent_change: String,
    pub already_in_watchlist: bool,
}

impl MoverDto {
    pub fn from_snapshot(snapshot: PriceSnapshot, already_in_watchlist: bool) -> Self {
        Self {
            price: snapshot.formatted_price(),
            change: snapshot.formatted_change(),
            percent_change: snapshot.formatted_percent_change(),
            symbol: snapshot.symbol,
            name: snapshot.name,
            already_in_watchlist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchItemDto {
    pub id: WatchItemId,
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub percent_change: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResultDto {
    pub symbol: String,
    pub name: String,
    pub already_in_watchlist: bool,
}
