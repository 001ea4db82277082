use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::clients::{QuoteSource, YahooQuoteClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, MoversService, QuoteService, SeaOrmAuthService, SeaOrmWatchlistService,
    WatchlistService,
};

mod assets;
pub mod auth;
mod error;
mod observability;
mod pages;
mod search;
pub mod types;
mod validation;
mod watchlist;

pub use auth::AuthUser;
pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub auth: Arc<dyn AuthService>,

    pub watchlist: Arc<dyn WatchlistService>,

    pub movers: Arc<MoversService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

/// Wires services over an explicit quote source; tests pass a stub here.
pub async fn create_app_state(
    config: Config,
    quote_source: Arc<dyn QuoteSource>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let quotes = Arc::new(QuoteService::new(
        quote_source,
        Duration::from_secs(config.quotes.request_timeout_seconds),
    ));

    let auth: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.security.clone(),
    ));
    let watchlist: Arc<dyn WatchlistService> =
        Arc::new(SeaOrmWatchlistService::new(store.clone(), quotes.clone()));
    let movers = Arc::new(MoversService::new(
        quotes,
        store,
        config.quotes.movers.clone(),
    ));

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        auth,
        watchlist,
        movers,
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let client: Arc<dyn QuoteSource> = Arc::new(YahooQuoteClient::new(&config.quotes)?);
    create_app_state(config, client, prometheus_handle).await
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let cors_layer = if server.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
    };

    let api_router = Router::new()
        .merge(create_protected_router(state.clone()))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/search", get(search::search_symbol))
        .route("/movers", get(search::list_movers));

    Router::new()
        .route("/", get(pages::index))
        .route("/dashboard", get(pages::dashboard))
        .route("/static/{*path}", get(assets::serve_static))
        .route("/metrics", get(observability::get_metrics))
        .nest("/api", api_router)
        .with_state(state)
        .layer(session_layer)
        .layer(cors_layer)
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/logout", post(auth::logout))
        .route(
            "/watchlist",
            get(watchlist::list_watchlist).post(watchlist::add_to_watchlist),
        )
        .route("/watchlist/{id}", delete(watchlist::remove_from_watchlist))
        .route_layer(middleware::from_fn_with_state(state, auth::require_user))
}
