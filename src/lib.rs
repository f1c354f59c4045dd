//! Library entrypoint for TradeCompanion.
//!
//! Everything the binary wires together lives here so integration tests under
//! `tests/` can build an [`AppState`] around in-memory fakes.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub mod services;
pub mod telegram;

pub mod controllers;
pub mod routes;

use services::{
    alerts_service::AlertService,
    market_data::{MarketDataService, QuoteProvider},
    notifier::Notifier,
    rate_limiter::RateLimiter,
    trade_service::TradeService,
    user_service::UserService,
};
use store::Store;

/// Shared handles injected into HTTP handlers, the command dispatcher and the
/// alert monitor.
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: Arc<dyn Store>,
    pub market: Arc<dyn QuoteProvider>,
    pub alerts: Arc<AlertService>,
    pub trades: Arc<TradeService>,
    pub users: Arc<UserService>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Builds every service around the given store, quote source and notifier.
    pub fn build(
        settings: config::Settings,
        store: Arc<dyn Store>,
        market: Arc<dyn QuoteProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let alerts = Arc::new(AlertService::new(
            store.clone(),
            market.clone(),
            notifier,
            settings.alert_settings(),
        ));
        let trades = Arc::new(TradeService::new(store.clone(), market.clone()));
        let users = Arc::new(UserService::new(
            store.clone(),
            settings.admin_telegram_ids.iter().copied(),
        ));
        let limiter = Arc::new(RateLimiter::new(settings.rate_limits()));

        Self {
            settings,
            store,
            market,
            alerts,
            trades,
            users,
            limiter,
        }
    }
}

/// Market data service wired from settings: Finnhub first when a key is set,
/// Yahoo as the keyless fallback.
pub fn market_data_from_settings(settings: &config::Settings) -> MarketDataService {
    let mut providers: Vec<Arc<dyn QuoteProvider>> = Vec::new();

    let finnhub = services::finnhub::FinnhubClient::new(settings.finnhub_api_key.clone());
    if finnhub.has_key() {
        providers.push(Arc::new(finnhub));
    } else {
        tracing::warn!("FINNHUB_API_KEY not set, using Yahoo Finance only");
    }
    providers.push(Arc::new(services::yahoo::YahooClient::new()));

    MarketDataService::new(providers, settings.quote_cache_ttl())
}
