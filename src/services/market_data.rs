//! Quote lookup across upstream providers.
//!
//! [`MarketDataService`] tries each configured provider in order and keeps the
//! last good quote per symbol for a short TTL, so a chat burst of `/price AAPL`
//! or a monitor tick right after a lookup does not hit the upstream again.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    error::{Result, ServiceError},
    models::normalize_symbol,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub source: String,
}

/// One upstream market-data source.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Current price for an already-normalised symbol.
    async fn quote(&self, symbol: &str) -> Result<Quote>;
}

pub struct MarketDataService {
    providers: Vec<Arc<dyn QuoteProvider>>,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, (Instant, Quote)>>,
}

impl MarketDataService {
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>, cache_ttl: Duration) -> Self {
        Self {
            providers,
            cache_ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn cached_symbols(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn cached(&self, symbol: &str) -> Option<Quote> {
        if self.cache_ttl.is_zero() {
            return None;
        }
        let cache = self.cache.lock().await;
        cache
            .get(symbol)
            .filter(|(at, _)| at.elapsed() < self.cache_ttl)
            .map(|(_, q)| q.clone())
    }

    async fn fetch(&self, symbol: &str) -> Result<Quote> {
        let mut failures: Vec<String> = Vec::new();

        for provider in &self.providers {
            match provider.quote(symbol).await {
                Ok(q) if q.price.is_finite() && q.price > 0.0 => return Ok(q),
                Ok(q) => failures.push(format!("{}: bad price {}", provider.name(), q.price)),
                Err(e) => {
                    tracing::debug!(symbol, provider = provider.name(), error = %e, "quote provider failed");
                    failures.push(format!("{}: {e}", provider.name()));
                }
            }
        }

        if failures.is_empty() {
            return Err(ServiceError::upstream(format!(
                "no quote providers configured for {symbol}"
            )));
        }

        Err(ServiceError::upstream(format!(
            "{symbol} ({})",
            failures.join("; ")
        )))
    }
}

#[async_trait]
impl QuoteProvider for MarketDataService {
    fn name(&self) -> &str {
        "market-data"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let sym = normalize_symbol(symbol)?;

        if let Some(q) = self.cached(&sym).await {
            return Ok(q);
        }

        let quote = self.fetch(&sym).await?;

        if !self.cache_ttl.is_zero() {
            let ttl = self.cache_ttl;
            let mut cache = self.cache.lock().await;
            cache.retain(|_, (at, _)| at.elapsed() < ttl);
            cache.insert(sym, (Instant::now(), quote.clone()));
        }

        Ok(quote)
    }
}
