mod common;

use std::{sync::Arc, time::Duration};

use common::ScriptedQuotes;
use tradecompanion::{
    error::ServiceError,
    services::market_data::{MarketDataService, QuoteProvider},
};

fn service(providers: Vec<Arc<ScriptedQuotes>>, ttl: Duration) -> MarketDataService {
    MarketDataService::new(
        providers
            .into_iter()
            .map(|p| p as Arc<dyn QuoteProvider>)
            .collect(),
        ttl,
    )
}

#[tokio::test]
async fn falls_back_to_next_provider() {
    let primary = Arc::new(ScriptedQuotes::new());
    primary.fail("AAPL");
    let secondary = Arc::new(ScriptedQuotes::new());
    secondary.set("AAPL", 187.5);

    let market = service(vec![primary.clone(), secondary.clone()], Duration::ZERO);
    let q = market.quote("aapl").await.unwrap();

    assert_eq!(q.symbol, "AAPL");
    assert_eq!(q.price, 187.5);
    assert_eq!(primary.calls("AAPL"), 1);
    assert_eq!(secondary.calls("AAPL"), 1);
}

#[tokio::test]
async fn zero_price_is_treated_as_failure() {
    let primary = Arc::new(ScriptedQuotes::new());
    primary.set("AAPL", 0.0);
    let secondary = Arc::new(ScriptedQuotes::new());
    secondary.set("AAPL", 10.0);

    let market = service(vec![primary, secondary], Duration::ZERO);
    assert_eq!(market.quote("AAPL").await.unwrap().price, 10.0);
}

#[tokio::test]
async fn all_providers_failing_is_upstream_error() {
    let a = Arc::new(ScriptedQuotes::new());
    let b = Arc::new(ScriptedQuotes::new());
    a.fail("AAPL");
    b.fail("AAPL");

    let market = service(vec![a, b], Duration::ZERO);
    let err = market.quote("AAPL").await.unwrap_err();

    assert!(matches!(err, ServiceError::Upstream(_)));
    assert!(err.to_string().contains("AAPL"));
}

#[tokio::test]
async fn invalid_symbol_never_reaches_providers() {
    let p = Arc::new(ScriptedQuotes::new());
    let market = service(vec![p.clone()], Duration::ZERO);

    let err = market.quote("$$$").await.unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(p.total_calls(), 0);
}

#[tokio::test]
async fn quotes_are_cached_for_the_ttl() {
    let p = Arc::new(ScriptedQuotes::new());
    p.set("AAPL", 100.0);
    let market = service(vec![p.clone()], Duration::from_secs(60));

    market.quote("AAPL").await.unwrap();
    p.set("AAPL", 120.0);
    let cached = market.quote("aapl").await.unwrap();

    assert_eq!(cached.price, 100.0);
    assert_eq!(p.calls("AAPL"), 1);

    market.clear_cache().await;
    assert_eq!(market.quote("AAPL").await.unwrap().price, 120.0);
    assert_eq!(p.calls("AAPL"), 2);
}

#[tokio::test]
async fn zero_ttl_disables_cache() {
    let p = Arc::new(ScriptedQuotes::new());
    p.set("AAPL", 100.0);
    let market = service(vec![p.clone()], Duration::ZERO);

    market.quote("AAPL").await.unwrap();
    market.quote("AAPL").await.unwrap();

    assert_eq!(p.calls("AAPL"), 2);
}

#[test]
fn provider_names_keep_order() {
    let market = service(
        vec![Arc::new(ScriptedQuotes::new()), Arc::new(ScriptedQuotes::new())],
        Duration::ZERO,
    );
    assert_eq!(market.provider_names(), vec!["scripted", "scripted"]);
}

#[tokio::test]
async fn stale_quotes_are_evicted() {
    let p = Arc::new(ScriptedQuotes::new());
    p.set("AAPL", 100.0);
    p.set("MSFT", 200.0);
    let market = service(vec![p.clone()], Duration::from_millis(50));

    market.quote("AAPL").await.unwrap();
    assert_eq!(market.cached_symbols().await, 1);

    tokio::time::sleep(Duration::from_millis(80)).await;
    market.quote("MSFT").await.unwrap();

    assert_eq!(market.cached_symbols().await, 1);
}
