#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use tradecompanion::{
    config::Settings,
    error::{Result, ServiceError},
    services::{
        market_data::{Quote, QuoteProvider},
        notifier::Notifier,
    },
    store::{MemoryStore, Store},
    AppState,
};

/// Quote source with prices set by the test. Counts calls per symbol.
#[derive(Default)]
pub struct ScriptedQuotes {
    prices: Mutex<HashMap<String, f64>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set(&self, symbol: &str, price: f64) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }

    pub fn fail(&self, symbol: &str) {
        self.failing.lock().unwrap().insert(symbol.to_string());
    }

    pub fn recover(&self, symbol: &str) {
        self.failing.lock().unwrap().remove(symbol);
    }

    /// Most quote calls that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self, symbol: &str) -> usize {
        self.calls.lock().unwrap().get(symbol).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl QuoteProvider for ScriptedQuotes {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        *self.calls.lock().unwrap().entry(symbol.to_string()).or_default() += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(symbol) {
            return Err(ServiceError::upstream(format!("{symbol} unavailable")));
        }

        let price = self
            .prices
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| ServiceError::upstream(format!("no price for {symbol}")))?;

        Ok(Quote {
            symbol: symbol.to_string(),
            price,
            change: 0.0,
            change_percent: 0.0,
            source: "scripted".to_string(),
        })
    }
}

/// Keeps every notification in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user_id: i64, message: &str) -> Result<()> {
        self.sent.lock().unwrap().push((user_id, message.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub quotes: Arc<ScriptedQuotes>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn test_app_with(settings: Settings) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let quotes = Arc::new(ScriptedQuotes::new());
    let notifier = Arc::new(RecordingNotifier::default());

    let state = AppState::build(
        settings,
        store.clone() as Arc<dyn Store>,
        quotes.clone() as Arc<dyn QuoteProvider>,
        notifier.clone() as Arc<dyn Notifier>,
    );

    TestApp {
        state,
        store,
        quotes,
        notifier,
    }
}

pub fn test_app() -> TestApp {
    test_app_with(Settings::default())
}
