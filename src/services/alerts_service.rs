use std::{collections::HashMap, str::FromStr, sync::Arc};

use chrono::Utc;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use super::{
    market_data::{Quote, QuoteProvider},
    notifier::Notifier,
};
use crate::{
    error::{Result, ServiceError},
    models::{ensure_positive, normalize_symbol, Alert, AlertCondition, NewAlert},
    store::{AlertState, Store},
};

/// What happens to an alert after it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerPolicy {
    /// Deactivate after the first fire.
    #[default]
    Once,
    /// Stay active; fire again after the price crosses back and re-crosses.
    Rearm,
}

impl FromStr for TriggerPolicy {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "once" => Ok(TriggerPolicy::Once),
            "rearm" => Ok(TriggerPolicy::Rearm),
            other => Err(ServiceError::validation(format!(
                "trigger policy must be 'once' or 'rearm', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertSettings {
    /// Max quote requests in flight during one tick.
    pub fetch_batch_size: usize,
    pub policy: TriggerPolicy,
    pub max_alerts_per_user: usize,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            fetch_batch_size: 10,
            policy: TriggerPolicy::Once,
            max_alerts_per_user: 50,
        }
    }
}

/// Broadcast for every alert that fires.
#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub alert: Alert,
    pub price: f64,
    pub source: String,
}

#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub symbols_checked: usize,
    pub symbols_failed: Vec<String>,
    pub fired: Vec<AlertEvent>,
}

/// Active alerts per user, each list in insertion order.
#[derive(Default)]
struct AlertBook {
    by_user: HashMap<i64, Vec<Alert>>,
}

impl AlertBook {
    fn push(&mut self, alert: Alert) {
        self.by_user.entry(alert.user_id).or_default().push(alert);
    }

    fn remove(&mut self, user_id: i64, alert_id: i64) -> bool {
        let Some(list) = self.by_user.get_mut(&user_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|a| a.id != alert_id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.by_user.remove(&user_id);
        }
        removed
    }

    fn get_mut(&mut self, user_id: i64, alert_id: i64) -> Option<&mut Alert> {
        self.by_user
            .get_mut(&user_id)?
            .iter_mut()
            .find(|a| a.id == alert_id)
    }

    fn count(&self, user_id: i64) -> usize {
        self.by_user.get(&user_id).map(Vec::len).unwrap_or(0)
    }

    fn total(&self) -> usize {
        self.by_user.values().map(Vec::len).sum()
    }

    fn by_symbol(&self) -> HashMap<String, Vec<Alert>> {
        let mut out: HashMap<String, Vec<Alert>> = HashMap::new();
        for a in self.by_user.values().flatten() {
            out.entry(a.symbol.clone()).or_default().push(a.clone());
        }
        out
    }
}

pub struct AlertService {
    store: Arc<dyn Store>,
    quotes: Arc<dyn QuoteProvider>,
    notifier: Arc<dyn Notifier>,
    settings: AlertSettings,
    events_tx: broadcast::Sender<AlertEvent>,
    book: Mutex<AlertBook>,
}

impl AlertService {
    pub fn new(
        store: Arc<dyn Store>,
        quotes: Arc<dyn QuoteProvider>,
        notifier: Arc<dyn Notifier>,
        settings: AlertSettings,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            store,
            quotes,
            notifier,
            settings,
            events_tx,
            book: Mutex::new(AlertBook::default()),
        }
    }

    pub fn settings(&self) -> &AlertSettings {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.events_tx.subscribe()
    }

    /// Replaces the in-memory book with the store's active alerts.
    pub async fn load(&self) -> Result<usize> {
        let alerts = self.store.active_alerts().await?;
        let mut book = self.book.lock().await;
        *book = AlertBook::default();
        for a in alerts {
            book.push(a);
        }
        Ok(book.total())
    }

    pub async fn active_count(&self) -> usize {
        self.book.lock().await.total()
    }

    pub async fn add_alert(
        &self,
        user_id: i64,
        symbol: &str,
        condition: &str,
        threshold: f64,
    ) -> Result<Alert> {
        let symbol = normalize_symbol(symbol)?;
        let condition: AlertCondition = condition.parse()?;
        let threshold = ensure_positive(threshold, "threshold")?;

        let mut book = self.book.lock().await;
        if book.count(user_id) >= self.settings.max_alerts_per_user {
            return Err(ServiceError::validation(format!(
                "alert limit reached ({} active alerts)",
                self.settings.max_alerts_per_user
            )));
        }

        let alert = self
            .store
            .insert_alert(NewAlert {
                user_id,
                symbol,
                condition,
                threshold,
                created_at: Utc::now().timestamp(),
            })
            .await?;
        book.push(alert.clone());
        drop(book);

        tracing::info!(
            user_id,
            alert_id = alert.id,
            symbol = %alert.symbol,
            condition = %alert.condition,
            threshold = alert.threshold,
            "alert added"
        );
        Ok(alert)
    }

    /// Removes one of the user's active alerts. Alerts that already fired and
    /// were deactivated count as missing.
    pub async fn remove_alert(&self, user_id: i64, alert_id: i64) -> Result<()> {
        let mut book = self.book.lock().await;
        if book.get_mut(user_id, alert_id).is_none() {
            return Err(ServiceError::not_found(format!("alert {alert_id} not found")));
        }

        self.store.delete_alert(user_id, alert_id).await?;
        book.remove(user_id, alert_id);
        drop(book);

        tracing::info!(user_id, alert_id, "alert removed");
        Ok(())
    }

    pub async fn get_user_alerts(&self, user_id: i64) -> Vec<Alert> {
        let book = self.book.lock().await;
        book.by_user.get(&user_id).cloned().unwrap_or_default()
    }

    /// One monitoring tick.
    ///
    /// The book lock is held only while snapshotting and while applying
    /// results; quotes are fetched with the lock released, one request per
    /// distinct symbol, at most `fetch_batch_size` at a time.
    pub async fn check_alerts(&self) -> TickReport {
        let by_symbol = self.book.lock().await.by_symbol();
        let mut report = TickReport::default();
        if by_symbol.is_empty() {
            return report;
        }

        let symbols: Vec<String> = by_symbol.keys().cloned().collect();
        report.symbols_checked = symbols.len();

        let results: Vec<(String, Result<Quote>)> = stream::iter(symbols)
            .map(|sym| {
                let quotes = Arc::clone(&self.quotes);
                async move {
                    let res = quotes.quote(&sym).await;
                    (sym, res)
                }
            })
            .buffer_unordered(self.settings.fetch_batch_size.max(1))
            .collect()
            .await;

        let mut prices: Vec<(String, Quote)> = Vec::with_capacity(results.len());
        for (sym, res) in results {
            match res {
                Ok(q) if q.price.is_finite() && q.price > 0.0 => prices.push((sym, q)),
                Ok(q) => {
                    tracing::warn!(symbol = %sym, price = q.price, "unusable price, skipping symbol this tick");
                    report.symbols_failed.push(sym);
                }
                Err(e) => {
                    tracing::warn!(symbol = %sym, error = %e, "price fetch failed, skipping symbol this tick");
                    report.symbols_failed.push(sym);
                }
            }
        }

        let now = Utc::now().timestamp();
        let mut fired: Vec<AlertEvent> = Vec::new();
        let mut rearmed: Vec<Alert> = Vec::new();

        {
            let mut book = self.book.lock().await;

            for (sym, quote) in &prices {
                let Some(group) = by_symbol.get(sym) else {
                    continue;
                };

                for snap in group {
                    // removed while we were fetching
                    let Some(alert) = book.get_mut(snap.user_id, snap.id) else {
                        continue;
                    };

                    if alert.is_met(quote.price) {
                        if !alert.is_armed() {
                            continue;
                        }
                        alert.triggered = true;
                        alert.triggered_at = Some(now);
                        if self.settings.policy == TriggerPolicy::Once {
                            alert.is_active = false;
                        }
                        fired.push(AlertEvent {
                            alert: alert.clone(),
                            price: quote.price,
                            source: quote.source.clone(),
                        });
                    } else if alert.triggered {
                        alert.triggered = false;
                        rearmed.push(alert.clone());
                    }
                }
            }

            if self.settings.policy == TriggerPolicy::Once {
                for ev in &fired {
                    book.remove(ev.alert.user_id, ev.alert.id);
                }
            }
        }

        for alert in &rearmed {
            if let Err(e) = self.store.update_alert_state(alert.id, alert.into()).await {
                tracing::error!(alert_id = alert.id, error = %e, "failed to persist re-armed alert");
            }
            tracing::debug!(alert_id = alert.id, symbol = %alert.symbol, "alert re-armed");
        }

        for ev in &fired {
            let alert = &ev.alert;
            let state: AlertState = alert.into();
            if let Err(e) = self.store.update_alert_state(alert.id, state).await {
                tracing::error!(alert_id = alert.id, error = %e, "failed to persist fired alert");
            }

            tracing::info!(
                user_id = alert.user_id,
                alert_id = alert.id,
                symbol = %alert.symbol,
                price = ev.price,
                "alert fired"
            );

            if let Err(e) = self.notifier.notify(alert.user_id, &alert_message(ev)).await {
                tracing::warn!(user_id = alert.user_id, alert_id = alert.id, error = %e, "alert notification failed");
            }

            let _ = self.events_tx.send(ev.clone());
        }

        report.fired = fired;
        report
    }
}

pub fn alert_message(ev: &AlertEvent) -> String {
    let a = &ev.alert;
    format!(
        "🔔 <b>Price alert</b>\n{} is now {:.2} ({} {:.2})\nAlert #{} via {}",
        a.symbol, ev.price, a.condition, a.threshold, a.id, ev.source
    )
}
