use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time};

use super::alerts_service::AlertService;

/// Spawns the background task that drives [`AlertService::check_alerts`].
pub fn spawn_price_alert_monitor(alerts: Arc<AlertService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        tracing::info!(interval_secs = every.as_secs_f64(), "alert monitor started");

        loop {
            interval.tick().await;

            let report = alerts.check_alerts().await;

            if !report.fired.is_empty() {
                tracing::info!(fired = report.fired.len(), "alert monitor tick");
            }
            tracing::debug!(
                symbols = report.symbols_checked,
                failed = report.symbols_failed.len(),
                fired = report.fired.len(),
                "alert monitor tick"
            );
        }
    })
}
