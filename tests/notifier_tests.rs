use tradecompanion::services::notifier::{LogNotifier, Notifier};

#[tokio::test]
async fn log_notifier_accepts_html_messages() {
    let notifier = LogNotifier;

    notifier
        .notify(1, "🔔 <b>Price alert</b>\nAAPL is now 160.00")
        .await
        .unwrap();
}
