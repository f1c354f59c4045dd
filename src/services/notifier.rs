use async_trait::async_trait;

use crate::error::Result;

/// Delivers a text message to a user. Delivery is best effort.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: i64, message: &str) -> Result<()>;
}

/// Used when no Telegram token is configured: messages only reach the log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user_id: i64, message: &str) -> Result<()> {
        tracing::info!(user_id, text = message, "notification (log only)");
        Ok(())
    }
}
