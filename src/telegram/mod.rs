//! Telegram surface: command parsing and dispatch, Bot API long polling, and
//! the notifier the alert monitor delivers through.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    error::{Result, ServiceError},
    services::notifier::Notifier,
    store::Store,
};

pub mod client;
pub mod commands;
pub mod dispatcher;
pub mod format;

pub use client::TelegramClient;
pub use dispatcher::CommandDispatcher;

/// Sends alert notifications to the user's private chat.
pub struct TelegramNotifier {
    client: TelegramClient,
    store: Arc<dyn Store>,
}

impl TelegramNotifier {
    pub fn new(client: TelegramClient, store: Arc<dyn Store>) -> Self {
        Self { client, store }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, user_id: i64, message: &str) -> Result<()> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("user {user_id} not found")))?;

        // private chat id == telegram user id
        self.client.send_message(user.telegram_id, message).await
    }
}

/// Long-polls the Bot API and answers every command in its chat. Runs forever.
pub async fn run_polling(client: TelegramClient, dispatcher: CommandDispatcher) {
    tracing::info!("starting Telegram command listener");

    let mut offset: i64 = 0;

    loop {
        let updates = match client
            .get_updates(offset, TelegramClient::POLL_TIMEOUT_SECS)
            .await
        {
            Ok(u) => u,
            Err(e) => {
                tracing::error!(error = %e, "failed to poll Telegram updates");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(msg) = update.message else {
                continue;
            };
            let (Some(from), Some(text)) = (msg.from.as_ref(), msg.text.as_deref()) else {
                continue;
            };

            let Some(reply) = dispatcher.handle(from.id, text).await else {
                continue;
            };

            if let Err(e) = client.send_message(msg.chat.id, &reply).await {
                tracing::warn!(chat_id = msg.chat.id, error = %e, "failed to send Telegram reply");
            }
        }
    }
}
