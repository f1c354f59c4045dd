use std::sync::Arc;

use super::{
    commands::{self, Command, ParseError},
    format,
};
use crate::{
    error::Result,
    models::{normalize_symbol, parse_positive, AccessLevel},
    services::{
        alerts_service::AlertService, market_data::QuoteProvider, rate_limiter::RateLimiter,
        trade_service::TradeService, user_service::UserService,
    },
    AppState,
};

/// Routes chat commands to the services it was built with.
#[derive(Clone)]
pub struct CommandDispatcher {
    users: Arc<UserService>,
    alerts: Arc<AlertService>,
    trades: Arc<TradeService>,
    quotes: Arc<dyn QuoteProvider>,
    limiter: Arc<RateLimiter>,
}

impl CommandDispatcher {
    pub fn new(
        users: Arc<UserService>,
        alerts: Arc<AlertService>,
        trades: Arc<TradeService>,
        quotes: Arc<dyn QuoteProvider>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            users,
            alerts,
            trades,
            quotes,
            limiter,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.users.clone(),
            state.alerts.clone(),
            state.trades.clone(),
            state.market.clone(),
            state.limiter.clone(),
        )
    }

    /// Reply for one incoming message, or `None` when it is not a command.
    /// Failures come back as a user-facing reply, never as an error.
    pub async fn handle(&self, telegram_id: i64, text: &str) -> Option<String> {
        let cmd = match commands::parse(text) {
            Ok(cmd) => cmd,
            Err(ParseError::NotACommand) => return None,
            Err(e) => return Some(format!("❌ {}", format::esc(&e.to_string()))),
        };

        match self.execute(telegram_id, cmd).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::debug!(telegram_id, error = %e, "command failed");
                Some(format::error(&e))
            }
        }
    }

    async fn execute(&self, telegram_id: i64, cmd: Command) -> Result<String> {
        let user = self.users.get_or_create(telegram_id).await?;
        self.limiter.check(user.id, user.access_level).await?;

        match cmd {
            Command::Start => Ok(format::welcome()),
            Command::Help => Ok(format::help()),

            Command::Price { symbol } => {
                let q = self.quotes.quote(&normalize_symbol(&symbol)?).await?;
                Ok(format::quote(&q))
            }

            Command::Alert {
                symbol,
                condition,
                threshold,
            } => {
                let threshold = parse_positive(&threshold, "threshold")?;
                let alert = self
                    .alerts
                    .add_alert(user.id, &symbol, &condition, threshold)
                    .await?;
                Ok(format::alert_created(&alert))
            }

            Command::Alerts => {
                let list = self.alerts.get_user_alerts(user.id).await;
                Ok(format::alerts(&list))
            }

            Command::RemoveAlert { id } => {
                self.alerts.remove_alert(user.id, id).await?;
                Ok(format!("🗑 Alert #{id} removed"))
            }

            Command::Trade {
                action,
                symbol,
                quantity,
                price,
            } => {
                let quantity = parse_positive(&quantity, "quantity")?;
                let price = parse_positive(&price, "price")?;
                let trade = self
                    .trades
                    .create_trade(user.id, &symbol, &action, quantity, price)
                    .await?;
                Ok(format::trade_created(&trade))
            }

            Command::Trades => {
                let list = self.trades.list_trades(user.id).await?;
                Ok(format::trades(&list))
            }

            Command::DeleteTrade { id } => {
                self.trades.delete_trade(user.id, id).await?;
                Ok(format!("🗑 Trade #{id} deleted"))
            }

            Command::Portfolio => {
                let list = self.trades.positions(user.id).await?;
                Ok(format::positions(&list))
            }

            Command::Grant { telegram_id: target, level } => {
                let level: AccessLevel = level.parse()?;
                let updated = self
                    .users
                    .set_access_level(telegram_id, target, level)
                    .await?;
                Ok(format!(
                    "✅ {} now has {} access",
                    updated.telegram_id, updated.access_level
                ))
            }
        }
    }
}
