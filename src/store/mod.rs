//! Persistence for users, alerts and trades.
//!
//! Services only see [`Store`]. Production runs on [`MongoStore`]; tests and
//! database-less dev runs use [`MemoryStore`].

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AccessLevel, Alert, NewAlert, NewTrade, Trade, User};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("duplicate key: {0}")]
    Duplicate(String),
}

/// State written back after the monitor evaluates an alert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertState {
    pub is_active: bool,
    pub triggered: bool,
    pub triggered_at: Option<i64>,
}

impl From<&Alert> for AlertState {
    fn from(a: &Alert) -> Self {
        Self {
            is_active: a.is_active,
            triggered: a.triggered,
            triggered_at: a.triggered_at,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    // users
    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, StoreError>;
    async fn insert_user(&self, telegram_id: i64, access_level: AccessLevel) -> Result<User, StoreError>;
    async fn set_access_level(&self, user_id: i64, level: AccessLevel) -> Result<bool, StoreError>;

    // alerts
    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert, StoreError>;
    /// Active alerts across all users, oldest first.
    async fn active_alerts(&self) -> Result<Vec<Alert>, StoreError>;
    /// Returns false when the user owns no alert with that id.
    async fn delete_alert(&self, user_id: i64, alert_id: i64) -> Result<bool, StoreError>;
    async fn update_alert_state(&self, alert_id: i64, state: AlertState) -> Result<(), StoreError>;

    // trades
    async fn insert_trade(&self, trade: NewTrade) -> Result<Trade, StoreError>;
    /// A user's trades ordered by execution time.
    async fn trades_for_user(&self, user_id: i64) -> Result<Vec<Trade>, StoreError>;
    async fn delete_trade(&self, user_id: i64, trade_id: i64) -> Result<bool, StoreError>;
}
