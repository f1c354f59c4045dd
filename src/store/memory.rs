use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{AlertState, Store, StoreError};
use crate::models::{AccessLevel, Alert, NewAlert, NewTrade, Trade, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    alerts: BTreeMap<i64, Alert>,
    trades: BTreeMap<i64, Trade>,
    next_user_id: i64,
    next_alert_id: i64,
    next_trade_id: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Process-local store. Ids start at 1 per collection, like the Mongo counters.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, StoreError> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.telegram_id == telegram_id).cloned())
    }

    async fn insert_user(&self, telegram_id: i64, access_level: AccessLevel) -> Result<User, StoreError> {
        let mut t = self.tables.lock().await;
        if t.users.values().any(|u| u.telegram_id == telegram_id) {
            return Err(StoreError::Duplicate(format!("telegram_id {telegram_id}")));
        }

        let user = User {
            id: next(&mut t.next_user_id),
            telegram_id,
            access_level,
            created_at: Utc::now().timestamp(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_access_level(&self, user_id: i64, level: AccessLevel) -> Result<bool, StoreError> {
        let mut t = self.tables.lock().await;
        match t.users.get_mut(&user_id) {
            Some(u) => {
                u.access_level = level;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert, StoreError> {
        let mut t = self.tables.lock().await;
        let alert = alert.into_alert(next(&mut t.next_alert_id));
        t.alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>, StoreError> {
        let t = self.tables.lock().await;
        Ok(t.alerts.values().filter(|a| a.is_active).cloned().collect())
    }

    async fn delete_alert(&self, user_id: i64, alert_id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.lock().await;
        let owned = t.alerts.get(&alert_id).is_some_and(|a| a.user_id == user_id);
        if owned {
            t.alerts.remove(&alert_id);
        }
        Ok(owned)
    }

    async fn update_alert_state(&self, alert_id: i64, state: AlertState) -> Result<(), StoreError> {
        let mut t = self.tables.lock().await;
        if let Some(a) = t.alerts.get_mut(&alert_id) {
            a.is_active = state.is_active;
            a.triggered = state.triggered;
            a.triggered_at = state.triggered_at;
        }
        Ok(())
    }

    async fn insert_trade(&self, trade: NewTrade) -> Result<Trade, StoreError> {
        let mut t = self.tables.lock().await;
        let trade = trade.into_trade(next(&mut t.next_trade_id));
        t.trades.insert(trade.id, trade.clone());
        Ok(trade)
    }

    async fn trades_for_user(&self, user_id: i64) -> Result<Vec<Trade>, StoreError> {
        let t = self.tables.lock().await;
        let mut trades: Vec<Trade> = t
            .trades
            .values()
            .filter(|tr| tr.user_id == user_id)
            .cloned()
            .collect();
        // ids are already ascending; the stable sort keeps that for equal timestamps
        trades.sort_by_key(|tr| tr.executed_at);
        Ok(trades)
    }

    async fn delete_trade(&self, user_id: i64, trade_id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.lock().await;
        let owned = t.trades.get(&trade_id).is_some_and(|tr| tr.user_id == user_id);
        if owned {
            t.trades.remove(&trade_id);
        }
        Ok(owned)
    }
}
