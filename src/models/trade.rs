use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeAction {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TradeAction::Buy),
            "sell" => Ok(TradeAction::Sell),
            _ => Err(ServiceError::validation("action must be 'buy' or 'sell'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "_id")]
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
    pub executed_at: i64,
}

impl Trade {
    pub fn total(&self) -> f64 {
        self.quantity * self.price
    }
}

#[derive(Debug, Clone)]
pub struct NewTrade {
    pub user_id: i64,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
    pub executed_at: i64,
}

impl NewTrade {
    pub fn into_trade(self, id: i64) -> Trade {
        Trade {
            id,
            user_id: self.user_id,
            symbol: self.symbol,
            action: self.action,
            quantity: self.quantity,
            price: self.price,
            executed_at: self.executed_at,
        }
    }
}
