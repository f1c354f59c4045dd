use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
        }
    }

    /// Whether `price` satisfies this condition against `threshold`.
    /// Touching the threshold counts as a cross.
    pub fn is_met(self, price: f64, threshold: f64) -> bool {
        match self {
            AlertCondition::Above => price >= threshold,
            AlertCondition::Below => price <= threshold,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertCondition {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "above" | ">" | ">=" => Ok(AlertCondition::Above),
            "below" | "<" | "<=" => Ok(AlertCondition::Below),
            other => Err(ServiceError::validation(format!(
                "condition must be 'above' or 'below', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: i64,

    pub user_id: i64,
    pub symbol: String,

    pub condition: AlertCondition,
    pub threshold: f64,

    pub is_active: bool,

    // latched after a fire until the price crosses back (rearm policy)
    #[serde(default)]
    pub triggered: bool,

    pub created_at: i64,

    #[serde(default)]
    pub triggered_at: Option<i64>,
}

impl Alert {
    /// Armed alerts are the only ones allowed to fire.
    pub fn is_armed(&self) -> bool {
        self.is_active && !self.triggered
    }

    pub fn is_met(&self, price: f64) -> bool {
        self.condition.is_met(price, self.threshold)
    }
}

/// Fields of an alert before the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub user_id: i64,
    pub symbol: String,
    pub condition: AlertCondition,
    pub threshold: f64,
    pub created_at: i64,
}

impl NewAlert {
    pub fn into_alert(self, id: i64) -> Alert {
        Alert {
            id,
            user_id: self.user_id,
            symbol: self.symbol,
            condition: self.condition,
            threshold: self.threshold,
            is_active: true,
            triggered: false,
            created_at: self.created_at,
            triggered_at: None,
        }
    }
}
