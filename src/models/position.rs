use serde::Serialize;

/// Net holding in one symbol, derived from the trade journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub symbol: String,

    pub quantity: f64,
    pub avg_price: f64,

    pub last_price: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
}
