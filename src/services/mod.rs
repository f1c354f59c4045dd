pub mod db_init;
pub mod finnhub;
pub mod yahoo;
pub mod market_data;
pub mod notifier;
pub mod alert_monitor;

pub mod alerts_service;
pub mod trade_service;
pub mod user_service;
pub mod rate_limiter;
