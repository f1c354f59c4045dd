pub mod user;
pub mod alert;
pub mod trade;
pub mod position;
pub mod symbol;

pub use user::{AccessLevel, User};
pub use alert::{Alert, AlertCondition, NewAlert};
pub use trade::{NewTrade, Trade, TradeAction};
pub use position::Position;
pub use symbol::{ensure_positive, normalize_symbol, parse_positive};
