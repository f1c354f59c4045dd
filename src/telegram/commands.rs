use thiserror::Error;

pub const USAGE_PRICE: &str = "/price SYMBOL";
pub const USAGE_ALERT: &str = "/alert SYMBOL above|below PRICE";
pub const USAGE_REMOVE_ALERT: &str = "/remove_alert ID";
pub const USAGE_TRADE: &str = "/trade buy|sell SYMBOL QUANTITY PRICE";
pub const USAGE_DELETE_TRADE: &str = "/delete_trade ID";
pub const USAGE_GRANT: &str = "/grant TELEGRAM_ID basic|premium|admin";

/// A chat command with its raw arguments. Values are validated by the services.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Price { symbol: String },
    Alert { symbol: String, condition: String, threshold: String },
    Alerts,
    RemoveAlert { id: i64 },
    Trade { action: String, symbol: String, quantity: String, price: String },
    Trades,
    DeleteTrade { id: i64 },
    Portfolio,
    Grant { telegram_id: i64, level: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("not a command")]
    NotACommand,

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown command /{0}. Use /help to see what I can do.")]
    Unknown(String),
}

fn parse_id(raw: &str, usage: &'static str) -> Result<i64, ParseError> {
    raw.trim_start_matches('#')
        .parse()
        .map_err(|_| ParseError::Usage(usage))
}

/// Parses `/name[@bot] args...`. Plain text is [`ParseError::NotACommand`].
pub fn parse(text: &str) -> Result<Command, ParseError> {
    let text = text.trim();
    let Some(body) = text.strip_prefix('/') else {
        return Err(ParseError::NotACommand);
    };

    let mut parts = body.split_whitespace();
    let head = parts.next().unwrap_or_default();
    // "/alert@MyBot" in group chats
    let name = head.split('@').next().unwrap_or(head).to_lowercase();
    let args: Vec<&str> = parts.collect();

    match (name.as_str(), args.as_slice()) {
        ("start", _) => Ok(Command::Start),
        ("help", _) => Ok(Command::Help),

        ("price" | "p", [symbol]) => Ok(Command::Price {
            symbol: symbol.to_string(),
        }),
        ("price" | "p", _) => Err(ParseError::Usage(USAGE_PRICE)),

        ("alert", [symbol, condition, threshold]) => Ok(Command::Alert {
            symbol: symbol.to_string(),
            condition: condition.to_string(),
            threshold: threshold.to_string(),
        }),
        ("alert", _) => Err(ParseError::Usage(USAGE_ALERT)),

        ("alerts", _) => Ok(Command::Alerts),

        ("remove_alert" | "removealert", [id]) => Ok(Command::RemoveAlert {
            id: parse_id(id, USAGE_REMOVE_ALERT)?,
        }),
        ("remove_alert" | "removealert", _) => Err(ParseError::Usage(USAGE_REMOVE_ALERT)),

        ("trade", [action, symbol, quantity, price]) => Ok(Command::Trade {
            action: action.to_string(),
            symbol: symbol.to_string(),
            quantity: quantity.to_string(),
            price: price.to_string(),
        }),
        ("trade", _) => Err(ParseError::Usage(USAGE_TRADE)),

        ("trades", _) => Ok(Command::Trades),

        ("delete_trade" | "deletetrade", [id]) => Ok(Command::DeleteTrade {
            id: parse_id(id, USAGE_DELETE_TRADE)?,
        }),
        ("delete_trade" | "deletetrade", _) => Err(ParseError::Usage(USAGE_DELETE_TRADE)),

        ("portfolio" | "positions", _) => Ok(Command::Portfolio),

        ("grant", [telegram_id, level]) => Ok(Command::Grant {
            telegram_id: parse_id(telegram_id, USAGE_GRANT)?,
            level: level.to_string(),
        }),
        ("grant", _) => Err(ParseError::Usage(USAGE_GRANT)),

        _ => Err(ParseError::Unknown(name)),
    }
}
