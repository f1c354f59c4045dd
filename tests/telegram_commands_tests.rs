use tradecompanion::telegram::commands::{parse, Command, ParseError, USAGE_ALERT, USAGE_REMOVE_ALERT, USAGE_TRADE};

#[test]
fn parses_alert_with_bot_suffix() {
    assert_eq!(
        parse("/alert@TradeCompanionBot AAPL above 150").unwrap(),
        Command::Alert {
            symbol: "AAPL".to_string(),
            condition: "above".to_string(),
            threshold: "150".to_string(),
        }
    );
}

#[test]
fn command_names_are_case_insensitive() {
    assert_eq!(parse("/HELP").unwrap(), Command::Help);
    assert_eq!(parse("  /Start  ").unwrap(), Command::Start);
}

#[test]
fn aliases_map_to_the_same_command() {
    assert_eq!(
        parse("/p msft").unwrap(),
        Command::Price {
            symbol: "msft".to_string()
        }
    );
    assert_eq!(parse("/removealert #12").unwrap(), Command::RemoveAlert { id: 12 });
    assert_eq!(parse("/deletetrade 3").unwrap(), Command::DeleteTrade { id: 3 });
    assert_eq!(parse("/positions").unwrap(), Command::Portfolio);
}

#[test]
fn parses_trade_and_grant() {
    assert_eq!(
        parse("/trade buy TSLA 2 $210.5").unwrap(),
        Command::Trade {
            action: "buy".to_string(),
            symbol: "TSLA".to_string(),
            quantity: "2".to_string(),
            price: "$210.5".to_string(),
        }
    );
    assert_eq!(
        parse("/grant 42 premium").unwrap(),
        Command::Grant {
            telegram_id: 42,
            level: "premium".to_string()
        }
    );
}

#[test]
fn wrong_arity_returns_usage() {
    assert_eq!(parse("/alert AAPL above"), Err(ParseError::Usage(USAGE_ALERT)));
    assert_eq!(parse("/trade buy AAPL"), Err(ParseError::Usage(USAGE_TRADE)));
    assert_eq!(parse("/remove_alert abc"), Err(ParseError::Usage(USAGE_REMOVE_ALERT)));
    assert_eq!(
        ParseError::Usage(USAGE_ALERT).to_string(),
        "Usage: /alert SYMBOL above|below PRICE"
    );
}

#[test]
fn plain_text_and_unknown_commands() {
    assert_eq!(parse("hello there"), Err(ParseError::NotACommand));
    assert_eq!(parse("/frobnicate"), Err(ParseError::Unknown("frobnicate".to_string())));
}
