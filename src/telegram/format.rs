use chrono::DateTime;

use crate::{
    error::ServiceError,
    models::{Alert, Position, Trade},
    services::market_data::Quote,
};

pub fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn fmt_ts(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn fmt_qty(q: f64) -> String {
    if q.fract() == 0.0 {
        format!("{q:.0}")
    } else {
        format!("{q}")
    }
}

pub fn help() -> String {
    r#"<b>TradeCompanion</b>

<b>Market</b>
/price SYMBOL - current price

<b>Alerts</b>
/alert SYMBOL above|below PRICE - watch a price
/alerts - your active alerts
/remove_alert ID - stop watching

<b>Journal</b>
/trade buy|sell SYMBOL QUANTITY PRICE - record a trade
/trades - your trades
/delete_trade ID - remove a trade
/portfolio - open positions

<b>Admin</b>
/grant TELEGRAM_ID basic|premium|admin - change access level

/help - this message"#
        .to_string()
}

pub fn welcome() -> String {
    format!("👋 Welcome! I watch prices and keep your trade journal.\n\n{}", help())
}

pub fn error(e: &ServiceError) -> String {
    match e {
        ServiceError::Store(_) => "❌ Something went wrong on our side. Please try again.".to_string(),
        ServiceError::Upstream(_) => "❌ Market data is unavailable right now. Please try again later.".to_string(),
        other => format!("❌ {}", esc(&other.to_string())),
    }
}

pub fn quote(q: &Quote) -> String {
    let arrow = if q.change >= 0.0 { "📈" } else { "📉" };
    format!(
        "{arrow} <b>{}</b> {:.2}\nChange: {:+.2} ({:+.2}%)\nSource: {}",
        esc(&q.symbol),
        q.price,
        q.change,
        q.change_percent,
        esc(&q.source)
    )
}

pub fn alert_created(a: &Alert) -> String {
    format!(
        "✅ Alert #{} set: {} {} {:.2}",
        a.id, a.symbol, a.condition, a.threshold
    )
}

pub fn alerts(list: &[Alert]) -> String {
    if list.is_empty() {
        return "You have no active alerts. Add one with /alert SYMBOL above|below PRICE".to_string();
    }

    let mut out = String::from("🔔 <b>Your alerts</b>\n");
    for a in list {
        out.push_str(&format!(
            "\n#{} {} {} {:.2}",
            a.id, a.symbol, a.condition, a.threshold
        ));
        if a.triggered {
            out.push_str(" (fired, waiting to re-arm)");
        }
    }
    out
}

pub fn trade_created(t: &Trade) -> String {
    format!(
        "✅ Trade #{} recorded: {} {} {} @ {:.2}",
        t.id,
        t.action.as_str().to_uppercase(),
        fmt_qty(t.quantity),
        t.symbol,
        t.price
    )
}

pub fn trades(list: &[Trade]) -> String {
    if list.is_empty() {
        return "No trades recorded yet. Use /trade buy|sell SYMBOL QUANTITY PRICE".to_string();
    }

    let mut out = String::from("📒 <b>Your trades</b>\n");
    for t in list {
        out.push_str(&format!(
            "\n#{} {} {} {} @ {:.2} ({})",
            t.id,
            t.action.as_str().to_uppercase(),
            fmt_qty(t.quantity),
            t.symbol,
            t.price,
            fmt_ts(t.executed_at)
        ));
    }
    out
}

pub fn positions(list: &[Position]) -> String {
    if list.is_empty() {
        return "No open positions.".to_string();
    }

    let mut out = String::from("💼 <b>Portfolio</b>\n");
    let mut total_pnl = 0.0;
    for p in list {
        total_pnl += p.pnl;
        out.push_str(&format!(
            "\n{} {} @ {:.2} → {:.2} | PnL {:+.2} ({:+.2}%)",
            p.symbol,
            fmt_qty(p.quantity),
            p.avg_price,
            p.last_price,
            p.pnl,
            p.pnl_pct
        ));
    }
    out.push_str(&format!("\n\nTotal PnL: {total_pnl:+.2}"));
    out
}
