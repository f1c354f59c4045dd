use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;

use super::market_data::QuoteProvider;
use crate::{
    error::{Result, ServiceError},
    models::{ensure_positive, normalize_symbol, NewTrade, Position, Trade, TradeAction},
    store::Store,
};

// quantities below this are treated as a closed position
const QTY_EPSILON: f64 = 1e-9;

pub struct TradeService {
    store: Arc<dyn Store>,
    quotes: Arc<dyn QuoteProvider>,
}

impl TradeService {
    pub fn new(store: Arc<dyn Store>, quotes: Arc<dyn QuoteProvider>) -> Self {
        Self { store, quotes }
    }

    pub async fn create_trade(
        &self,
        user_id: i64,
        symbol: &str,
        action: &str,
        quantity: f64,
        price: f64,
    ) -> Result<Trade> {
        let symbol = normalize_symbol(symbol)?;
        let action: TradeAction = action.parse()?;
        let quantity = ensure_positive(quantity, "quantity")?;
        let price = ensure_positive(price, "price")?;

        let trade = self
            .store
            .insert_trade(NewTrade {
                user_id,
                symbol,
                action,
                quantity,
                price,
                executed_at: Utc::now().timestamp(),
            })
            .await?;

        tracing::info!(
            user_id,
            trade_id = trade.id,
            action = %trade.action,
            quantity = trade.quantity,
            symbol = %trade.symbol,
            price = trade.price,
            "trade recorded"
        );
        Ok(trade)
    }

    pub async fn list_trades(&self, user_id: i64) -> Result<Vec<Trade>> {
        Ok(self.store.trades_for_user(user_id).await?)
    }

    pub async fn delete_trade(&self, user_id: i64, trade_id: i64) -> Result<()> {
        if !self.store.delete_trade(user_id, trade_id).await? {
            return Err(ServiceError::not_found(format!("trade {trade_id} not found")));
        }
        tracing::info!(user_id, trade_id, "trade deleted");
        Ok(())
    }

    /// Open positions rebuilt from the journal and marked to the latest quote.
    pub async fn positions(&self, user_id: i64) -> Result<Vec<Position>> {
        let trades = self.store.trades_for_user(user_id).await?;

        // symbol => (net qty, bought qty, bought cost)
        let mut books: BTreeMap<String, (f64, f64, f64)> = BTreeMap::new();
        for t in &trades {
            let entry = books.entry(t.symbol.clone()).or_insert((0.0, 0.0, 0.0));
            match t.action {
                TradeAction::Buy => {
                    entry.0 += t.quantity;
                    entry.1 += t.quantity;
                    entry.2 += t.total();
                }
                TradeAction::Sell => entry.0 -= t.quantity,
            }
        }

        let mut out = Vec::new();
        for (symbol, (qty, bought_qty, bought_cost)) in books {
            if qty <= QTY_EPSILON || bought_qty <= QTY_EPSILON {
                continue;
            }
            let avg_price = bought_cost / bought_qty;

            let last_price = match self.quotes.quote(&symbol).await {
                Ok(q) => q.price,
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "no quote for position, using cost basis");
                    avg_price
                }
            };

            let pnl = (last_price - avg_price) * qty;
            let pnl_pct = if avg_price > 0.0 {
                (last_price - avg_price) / avg_price * 100.0
            } else {
                0.0
            };

            out.push(Position {
                symbol,
                quantity: qty,
                avg_price,
                last_price,
                pnl,
                pnl_pct,
            });
        }

        Ok(out)
    }
}
