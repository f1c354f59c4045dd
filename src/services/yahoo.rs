use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::market_data::{Quote, QuoteProvider};
use crate::error::{Result, ServiceError};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Keyless fallback provider backed by the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooClient {
    http: Client,
    base_url: String,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    pub fn new() -> Self {
        let http = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; TradeCompanion/0.1)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
}

#[async_trait]
impl QuoteProvider for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let res = self
            .http
            .get(url)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ServiceError::upstream(format!(
                "Yahoo chart failed for {symbol}: {}",
                res.status()
            )));
        }

        let body = res.json::<ChartResponse>().await?;
        let meta = body
            .chart
            .result
            .and_then(|mut r| r.pop())
            .map(|r| r.meta)
            .ok_or_else(|| ServiceError::upstream(format!("Yahoo has no data for {symbol}")))?;

        let price = meta
            .regular_market_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| ServiceError::upstream(format!("Yahoo has no price for {symbol}")))?;

        let prev = meta
            .chart_previous_close
            .or(meta.previous_close)
            .filter(|p| p.is_finite() && *p > 0.0);

        let (change, change_percent) = match prev {
            Some(pc) => (price - pc, (price - pc) / pc * 100.0),
            None => (0.0, 0.0),
        };

        Ok(Quote {
            symbol: symbol.to_string(),
            price,
            change,
            change_percent,
            source: self.name().to_string(),
        })
    }
}
