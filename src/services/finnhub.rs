use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::market_data::{Quote, QuoteProvider};
use crate::error::{Result, ServiceError};

const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn raw_quote(&self, symbol: &str) -> Result<QuoteResponse> {
        if !self.has_key() {
            return Err(ServiceError::upstream("FINNHUB_API_KEY is missing"));
        }

        let url = format!("{}/quote", self.base_url);
        let res = self
            .http
            .get(url)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ServiceError::upstream(format!(
                "Finnhub quote failed: {status} {body}"
            )));
        }

        Ok(res.json::<QuoteResponse>().await?)
    }
}

#[async_trait]
impl QuoteProvider for FinnhubClient {
    fn name(&self) -> &str {
        "finnhub"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let q = self.raw_quote(symbol).await?;

        // Finnhub answers unknown tickers with an all-zero quote instead of 404
        if !q.c.is_finite() || q.c <= 0.0 {
            return Err(ServiceError::upstream(format!(
                "Finnhub has no price for {symbol}"
            )));
        }

        Ok(Quote {
            symbol: symbol.to_string(),
            price: q.c,
            change: q.d.unwrap_or(0.0),
            change_percent: q.dp.unwrap_or(0.0),
            source: self.name().to_string(),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteResponse {
    // current
    pub c: f64,
    // change (null for unknown symbols)
    pub d: Option<f64>,
    // percent change
    pub dp: Option<f64>,
    // high
    pub h: f64,
    // low
    pub l: f64,
    // open
    pub o: f64,
    // previous close
    pub pc: f64,
    // timestamp
    pub t: i64,
}
