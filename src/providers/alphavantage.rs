use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::aggregate::round2;
use crate::core::quotes::{StockPrice, StockPriceProvider};
use crate::providers::util::http_client;

// Alpha Vantage accepts this key for a handful of demo symbols.
const DEMO_KEY: &str = "demo";

pub struct AlphaVantageProvider {
    base_url: String,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        AlphaVantageProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.unwrap_or_else(|| DEMO_KEY.to_string()),
        }
    }
}

#[derive(Deserialize, Debug)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Deserialize, Debug)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[async_trait]
impl StockPriceProvider for AlphaVantageProvider {
    #[instrument(
        name = "AlphaVantagePriceFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_price(&self, symbol: &str) -> Result<StockPrice> {
        let url = format!("{}/query", self.base_url);
        debug!("Requesting stock quote for {}", symbol);

        let client = http_client()?;
        let response = client
            .get(&url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: GlobalQuoteResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let raw_price = data
            .global_quote
            .and_then(|q| q.price)
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))?;
        let price: f64 = raw_price
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid price '{}' for symbol: {}", raw_price, symbol))?;

        Ok(StockPrice {
            stock: symbol.to_string(),
            price: round2(price),
        })
    }
}
