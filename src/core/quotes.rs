//! Currency and stock quote abstractions

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub currency: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPrice {
    pub stock: String,
    pub price: f64,
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Rates in roubles for the requested currency codes.
    async fn fetch_rates(&self, currencies: &[String]) -> Result<Vec<CurrencyRate>>;
}

#[async_trait]
pub trait StockPriceProvider: Send + Sync {
    async fn fetch_price(&self, symbol: &str) -> Result<StockPrice>;
}

/// Fetches rates, degrading to an empty list when the provider fails.
pub async fn collect_currency_rates(
    provider: &(dyn CurrencyRateProvider + Send + Sync),
    currencies: &[String],
) -> Vec<CurrencyRate> {
    if currencies.is_empty() {
        return Vec::new();
    }
    match provider.fetch_rates(currencies).await {
        Ok(rates) => rates,
        Err(e) => {
            warn!(error = %e, "Currency rates unavailable");
            Vec::new()
        }
    }
}

/// Fetches prices one symbol at a time; failed symbols are left out.
pub async fn collect_stock_prices(
    provider: &(dyn StockPriceProvider + Send + Sync),
    symbols: &[String],
    on_progress: &(dyn Fn() + Sync),
) -> Vec<StockPrice> {
    let mut prices = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match provider.fetch_price(symbol).await {
            Ok(price) => prices.push(price),
            Err(e) => warn!(error = %e, %symbol, "Skipping stock without price"),
        }
        on_progress();
    }
    debug!("Collected {} of {} stock prices", prices.len(), symbols.len());
    prices
}
