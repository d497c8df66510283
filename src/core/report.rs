//! Assembles the combined main page summary.
use crate::core::aggregate::{self, CardExpense, TopTransaction};
use crate::core::config::ReportPolicy;
use crate::core::period;
use crate::core::quotes::{
    self, CurrencyRate, CurrencyRateProvider, StockPrice, StockPriceProvider,
};
use crate::core::settings::UserSettings;
use crate::core::transaction::Transaction;
use anyhow::Result;
use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const INVALID_DATE_MESSAGE: &str = "Некорректный формат даты.";
pub const UNREADABLE_DATA_MESSAGE: &str = "Не удалось прочитать данные.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainPageReport {
    pub greeting: String,
    pub cards: Vec<CardExpense>,
    pub top_transactions: Vec<TopTransaction>,
    pub currency_rates: Vec<CurrencyRate>,
    pub stock_prices: Vec<StockPrice>,
}

/// Body returned in place of a report when the request cannot be served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        4..=11 => "Доброе утро",
        12..=16 => "Добрый день",
        17..=21 => "Добрый вечер",
        _ => "Доброй ночи",
    }
}

pub fn greeting_now() -> &'static str {
    greeting_for_hour(Local::now().hour())
}

/// Everything needed to build a main page besides the transactions.
pub struct QuoteSources<'a> {
    pub settings: &'a UserSettings,
    pub currency_provider: &'a (dyn CurrencyRateProvider + Send + Sync),
    pub stock_provider: &'a (dyn StockPriceProvider + Send + Sync),
}

/// Builds the main page for the interval ending at `reference`
/// (`dd.mm.yyyy HH:MM:SS`).
pub async fn build_main_page(
    transactions: &[Transaction],
    reference: &str,
    policy: &ReportPolicy,
    greeting: &str,
    sources: QuoteSources<'_>,
    on_progress: &(dyn Fn() + Sync),
) -> Result<MainPageReport> {
    let range = period::resolve(reference, policy.interval)?;

    let cards = aggregate::card_expenses(transactions, Some(&range));
    let top_transactions = aggregate::top_transactions(transactions, &range, policy.top_order);

    let currency_rates =
        quotes::collect_currency_rates(sources.currency_provider, &sources.settings.user_currencies)
            .await;
    let stock_prices = quotes::collect_stock_prices(
        sources.stock_provider,
        &sources.settings.user_stocks,
        on_progress,
    )
    .await;

    info!(
        cards = cards.len(),
        top = top_transactions.len(),
        rates = currency_rates.len(),
        stocks = stock_prices.len(),
        "Assembled main page"
    );

    Ok(MainPageReport {
        greeting: greeting.to_string(),
        cards,
        top_transactions,
        currency_rates,
        stock_prices,
    })
}
