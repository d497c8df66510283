pub mod main_page;
pub mod setup;
pub mod tables;
pub mod ui;

use crate::core::aggregate::{self, to_pretty_json};
use crate::core::config::AppConfig;
use crate::core::period;
use crate::core::settings;
use crate::core::sink::{FileSink, persist_result};
use crate::core::source::load_transactions;
use anyhow::Result;
use tracing::debug;

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

pub fn top(config: &AppConfig, date: &str, format: OutputFormat) -> Result<String> {
    let range = period::resolve(date, config.policy.interval)?;
    let transactions = load_transactions(&config.transactions_path)?;
    let top = aggregate::top_transactions(&transactions, &range, config.policy.top_order);
    match format {
        OutputFormat::Json => to_pretty_json(&top),
        OutputFormat::Table => Ok(tables::top_table(&top)),
    }
}

pub fn cards(config: &AppConfig, date: Option<&str>, format: OutputFormat) -> Result<String> {
    let range = date
        .map(|d| period::resolve(d, config.policy.interval))
        .transpose()?;
    let transactions = load_transactions(&config.transactions_path)?;
    let cards = aggregate::card_expenses(&transactions, range.as_ref());
    match format {
        OutputFormat::Json => to_pretty_json(&cards),
        OutputFormat::Table => Ok(tables::cards_table(&cards)),
    }
}

/// Category spend report. With `snapshot`, the JSON is also written to
/// `spending_by_category.json` in the configured snapshot directory.
pub fn spending(
    config: &AppConfig,
    category: &str,
    date: Option<&str>,
    snapshot: bool,
    format: OutputFormat,
) -> Result<String> {
    let transactions = load_transactions(&config.transactions_path)?;
    let spends = aggregate::spending_by_category(
        &transactions,
        category,
        date,
        config.policy.category_amount,
    )?;
    let json = to_pretty_json(&spends)?;

    if snapshot {
        let dir = config.snapshot_dir.as_deref().unwrap_or(".");
        debug!(dir, "Persisting category spend snapshot");
        persist_result(&FileSink::new(dir), "spending_by_category", &json);
    }

    match format {
        OutputFormat::Json => Ok(json),
        OutputFormat::Table => Ok(tables::spending_table(category, &spends)),
    }
}

pub fn interval(config: &AppConfig, date: &str, format: OutputFormat) -> Result<String> {
    let transactions = load_transactions(&config.transactions_path)?;
    let selected =
        aggregate::transactions_in_interval(&transactions, date, config.policy.interval)?;
    match format {
        OutputFormat::Json => to_pretty_json(&selected),
        OutputFormat::Table => Ok(tables::transactions_table(&selected)),
    }
}

pub fn transfers(config: &AppConfig, format: OutputFormat) -> Result<String> {
    let transactions = load_transactions(&config.transactions_path)?;
    let found = aggregate::individual_transfers(&transactions);
    match format {
        OutputFormat::Json => to_pretty_json(&found),
        OutputFormat::Table => Ok(tables::transactions_table(&found)),
    }
}

/// Shows the settings file, creating an empty one when it does not exist.
pub fn show_settings(config: &AppConfig) -> Result<String> {
    match settings::load_or_create(&config.settings_path)? {
        Some(value) => to_pretty_json(&value),
        None => Ok("null".to_string()),
    }
}
