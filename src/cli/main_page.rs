use super::{OutputFormat, tables, ui};
use crate::core::aggregate::to_pretty_json;
use crate::core::config::AppConfig;
use crate::core::period;
use crate::core::report::{
    ErrorPayload, INVALID_DATE_MESSAGE, QuoteSources, UNREADABLE_DATA_MESSAGE, build_main_page,
    greeting_now,
};
use crate::core::settings::read_user_settings;
use crate::core::source::load_transactions;
use crate::providers::alphavantage::AlphaVantageProvider;
use crate::providers::apilayer::ApilayerCurrencyProvider;
use anyhow::Result;
use tracing::{error, warn};

fn error_payload(message: &str) -> Result<String> {
    to_pretty_json(&ErrorPayload {
        error: message.to_string(),
    })
}

/// Main page summary for the interval ending at `date`.
///
/// An invalid date or an unreadable export is answered with an
/// `{"error": ...}` body instead of a report.
pub async fn run(config: &AppConfig, date: &str, format: OutputFormat) -> Result<String> {
    if let Err(e) = period::parse_timestamp(date) {
        warn!(error = %e, "Rejected main page date");
        return error_payload(INVALID_DATE_MESSAGE);
    }

    let transactions = match load_transactions(&config.transactions_path) {
        Ok(transactions) => transactions,
        Err(e) => {
            error!(error = %e, "Failed to load transactions");
            return error_payload(UNREADABLE_DATA_MESSAGE);
        }
    };

    let settings = read_user_settings(&config.settings_path)?;
    let currency_provider = ApilayerCurrencyProvider::new(
        config.currency_base_url(),
        config.credentials.api_key.clone(),
    );
    let stock_provider = AlphaVantageProvider::new(
        config.stock_base_url(),
        config.credentials.api_key_stock.clone(),
    );

    let pb = ui::new_progress_bar(settings.user_stocks.len() as u64);
    pb.set_message("Fetching stock prices...");
    let sources = QuoteSources {
        settings: &settings,
        currency_provider: &currency_provider,
        stock_provider: &stock_provider,
    };
    let report = build_main_page(
        &transactions,
        date,
        &config.policy,
        greeting_now(),
        sources,
        &|| pb.inc(1),
    )
    .await;
    pb.finish_and_clear();
    let report = report?;

    match format {
        OutputFormat::Json => to_pretty_json(&report),
        OutputFormat::Table => Ok(tables::main_page_view(&report)),
    }
}
