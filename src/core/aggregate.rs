//! Filtering and aggregation over a loaded transaction table.
//!
//! Every function here is a pure transform over `&[Transaction]`. Cells that
//! cannot be parsed drop their row; only malformed reference dates passed in
//! by the caller are reported as errors.
use crate::core::period::{
    self, DateRange, IntervalRule, LOOKBACK_DAYS, parse_cell_date, parse_cell_timestamp,
};
use crate::core::transaction::Transaction;
use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Number of rows returned by [`top_transactions`].
pub const TOP_LIMIT: usize = 5;

pub const CASHBACK_RATE: f64 = 0.01;

pub const TRANSFERS_CATEGORY: &str = "Переводы";

/// Ordering applied to payment amounts when ranking transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Largest payments first.
    #[default]
    Descending,
    /// Most negative payments (biggest spend) first.
    Ascending,
}

/// Extra sign condition for the category spend report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountFilter {
    /// Rounded operation amount must be strictly positive.
    #[default]
    PositiveRounded,
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub date: String,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTransaction {
    pub date: String,
    pub amount: f64,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardExpense {
    pub last_digits: String,
    pub total_spent: f64,
    pub cashback: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Spending in `category` over the 90 days ending at `reference`
/// (`dd.mm.yyyy`, optionally with a time; defaults to now).
pub fn spending_by_category(
    transactions: &[Transaction],
    category: &str,
    reference: Option<&str>,
    filter: AmountFilter,
) -> Result<Vec<CategorySpend>> {
    let reference = match reference {
        Some(raw) => period::parse_reference_date(raw)?,
        None => Local::now().naive_local(),
    };
    Ok(spending_by_category_at(
        transactions,
        category,
        reference,
        filter,
    ))
}

pub fn spending_by_category_at(
    transactions: &[Transaction],
    category: &str,
    reference: NaiveDateTime,
    filter: AmountFilter,
) -> Vec<CategorySpend> {
    let window = DateRange {
        start: reference - Duration::days(LOOKBACK_DAYS),
        end: reference,
    };
    debug!(%category, start = %window.start, end = %window.end, "Category spend window");

    let spends: Vec<CategorySpend> = transactions
        .iter()
        .filter(|tx| tx.category.as_deref() == Some(category))
        .filter(|tx| match filter {
            AmountFilter::PositiveRounded => tx.rounded_amount.is_some_and(|v| v > 0.0),
            AmountFilter::Any => true,
        })
        .filter_map(|tx| {
            let paid_on = parse_cell_date(tx.payment_date.as_deref())?;
            window
                .contains(paid_on.and_time(NaiveTime::MIN))
                .then(|| CategorySpend {
                    date: tx.payment_date.clone().unwrap_or_default(),
                    amount: tx.payment_amount,
                })
        })
        .collect();

    info!("Found {} '{}' transactions in window", spends.len(), category);
    spends
}

/// The [`TOP_LIMIT`] rows inside `range`, ranked by payment amount.
pub fn top_transactions(
    transactions: &[Transaction],
    range: &DateRange,
    order: SortOrder,
) -> Vec<TopTransaction> {
    let mut candidates: Vec<(NaiveDateTime, f64, &Transaction)> = transactions
        .iter()
        .filter_map(|tx| {
            let when = parse_cell_timestamp(tx.operation_date.as_deref())?;
            let amount = tx.payment_amount?;
            range.contains(when).then_some((when, amount, tx))
        })
        .collect();

    match order {
        SortOrder::Descending => candidates.sort_by(|a, b| b.1.total_cmp(&a.1)),
        SortOrder::Ascending => candidates.sort_by(|a, b| a.1.total_cmp(&b.1)),
    }

    let top: Vec<TopTransaction> = candidates
        .into_iter()
        .take(TOP_LIMIT)
        .map(|(when, amount, tx)| TopTransaction {
            date: when.format(period::DATE_FORMAT).to_string(),
            amount,
            category: tx.category.clone(),
            description: tx.description.clone(),
        })
        .collect();
    debug!(?order, "Selected {} top transactions", top.len());
    top
}

/// Spend and estimated cashback per card, optionally limited to `range`.
///
/// Rows are grouped by full card number; cards that share the last four
/// digits stay separate entries.
pub fn card_expenses(transactions: &[Transaction], range: Option<&DateRange>) -> Vec<CardExpense> {
    let mut spent_by_card: BTreeMap<&str, f64> = BTreeMap::new();

    for tx in transactions {
        let (Some(card), Some(amount)) = (tx.card_number.as_deref(), tx.payment_amount) else {
            continue;
        };
        if amount >= 0.0 {
            continue;
        }
        if let Some(range) = range {
            match parse_cell_timestamp(tx.operation_date.as_deref()) {
                Some(when) if range.contains(when) => {}
                _ => continue,
            }
        }
        *spent_by_card.entry(card).or_default() += amount;
    }

    spent_by_card
        .into_iter()
        .map(|(card, sum)| {
            let total_spent = round2(sum.abs());
            debug!(card, total_spent, "Card expenses");
            CardExpense {
                last_digits: last_four(card),
                total_spent,
                cashback: round2(total_spent * CASHBACK_RATE),
            }
        })
        .collect()
}

fn last_four(card: &str) -> String {
    let chars: Vec<char> = card.chars().collect();
    chars[chars.len().saturating_sub(4)..].iter().collect()
}

/// Rows whose operation timestamp falls in the interval resolved from
/// `reference` (both bounds inclusive).
pub fn transactions_in_interval(
    transactions: &[Transaction],
    reference: &str,
    rule: IntervalRule,
) -> Result<Vec<Transaction>> {
    let range = period::resolve(reference, rule)?;
    Ok(transactions_in_range(transactions, &range))
}

pub fn transactions_in_range(transactions: &[Transaction], range: &DateRange) -> Vec<Transaction> {
    let selected: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| {
            parse_cell_timestamp(tx.operation_date.as_deref()).is_some_and(|when| range.contains(when))
        })
        .cloned()
        .collect();
    info!("Selected {} transactions in interval", selected.len());
    selected
}

static PERSON_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[А-ЯЁ][а-яё]+\s[А-ЯЁ]\.").expect("person pattern is valid")
});

/// Transfers to private persons: rows in the transfers category whose
/// description looks like `Имя Ф.`.
pub fn individual_transfers(transactions: &[Transaction]) -> Vec<Transaction> {
    let transfers: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| tx.category.as_deref() == Some(TRANSFERS_CATEGORY))
        .filter(|tx| tx.description.as_deref().is_some_and(|d| PERSON_NAME.is_match(d)))
        .cloned()
        .collect();
    info!("Found {} transfers to individuals", transfers.len());
    transfers
}

/// Serializes a report the way it is printed and stored: indented UTF-8.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report")
}
