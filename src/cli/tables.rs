//! Human-readable renderings of the reports.
use super::ui;
use crate::core::aggregate::{CardExpense, CategorySpend, TopTransaction};
use crate::core::report::MainPageReport;
use crate::core::transaction::Transaction;
use comfy_table::Cell;

pub fn cards_table(cards: &[CardExpense]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Card"),
        ui::header_cell("Total spent"),
        ui::header_cell("Cashback"),
    ]);
    for card in cards {
        table.add_row(vec![
            Cell::new(format!("*{}", card.last_digits)),
            ui::format_optional_cell(Some(card.total_spent), |v| format!("{v:.2}")),
            ui::format_optional_cell(Some(card.cashback), |v| format!("{v:.2}")),
        ]);
    }

    let total: f64 = cards.iter().map(|c| c.total_spent).sum();
    format!(
        "{}\n\n{}: {}",
        table,
        ui::style_text("Total spent", ui::StyleType::TotalLabel),
        ui::style_text(&format!("{total:.2}"), ui::StyleType::TotalValue)
    )
}

pub fn top_table(top: &[TopTransaction]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Amount"),
        ui::header_cell("Category"),
        ui::header_cell("Description"),
    ]);
    for tx in top {
        table.add_row(vec![
            Cell::new(&tx.date),
            ui::amount_cell(tx.amount),
            Cell::new(tx.category.as_deref().unwrap_or("")),
            Cell::new(tx.description.as_deref().unwrap_or("")),
        ]);
    }
    table.to_string()
}

pub fn spending_table(category: &str, spends: &[CategorySpend]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Amount")]);
    for spend in spends {
        table.add_row(vec![
            Cell::new(&spend.date),
            ui::format_optional_cell(spend.amount, |v| format!("{v:.2}")),
        ]);
    }
    format!(
        "Category: {}\n\n{}",
        ui::style_text(category, ui::StyleType::Title),
        table
    )
}

pub fn transactions_table(transactions: &[Transaction]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Operation date"),
        ui::header_cell("Card"),
        ui::header_cell("Amount"),
        ui::header_cell("Currency"),
        ui::header_cell("Category"),
        ui::header_cell("Description"),
    ]);
    for tx in transactions {
        table.add_row(vec![
            Cell::new(tx.operation_date.as_deref().unwrap_or("")),
            Cell::new(tx.card_number.as_deref().unwrap_or("")),
            match tx.payment_amount {
                Some(amount) => ui::amount_cell(amount),
                None => ui::format_optional_cell(None::<f64>, |v| v.to_string()),
            },
            Cell::new(tx.payment_currency.as_deref().unwrap_or("")),
            Cell::new(tx.category.as_deref().unwrap_or("")),
            Cell::new(tx.description.as_deref().unwrap_or("")),
        ]);
    }
    format!(
        "{}\n{}",
        table,
        ui::style_text(&format!("{} transactions", transactions.len()), ui::StyleType::Subtle)
    )
}

pub fn main_page_view(report: &MainPageReport) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text(&report.greeting, ui::StyleType::Title)
    );
    output.push_str(&cards_table(&report.cards));
    output.push_str("\n\n");
    output.push_str(&top_table(&report.top_transactions));

    let mut quotes = ui::new_styled_table();
    quotes.set_header(vec![ui::header_cell("Quote"), ui::header_cell("Value")]);
    for rate in &report.currency_rates {
        quotes.add_row(vec![
            Cell::new(&rate.currency),
            ui::format_optional_cell(Some(rate.rate), |v| format!("{v:.2}")),
        ]);
    }
    for stock in &report.stock_prices {
        quotes.add_row(vec![
            Cell::new(&stock.stock),
            ui::format_optional_cell(Some(stock.price), |v| format!("{v:.2}")),
        ]);
    }
    output.push_str("\n\n");
    output.push_str(&quotes.to_string());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cards_table_lists_each_card() {
        let cards = vec![
            CardExpense {
                last_digits: "7197".to_string(),
                total_spent: 250.0,
                cashback: 2.5,
            },
            CardExpense {
                last_digits: "5091".to_string(),
                total_spent: 100.0,
                cashback: 1.0,
            },
        ];
        let rendered = console::strip_ansi_codes(&cards_table(&cards)).to_string();
        assert!(rendered.contains("*7197"));
        assert!(rendered.contains("*5091"));
        assert!(rendered.contains("350.00"));
    }

    #[test]
    fn test_spending_table_shows_missing_amount() {
        let spends = vec![CategorySpend {
            date: "03.06.2018".to_string(),
            amount: None,
        }];
        let rendered = console::strip_ansi_codes(&spending_table("Переводы", &spends)).to_string();
        assert!(rendered.contains("Переводы"));
        assert!(rendered.contains("N/A"));
    }
}
