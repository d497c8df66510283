//! Transaction record as exported by the bank.
//!
//! Column headers are kept exactly as they appear in the export, so the
//! same names are used when records are serialized back out.

use serde::{Deserialize, Deserializer, Serialize};

pub const OPERATION_DATE: &str = "Дата операции";
pub const PAYMENT_DATE: &str = "Дата платежа";
pub const CARD_NUMBER: &str = "Номер карты";
pub const PAYMENT_AMOUNT: &str = "Сумма платежа";
pub const CATEGORY: &str = "Категория";

/// Columns without which no report can be produced.
pub const REQUIRED_COLUMNS: [&str; 3] = [OPERATION_DATE, PAYMENT_AMOUNT, CATEGORY];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Дата операции", default, deserialize_with = "lenient_text")]
    pub operation_date: Option<String>,
    #[serde(rename = "Дата платежа", default, deserialize_with = "lenient_text")]
    pub payment_date: Option<String>,
    #[serde(rename = "Номер карты", default, deserialize_with = "lenient_text")]
    pub card_number: Option<String>,
    #[serde(rename = "Статус", default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(rename = "Сумма операции", default, deserialize_with = "lenient_f64")]
    pub operation_amount: Option<f64>,
    #[serde(rename = "Валюта операции", default, deserialize_with = "lenient_text")]
    pub operation_currency: Option<String>,
    #[serde(rename = "Сумма платежа", default, deserialize_with = "lenient_f64")]
    pub payment_amount: Option<f64>,
    #[serde(rename = "Валюта платежа", default, deserialize_with = "lenient_text")]
    pub payment_currency: Option<String>,
    #[serde(rename = "Кэшбэк", default, deserialize_with = "lenient_f64")]
    pub cashback: Option<f64>,
    #[serde(rename = "Категория", default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(rename = "MCC", default, deserialize_with = "lenient_mcc")]
    pub mcc: Option<u32>,
    #[serde(rename = "Описание", default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(rename = "Бонусы (включая кэшбэк)", default, deserialize_with = "lenient_f64")]
    pub bonus: Option<f64>,
    #[serde(rename = "Округление на инвесткопилку", default, deserialize_with = "lenient_f64")]
    pub rounding: Option<f64>,
    #[serde(rename = "Сумма операции с округлением", default, deserialize_with = "lenient_f64")]
    pub rounded_amount: Option<f64>,
}

/// A numeric cell as it arrives from the source: CSV and spreadsheet values
/// are inferred as numbers where they look like one, JSON carries real numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl RawCell {
    fn into_number(self) -> Option<f64> {
        match self {
            RawCell::Number(n) => Some(n).filter(|v| v.is_finite()),
            RawCell::Flag(_) => None,
            RawCell::Text(s) => clean_cell(s).and_then(|s| parse_amount(&s)),
        }
    }
}

/// Empty and "nan" cells become `None`.
fn clean_cell(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("nan")).then(|| trimmed.to_string())
}

/// Text cells are kept as written, so `0012` stays `0012`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(clean_cell))
}

/// Amounts may use a dot or a comma as decimal separator. Unparseable
/// cells are treated as missing rather than failing the row.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCell>::deserialize(deserializer)?;
    Ok(raw.and_then(RawCell::into_number))
}

fn lenient_mcc<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCell>::deserialize(deserializer)?;
    Ok(raw
        .and_then(RawCell::into_number)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32))
}

pub fn parse_amount(raw: &str) -> Option<f64> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-22000.0"), Some(-22000.0));
        assert_eq!(parse_amount("1 234,50"), Some(1234.5));
        assert_eq!(parse_amount("nan"), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_deserialize_from_csv_record_with_gaps() {
        let data = "Дата операции,Сумма платежа,Категория,MCC,Номер карты,Кэшбэк\n\
                    03.06.2018 14:19:08,-22000.0,Переводы,,nan,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<Transaction> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("Failed to deserialize");

        assert_eq!(rows.len(), 1);
        let tx = &rows[0];
        assert_eq!(tx.operation_date.as_deref(), Some("03.06.2018 14:19:08"));
        assert_eq!(tx.payment_amount, Some(-22000.0));
        assert_eq!(tx.category.as_deref(), Some("Переводы"));
        assert!(tx.mcc.is_none());
        assert!(tx.card_number.is_none());
        assert!(tx.cashback.is_none());
        assert!(tx.description.is_none());
    }

    #[test]
    fn test_text_cells_keep_their_lexeme() {
        let data = "Дата операции,Номер карты,Сумма платежа,Категория,Описание\n\
                    31.12.2021 16:44:00,0012,-10.0,Супермаркеты,1.50\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<Transaction> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("Failed to deserialize");

        assert_eq!(rows[0].card_number.as_deref(), Some("0012"));
        assert_eq!(rows[0].description.as_deref(), Some("1.50"));
        assert_eq!(rows[0].payment_amount, Some(-10.0));
    }

    #[test]
    fn test_json_round_trip() {
        let tx = Transaction {
            operation_date: Some("31.12.2021 16:44:00".to_string()),
            card_number: Some("*7197".to_string()),
            payment_amount: Some(-160.89),
            mcc: Some(5411),
            description: Some("Колхоз".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&tx).unwrap();
        let parsed: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tx);
    }

    #[test]
    fn test_serialize_keeps_export_headers() {
        let tx = Transaction {
            category: Some("Супермаркеты".to_string()),
            mcc: Some(5411),
            ..Default::default()
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["Категория"], "Супермаркеты");
        assert_eq!(value["MCC"], 5411);
        assert!(value["Дата операции"].is_null());
    }
}
