use kopilka::{AppCommand, OutputFormat, render_command};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_quote_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/currency_data/live"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"success": true, "quotes": {"USDRUB": 73.5, "USDEUR": 0.85}}"#,
            ))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("symbol", "AAPL"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Global Quote": {"05. price": "150.0000"}}"#),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("symbol", "TSLA"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

const HEADER: &str = "Дата операции,Дата платежа,Номер карты,Статус,Сумма операции,Валюта операции,Сумма платежа,Валюта платежа,Кэшбэк,Категория,MCC,Описание,Бонусы (включая кэшбэк),Округление на инвесткопилку,Сумма операции с округлением";

const ROWS: &str = "\
17.12.2021 14:19:08,17.12.2021,*7197,OK,-100.0,RUB,-100.0,RUB,,Супермаркеты,5411,Колхоз,2,0,100.0
05.12.2021 10:15:30,05.12.2021,*7197,OK,-150.0,RUB,-150.0,RUB,,Супермаркеты,5411,Магнит,3,0,150.0
03.12.2021 12:30:00,03.12.2021,*5091,OK,-564.0,RUB,-564.0,RUB,,Различные товары,5399,Ozon.ru,5,0,564.0
02.12.2021 09:00:00,02.12.2021,,OK,5000.0,RUB,5000.0,RUB,,Пополнения,,Пополнение через Сбербанк,0,0,5000.0
01.12.2021 08:00:00,01.12.2021,,OK,-22000.0,RUB,-22000.0,RUB,,Переводы,,Константин Ф.,0,0,22000.0
20.11.2021 08:00:00,20.11.2021,*7197,OK,-999.0,RUB,-999.0,RUB,,Супермаркеты,5411,Колхоз,0,0,999.0
";

fn write_fixture(dir: &Path, base_url: &str) -> String {
    let transactions = dir.join("operations.csv");
    fs::write(&transactions, format!("{HEADER}\n{ROWS}")).expect("Failed to write transactions");

    let settings = dir.join("user_settings.json");
    fs::write(
        &settings,
        r#"{"user_currencies": ["USD", "EUR"], "user_stocks": ["AAPL", "TSLA"]}"#,
    )
    .expect("Failed to write settings");

    let config = dir.join("config.yaml");
    let config_content = format!(
        r#"
transactions_path: "{}"
settings_path: "{}"
snapshot_dir: "{}"
providers:
  currency:
    base_url: "{base_url}"
  stock:
    base_url: "{base_url}"
credentials:
  api_key: "test-key"
  api_key_stock: "test-key"
"#,
        transactions.display(),
        settings.display(),
        dir.display(),
    );
    fs::write(&config, config_content).expect("Failed to write config file");
    config.to_str().unwrap().to_string()
}

async fn render(command: AppCommand, config: &str) -> serde_json::Value {
    let output = render_command(command, Some(config), OutputFormat::Json)
        .await
        .expect("Command failed");
    serde_json::from_str(&output).expect("Output is not JSON")
}

#[test_log::test(tokio::test)]
async fn test_main_page_with_mock_quotes() {
    let mock_server = test_utils::create_quote_server().await;
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), &mock_server.uri());

    let page = render(
        AppCommand::MainPage {
            date: "17.12.2021 14:52:20".to_string(),
        },
        &config,
    )
    .await;

    assert!(page["greeting"].is_string());

    let cards = page["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["last_digits"], "5091");
    assert_eq!(cards[0]["total_spent"], 564.0);
    assert_eq!(cards[1]["last_digits"], "7197");
    assert_eq!(cards[1]["total_spent"], 250.0);
    assert_eq!(cards[1]["cashback"], 2.5);

    let top = page["top_transactions"].as_array().unwrap();
    assert_eq!(top.len(), 5);
    assert_eq!(top[0]["amount"], 5000.0);
    assert_eq!(top[0]["date"], "02.12.2021");

    let rates = page["currency_rates"].as_array().unwrap();
    assert_eq!(rates.len(), 2);
    assert_eq!(rates[0]["currency"], "USD");
    assert_eq!(rates[0]["rate"], 73.5);
    assert_eq!(rates[1]["currency"], "EUR");
    assert_eq!(rates[1]["rate"], 86.47);

    let stocks = page["stock_prices"].as_array().unwrap();
    assert_eq!(stocks.len(), 1);
    assert_eq!(stocks[0]["stock"], "AAPL");
    assert_eq!(stocks[0]["price"], 150.0);
}

#[test_log::test(tokio::test)]
async fn test_main_page_invalid_date() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "http://127.0.0.1:9");

    let page = render(
        AppCommand::MainPage {
            date: "invalid_date".to_string(),
        },
        &config,
    )
    .await;
    assert_eq!(page["error"], "Некорректный формат даты.");
}

#[test_log::test(tokio::test)]
async fn test_main_page_unreadable_data() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "http://127.0.0.1:9");
    fs::remove_file(dir.path().join("operations.csv")).unwrap();

    let page = render(
        AppCommand::MainPage {
            date: "17.12.2021 14:52:20".to_string(),
        },
        &config,
    )
    .await;
    assert_eq!(page["error"], "Не удалось прочитать данные.");
}

#[test_log::test(tokio::test)]
async fn test_spending_writes_snapshot() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "http://127.0.0.1:9");

    let spends = render(
        AppCommand::Spending {
            category: "Супермаркеты".to_string(),
            date: Some("31.12.2021".to_string()),
            snapshot: true,
        },
        &config,
    )
    .await;

    let spends = spends.as_array().unwrap();
    assert_eq!(spends.len(), 3);
    assert_eq!(spends[0]["date"], "17.12.2021");
    assert_eq!(spends[0]["amount"], -100.0);

    let snapshot = fs::read_to_string(dir.path().join("spending_by_category.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 3);
}

#[test_log::test(tokio::test)]
async fn test_interval_and_transfers() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "http://127.0.0.1:9");

    let selected = render(
        AppCommand::Interval {
            date: "05.12.2021 10:15:30".to_string(),
        },
        &config,
    )
    .await;
    let selected = selected.as_array().unwrap();
    assert_eq!(selected.len(), 4);
    assert_eq!(selected[0]["Дата операции"], "05.12.2021 10:15:30");

    let transfers = render(AppCommand::Transfers, &config).await;
    let transfers = transfers.as_array().unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0]["Описание"], "Константин Ф.");
}

#[test_log::test(tokio::test)]
async fn test_settings_command_creates_file() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "http://127.0.0.1:9");
    let settings = dir.path().join("user_settings.json");
    fs::remove_file(&settings).unwrap();

    let value = render(AppCommand::Settings, &config).await;
    assert_eq!(value, serde_json::json!({}));
    assert!(settings.exists());
}

#[test_log::test(tokio::test)]
async fn test_table_output() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "http://127.0.0.1:9");

    let output = render_command(AppCommand::Cards { date: None }, Some(&config), OutputFormat::Table)
        .await
        .unwrap();
    let output = console::strip_ansi_codes(&output).to_string();
    assert!(output.contains("*7197"));
    assert!(output.contains("1249.00"));
}
