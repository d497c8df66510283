use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use crate::core::aggregate::round2;
use crate::core::quotes::{CurrencyRate, CurrencyRateProvider};
use crate::providers::util::http_client;

/// Currency rates from the apilayer `currency_data` API.
///
/// Quotes come back against USD, so the rouble rate of EUR is derived from
/// the USD/RUB and USD/EUR pair.
pub struct ApilayerCurrencyProvider {
    base_url: String,
    api_key: Option<String>,
}

impl ApilayerCurrencyProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        ApilayerCurrencyProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LiveResponse {
    #[serde(default)]
    quotes: HashMap<String, f64>,
}

#[async_trait]
impl CurrencyRateProvider for ApilayerCurrencyProvider {
    #[instrument(name = "ApilayerRatesFetch", skip(self))]
    async fn fetch_rates(&self, currencies: &[String]) -> Result<Vec<CurrencyRate>> {
        let wanted: Vec<String> = currencies
            .iter()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| {
                let supported = c == "USD" || c == "EUR";
                if !supported {
                    debug!(currency = %c, "Unsupported currency, skipping");
                }
                supported
            })
            .collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/currency_data/live?source=USD&currencies=RUB,EUR",
            self.base_url
        );
        debug!("Requesting currency rates from {}", url);

        let client = http_client()?;
        let mut request = client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for currency rates", response.status()));
        }

        let text = response.text().await?;
        let data: LiveResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse currency rates response: {}", e))?;

        let (Some(usd), Some(usd_eur)) = (data.quotes.get("USDRUB"), data.quotes.get("USDEUR"))
        else {
            warn!("Currency quotes missing from response");
            return Ok(Vec::new());
        };
        if *usd_eur == 0.0 {
            warn!("USDEUR quote is zero, cannot derive EUR rate");
            return Ok(Vec::new());
        }
        let eur = usd / usd_eur;

        let mut rates = Vec::new();
        for currency in wanted {
            if rates.iter().any(|r: &CurrencyRate| r.currency == currency) {
                continue;
            }
            let rate = if currency == "USD" { *usd } else { eur };
            rates.push(CurrencyRate {
                currency,
                rate: round2(rate),
            });
        }
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_live(body: &str, status: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/currency_data/live"))
            .and(query_param("source", "USD"))
            .and(query_param("currencies", "RUB,EUR"))
            .and(header("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_server = mock_live(
            r#"{"success": true, "quotes": {"USDRUB": 73.456, "USDEUR": 0.8}}"#,
            200,
        )
        .await;
        let provider = ApilayerCurrencyProvider::new(&mock_server.uri(), Some("test-key".into()));

        let rates = provider.fetch_rates(&codes(&["USD", "EUR"])).await.unwrap();
        assert_eq!(
            rates,
            vec![
                CurrencyRate {
                    currency: "USD".to_string(),
                    rate: 73.46
                },
                CurrencyRate {
                    currency: "EUR".to_string(),
                    rate: 91.82
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_only_requested_supported_currencies() {
        let mock_server = mock_live(
            r#"{"quotes": {"USDRUB": 70.0, "USDEUR": 0.85}}"#,
            200,
        )
        .await;
        let provider = ApilayerCurrencyProvider::new(&mock_server.uri(), Some("test-key".into()));

        let rates = provider.fetch_rates(&codes(&["eur", "GBP"])).await.unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].currency, "EUR");
        assert_eq!(rates[0].rate, 82.35);

        assert!(provider.fetch_rates(&codes(&["GBP"])).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_quotes() {
        let mock_server = mock_live(r#"{"quotes": {}}"#, 200).await;
        let provider = ApilayerCurrencyProvider::new(&mock_server.uri(), Some("test-key".into()));

        let rates = provider.fetch_rates(&codes(&["USD", "EUR"])).await.unwrap();
        assert!(rates.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = mock_live("", 500).await;
        let provider = ApilayerCurrencyProvider::new(&mock_server.uri(), Some("test-key".into()));

        let result = provider.fetch_rates(&codes(&["USD"])).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for currency rates"
        );
    }
}
