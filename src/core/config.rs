use crate::core::aggregate::{AmountFilter, SortOrder};
use crate::core::period::IntervalRule;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const API_KEY_ENV: &str = "API_KEY";
pub const API_KEY_STOCK_ENV: &str = "API_KEY_STOCK";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CurrencyProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StockProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub currency: Option<CurrencyProviderConfig>,
    pub stock: Option<StockProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            currency: Some(CurrencyProviderConfig {
                base_url: "https://api.apilayer.com".to_string(),
            }),
            stock: Some(StockProviderConfig {
                base_url: "https://www.alphavantage.co".to_string(),
            }),
        }
    }
}

/// Credentials handed to the quote providers.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ApiCredentials {
    pub api_key: Option<String>,
    pub api_key_stock: Option<String>,
}

impl ApiCredentials {
    /// Fills keys missing from the config file with `API_KEY` and
    /// `API_KEY_STOCK` from the environment.
    pub fn resolve(self) -> Self {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    fn resolve_with(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        ApiCredentials {
            api_key: self.api_key.or_else(|| lookup(API_KEY_ENV)),
            api_key_stock: self.api_key_stock.or_else(|| lookup(API_KEY_STOCK_ENV)),
        }
    }
}

/// Choices between the report conventions that have been used over time.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct ReportPolicy {
    #[serde(default)]
    pub top_order: SortOrder,
    #[serde(default)]
    pub interval: IntervalRule,
    #[serde(default)]
    pub category_amount: AmountFilter,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub transactions_path: String,
    pub settings_path: String,
    pub snapshot_dir: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub credentials: ApiCredentials,
    #[serde(default)]
    pub policy: ReportPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "kopilka", "kopilka")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn currency_base_url(&self) -> &str {
        self.providers
            .currency
            .as_ref()
            .map_or("https://api.apilayer.com", |p| &p.base_url)
    }

    pub fn stock_base_url(&self) -> &str {
        self.providers
            .stock
            .as_ref()
            .map_or("https://www.alphavantage.co", |p| &p.base_url)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.credentials = config.credentials.resolve();
        debug!("Successfully loaded config");
        Ok(config)
    }
}
