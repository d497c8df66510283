//! Core business logic abstractions

pub mod aggregate;
pub mod config;
pub mod error;
pub mod log;
pub mod period;
pub mod quotes;
pub mod report;
pub mod settings;
pub mod sink;
pub mod source;
pub mod transaction;

// Re-export main types for cleaner imports
pub use error::ReportError;
pub use period::{DateRange, IntervalRule};
pub use quotes::{CurrencyRateProvider, StockPriceProvider};
pub use transaction::Transaction;
