pub mod alphavantage;
pub mod apilayer;
pub mod util;
