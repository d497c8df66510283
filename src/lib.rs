pub mod cli;
pub mod core;
pub mod providers;

pub use cli::OutputFormat;

use anyhow::Result;
use tracing::{debug, info};

/// Reports the application can produce, independent of how they were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    MainPage {
        date: String,
    },
    Top {
        date: String,
    },
    Cards {
        date: Option<String>,
    },
    Spending {
        category: String,
        date: Option<String>,
        snapshot: bool,
    },
    Interval {
        date: String,
    },
    Transfers,
    Settings,
}

/// Runs `command` and returns the text that would be printed.
pub async fn render_command(
    command: AppCommand,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let config = match config_path {
        Some(path) => crate::core::config::AppConfig::load_from_path(path)?,
        None => crate::core::config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::MainPage { date } => cli::main_page::run(&config, &date, format).await,
        AppCommand::Top { date } => cli::top(&config, &date, format),
        AppCommand::Cards { date } => cli::cards(&config, date.as_deref(), format),
        AppCommand::Spending {
            category,
            date,
            snapshot,
        } => cli::spending(&config, &category, date.as_deref(), snapshot, format),
        AppCommand::Interval { date } => cli::interval(&config, &date, format),
        AppCommand::Transfers => cli::transfers(&config, format),
        AppCommand::Settings => cli::show_settings(&config),
    }
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    info!(?command, "kopilka starting...");
    let output = render_command(command, config_path, format).await?;
    println!("{output}");
    Ok(())
}
