use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use kopilka::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Json)]
    format: Format,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Table,
}

impl From<Format> for kopilka::OutputFormat {
    fn from(format: Format) -> kopilka::OutputFormat {
        match format {
            Format::Json => kopilka::OutputFormat::Json,
            Format::Table => kopilka::OutputFormat::Table,
        }
    }
}

impl From<Commands> for kopilka::AppCommand {
    fn from(cmd: Commands) -> kopilka::AppCommand {
        match cmd {
            Commands::MainPage { date } => kopilka::AppCommand::MainPage { date },
            Commands::Top { date } => kopilka::AppCommand::Top { date },
            Commands::Cards { date } => kopilka::AppCommand::Cards { date },
            Commands::Spending {
                category,
                date,
                snapshot,
            } => kopilka::AppCommand::Spending {
                category,
                date,
                snapshot,
            },
            Commands::Interval { date } => kopilka::AppCommand::Interval { date },
            Commands::Transfers => kopilka::AppCommand::Transfers,
            Commands::Settings => kopilka::AppCommand::Settings,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Greeting, card totals, top transactions and quotes for the month so far
    MainPage {
        /// Reference timestamp, e.g. "25.11.2021 21:29:17"
        date: String,
    },
    /// Five largest transactions in the reporting interval
    Top {
        /// Reference timestamp, e.g. "25.11.2021 21:29:17"
        date: String,
    },
    /// Spend and cashback per card
    Cards {
        /// Limit to the interval ending at this timestamp
        #[arg(long)]
        date: Option<String>,
    },
    /// Spending in a category over the last 90 days
    Spending {
        category: String,
        /// End of the window, e.g. "31.12.2021" (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Also save the result to spending_by_category.json
        #[arg(long)]
        snapshot: bool,
    },
    /// All transactions in the reporting interval
    Interval {
        /// Reference timestamp, e.g. "25.11.2021 21:29:17"
        date: String,
    },
    /// Transfers to private persons
    Transfers,
    /// Show user settings, creating an empty file if needed
    Settings,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    let result = match cli.command {
        Some(Commands::Setup) => kopilka::cli::setup::setup(),
        Some(cmd) => {
            kopilka::run_command(cmd.into(), cli.config_path.as_deref(), cli.format.into()).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
