//! Tally CLI - track expenses from your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{add, config, list, login, logout, logs, register, status};

/// Tally - expense tracking in your terminal
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with an email or username
    Login {
        /// Account email (takes precedence over --username)
        #[arg(long)]
        email: Option<String>,
        /// Account username
        #[arg(long, short)]
        username: Option<String>,
        /// Password (falls back to TALLY_PASSWORD, then a prompt)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new account
    Register {
        /// Full name
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long, short)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log out and forget the stored session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show who is logged in and where the backend is
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record an expense
    Add {
        /// Amount, e.g. 250.50
        #[arg(long, short, allow_hyphen_values = true)]
        amount: Option<String>,
        /// Food, Travel, Utilities, Entertainment or Other
        #[arg(long, short)]
        category: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Resubmit the last failed expense with its original key
        #[arg(long, conflicts_with_all = ["amount", "category", "description", "date"])]
        retry: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List expenses with their total
    List {
        /// Only show one category
        #[arg(long, short)]
        category: Option<String>,
        /// date_desc (newest first) or date_asc
        #[arg(long, short, default_value = "date_desc")]
        sort: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or change client settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage the local event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email, username, password, json } => {
            login::run(email, username, password, json)
        }
        Commands::Register { full_name, username, email, password, json } => {
            register::run(full_name, username, email, password, json)
        }
        Commands::Logout { json } => logout::run(json),
        Commands::Status { json } => status::run(json),
        Commands::Add { amount, category, description, date, retry, json } => {
            if retry {
                add::run_retry(json)
            } else {
                add::run(
                    add::AddArgs {
                        amount,
                        category,
                        description,
                        date,
                    },
                    json,
                )
            }
        }
        Commands::List { category, sort, json } => list::run(category, &sort, json),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
