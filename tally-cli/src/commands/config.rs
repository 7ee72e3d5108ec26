//! Config command - inspect and change settings.json

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use tally_core::config::Config;

use super::get_tally_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Point the client at another backend
    SetUrl {
        /// Base URL, e.g. https://api.example.com/api/v1
        url: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let tally_dir = get_tally_dir()?;
    std::fs::create_dir_all(&tally_dir)?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&tally_dir)?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "apiBaseUrl": config.api_base_url,
                        "requestTimeoutSecs": config.request_timeout.as_secs(),
                        "submitTimeoutSecs": config.submit_timeout.as_secs(),
                        "successDisplaySecs": config.success_display.as_secs(),
                    })
                );
                return Ok(());
            }
            println!("{}", "Settings".bold());
            let mut table = output::create_table();
            table.add_row(vec!["API base URL".to_string(), config.api_base_url.clone()]);
            table.add_row(vec![
                "Request timeout".to_string(),
                format!("{}s", config.request_timeout.as_secs()),
            ]);
            table.add_row(vec![
                "Submit timeout".to_string(),
                format!("{}s", config.submit_timeout.as_secs()),
            ]);
            table.add_row(vec![
                "Success message".to_string(),
                format!("{}s", config.success_display.as_secs()),
            ]);
            println!("{}", table);
        }
        ConfigCommands::SetUrl { url } => {
            let mut config = Config::load(&tally_dir)?;
            config.set_api_base_url(&url)?;
            config.save(&tally_dir)?;
            output::success(&format!("API base URL set to {}", config.api_base_url));
            if std::env::var("TALLY_API_URL").is_ok() {
                output::warning("TALLY_API_URL is set and overrides this setting.");
            }
        }
    }
    Ok(())
}
