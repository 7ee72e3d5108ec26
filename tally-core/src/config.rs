//! Configuration management
//!
//! Read from `settings.json` in the tally directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:3000/api/v1", "requestTimeoutSecs": 30, "submitTimeoutSecs": 15 },
//!   "ui": { "successDisplaySecs": 3 }
//! }
//! ```
//! Keys this crate does not manage are kept when the file is saved.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::http::{API_URL_ENV, DEFAULT_BASE_URL};
use crate::services::SubmissionSettings;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    ui: UiSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    submit_timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    success_display_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub submit_timeout: Duration,
    pub success_display: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            submit_timeout: Duration::from_secs(15),
            success_display: Duration::from_secs(3),
        }
    }
}

fn read_settings(tally_dir: &Path) -> Result<SettingsFile> {
    let settings_path = tally_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

impl Config {
    /// Load config from the tally directory.
    ///
    /// `TALLY_API_URL` overrides the base URL from the file.
    pub fn load(tally_dir: &Path) -> Result<Self> {
        let raw = read_settings(tally_dir)?;
        let defaults = Self::default();

        let file_url = raw.api.base_url.filter(|u| !u.trim().is_empty());
        let env_url = std::env::var(API_URL_ENV).ok().filter(|u| !u.trim().is_empty());
        let api_base_url = env_url
            .or(file_url)
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let secs = |value: Option<u64>, default: Duration| {
            value.filter(|s| *s > 0).map(Duration::from_secs).unwrap_or(default)
        };

        Ok(Self {
            api_base_url,
            request_timeout: secs(raw.api.request_timeout_secs, defaults.request_timeout),
            submit_timeout: secs(raw.api.submit_timeout_secs, defaults.submit_timeout),
            success_display: secs(raw.ui.success_display_secs, defaults.success_display),
        })
    }

    /// Save config to the tally directory, keeping unmanaged keys
    pub fn save(&self, tally_dir: &Path) -> Result<()> {
        let mut settings = read_settings(tally_dir)?;

        settings.api.base_url = Some(self.api_base_url.clone());
        settings.api.request_timeout_secs = Some(self.request_timeout.as_secs());
        settings.api.submit_timeout_secs = Some(self.submit_timeout.as_secs());
        settings.ui.success_display_secs = Some(self.success_display.as_secs());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(tally_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Set the backend base URL after checking it parses
    pub fn set_api_base_url(&mut self, base_url: &str) -> Result<()> {
        let trimmed = base_url.trim().trim_end_matches('/');
        url::Url::parse(trimmed).map_err(|e| anyhow!("Invalid API base URL '{}': {}", base_url, e))?;
        self.api_base_url = trimmed.to_string();
        Ok(())
    }

    pub fn submission_settings(&self) -> SubmissionSettings {
        SubmissionSettings {
            timeout: self.submit_timeout,
            success_display: self.success_display,
        }
    }
}
