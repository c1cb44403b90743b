//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub admin_id: String,
    /// Channel receiving every seat change alert.
    pub alert_channel_id: u64,
    /// Optional role required to use the watch commands.
    pub watch_role_id: Option<String>,
    pub command_prefix: String,
    pub poll_interval: Duration,
    /// Root of the class schedule pages, `{class_page_url}/{quarter}/{subject}`.
    pub class_page_url: String,
    pub sheets_api_url: String,
    pub sheets_spreadsheet_id: String,
    pub sheets_sheet_name: String,
    /// Service account key file used to sign in to the Sheets API.
    pub sheets_credentials_path: PathBuf,
    pub logs_path: PathBuf,
}

impl Config {
    /// Creates a config holding only defaults. Call [`Config::load`] to fill it.
    pub fn new() -> Self {
        Self {
            discord_token: String::new(),
            admin_id: String::new(),
            alert_channel_id: 0,
            watch_role_id: None,
            command_prefix: "!".to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            class_page_url: "https://www2.bellevuecollege.edu/classes/".to_string(),
            sheets_api_url: "https://sheets.googleapis.com".to_string(),
            sheets_spreadsheet_id: String::new(),
            sheets_sheet_name: "Reminders".to_string(),
            sheets_credentials_path: PathBuf::new(),
            logs_path: PathBuf::from("logs"),
        }
    }

    /// Loads values from the process environment.
    pub fn load(&mut self) -> Result<(), AppError> {
        self.load_from(|key| std::env::var(key).ok())
    }

    /// Loads values through `get`, which maps an environment key to its value.
    pub fn load_from(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<(), AppError> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| AppError::MissingConfig {
                key: key.to_string(),
            })
        };

        self.discord_token = require("DISCORD_TOKEN")?;
        self.admin_id = require("ADMIN_ID")?;
        self.alert_channel_id = require("ALERT_CHANNEL_ID")?
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| AppError::ConfigurationError {
                msg: "ALERT_CHANNEL_ID must be a non-zero channel id".to_string(),
            })?;
        self.sheets_spreadsheet_id = require("SHEETS_SPREADSHEET_ID")?;
        self.sheets_credentials_path = PathBuf::from(require("SHEETS_CREDENTIALS_PATH")?);

        self.watch_role_id = get("WATCH_ROLE_ID");
        if let Some(prefix) = get("COMMAND_PREFIX") {
            self.command_prefix = prefix;
        }
        if let Some(secs) = get("POLL_INTERVAL") {
            self.poll_interval = Duration::from_secs(
                secs.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            );
        }
        if let Some(url) = get("CLASS_PAGE_URL") {
            self.class_page_url = url;
        }
        if let Some(url) = get("SHEETS_API_URL") {
            self.sheets_api_url = url;
        }
        if let Some(name) = get("SHEETS_SHEET_NAME") {
            self.sheets_sheet_name = name;
        }
        if let Some(path) = get("LOGS_PATH") {
            self.logs_path = PathBuf::from(path);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
