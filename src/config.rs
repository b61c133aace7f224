// ⚙️ Configuration
// Fixed defaults, optionally overridden by a JSON file and the environment

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var naming an optional JSON config file
pub const CONFIG_ENV: &str = "AVAILABILITY_WATCH_CONFIG";

/// Env var carrying the webhook URL (kept out of config files and source)
pub const WEBHOOK_ENV: &str = "AVAILABILITY_WATCH_WEBHOOK";

pub const DEFAULT_URL: &str = "https://qlic.com/availabilities/";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Page listing the availabilities
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory holding every file below
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Human-readable latest snapshot
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    /// Lossless latest snapshot (JSON)
    #[serde(default = "default_structured_file")]
    pub structured_file: String,

    /// Append-only log of detected changes
    #[serde(default = "default_change_log_file")]
    pub change_log_file: String,

    /// Random wait between checks, inclusive bounds
    #[serde(default = "default_min_wait_secs")]
    pub min_wait_secs: u64,
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pushcut-style webhook; None = log-only notifications
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    #[serde(default = "default_notification_message")]
    pub notification_message: String,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_snapshot_file() -> String {
    "apartment_data.txt".to_string()
}

fn default_structured_file() -> String {
    "apartment_data.json".to_string()
}

fn default_change_log_file() -> String {
    "apartment_changes.txt".to_string()
}

fn default_min_wait_secs() -> u64 {
    120
}

fn default_max_wait_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_notification_title() -> String {
    "Notification".to_string()
}

fn default_notification_message() -> String {
    "Apartment availability updated!".to_string()
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            url: default_url(),
            user_agent: default_user_agent(),
            data_dir: default_data_dir(),
            snapshot_file: default_snapshot_file(),
            structured_file: default_structured_file(),
            change_log_file: default_change_log_file(),
            min_wait_secs: default_min_wait_secs(),
            max_wait_secs: default_max_wait_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            webhook_url: None,
            notification_title: default_notification_title(),
            notification_message: default_notification_message(),
        }
    }
}

impl WatchConfig {
    /// Load config from JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: WatchConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults, then `$AVAILABILITY_WATCH_CONFIG`, then `$AVAILABILITY_WATCH_WEBHOOK`
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => WatchConfig::from_file(PathBuf::from(path))?,
            None => WatchConfig::default(),
        };

        if let Ok(webhook) = std::env::var(WEBHOOK_ENV) {
            if !webhook.trim().is_empty() {
                config.webhook_url = Some(webhook.trim().to_string());
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_wait_secs > self.max_wait_secs {
            bail!(
                "min_wait_secs ({}) must not exceed max_wait_secs ({})",
                self.min_wait_secs,
                self.max_wait_secs
            );
        }
        if self.url.trim().is_empty() {
            bail!("url must not be empty");
        }
        if reqwest::header::HeaderValue::from_str(&self.user_agent).is_err() {
            bail!("user_agent {:?} is not a valid HTTP header value", self.user_agent);
        }
        Ok(())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }

    pub fn structured_path(&self) -> PathBuf {
        self.data_dir.join(&self.structured_file)
    }

    pub fn change_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.change_log_file)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// TESTS
// ============================================================================
