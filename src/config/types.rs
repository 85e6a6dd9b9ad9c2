use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Process-local overrides for the stored chat settings (from env vars)
    #[serde(skip)]
    pub settings_overrides: SettingsOverrides,

    /// Directory holding `storage.json`; `~` is expanded
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Most recent prior messages sent with each request; `None` sends all
    #[serde(default)]
    pub history_limit: Option<usize>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,

    #[serde(default = "default_city")]
    pub default_city: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub model: Option<String>,
}

fn default_data_dir() -> String {
    "~/.skychat/data".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_weather_base_url() -> String {
    "https://wttr.in".into()
}

fn default_city() -> String {
    "Wenzhou".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            settings_overrides: SettingsOverrides::default(),
            data_dir: default_data_dir(),
            temperature: default_temperature(),
            history_limit: None,
            request_timeout_secs: default_request_timeout_secs(),
            weather_base_url: default_weather_base_url(),
            default_city: default_city(),
        }
    }
}

impl Config {
    /// Resolved storage directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).into_owned())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            );
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        if self.data_dir.trim().is_empty() {
            bail!("data_dir must not be empty");
        }
        Ok(())
    }
}
