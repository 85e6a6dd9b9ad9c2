use crate::config::Config;
use crate::core::providers::ChatClient;
use crate::error::WeatherError;
use crate::session::{ChatHistoryStore, ChatSession};
use crate::storage::{LocalStorage, PreferencesStore, Settings, SettingsStore};
use crate::usage::UsageStore;
use crate::weather::{WeatherClient, lookup_failed_message};
use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherFormat {
    /// One-line `format=3` text
    Summary,
    /// Current conditions as prose
    Conditions,
    /// Current conditions as JSON
    Json,
}

/// Everything a command needs, opened once per process.
pub struct AppContext {
    pub config: Config,
    pub settings: SettingsStore,
    pub preferences: PreferencesStore,
    pub session: ChatSession,
    pub weather: WeatherClient,
}

impl AppContext {
    pub fn open(config: Config) -> Result<Self> {
        let data_path = config.data_path();
        let storage = LocalStorage::open(&data_path)
            .with_context(|| format!("Failed to open storage in {}", data_path.display()))?;

        let client = ChatClient::new(config.temperature, config.request_timeout_secs);
        let session = ChatSession::new(
            client,
            ChatHistoryStore::new(storage.clone()),
            UsageStore::new(storage.clone()),
        )
        .with_history_limit(config.history_limit);

        Ok(Self {
            weather: WeatherClient::new(config.weather_base_url.clone()),
            settings: SettingsStore::new(storage.clone()),
            preferences: PreferencesStore::new(storage),
            session,
            config,
        })
    }

    /// Stored settings with any environment overrides applied.
    pub fn current_settings(&self) -> Settings {
        self.settings
            .load()
            .with_overrides(&self.config.settings_overrides)
    }

    pub fn default_city(&self) -> String {
        self.preferences.preferred_city(&self.config.default_city)
    }

    /// Look up `city` and render the result, or the fixed failure message.
    /// A successful lookup becomes the preferred city.
    pub async fn weather_report(&self, city: &str, format: WeatherFormat) -> String {
        let result = match format {
            WeatherFormat::Summary => self.weather.summary(city).await,
            WeatherFormat::Conditions => self
                .weather
                .current_conditions(city)
                .await
                .map(|current| format!("{}: {current}", city.trim())),
            WeatherFormat::Json => {
                self.weather
                    .current_conditions(city)
                    .await
                    .and_then(|current| {
                        serde_json::to_string_pretty(&current)
                            .map_err(|error| WeatherError::Payload(error.to_string()))
                    })
            }
        };

        match result {
            Ok(report) => {
                if let Err(error) = self.preferences.set_preferred_city(city) {
                    tracing::warn!("Failed to remember city: {error}");
                }
                report
            }
            Err(error) => {
                tracing::warn!(city, "Weather lookup failed: {error}");
                lookup_failed_message(city)
            }
        }
    }
}
