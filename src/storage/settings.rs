use super::LocalStorage;
use crate::config::SettingsOverrides;
use crate::error::{ChatError, StorageError};

pub const API_KEY_KEY: &str = "apiKey";
pub const API_BASE_URL_KEY: &str = "apiBaseUrl";
pub const SELECTED_MODEL_KEY: &str = "selectedModel";

/// Connection settings for the chat endpoint. Passed explicitly into every
/// request rather than read from ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
}

impl Settings {
    pub fn new(
        api_key: impl Into<String>,
        api_base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: api_base_url.into(),
            model: model.into(),
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: &SettingsOverrides) -> Self {
        if let Some(key) = &overrides.api_key {
            self.api_key.clone_from(key);
        }
        if let Some(url) = &overrides.api_base_url {
            self.api_base_url.clone_from(url);
        }
        if let Some(model) = &overrides.model {
            self.model.clone_from(model);
        }
        self
    }

    /// Endpoint credentials only; enough for listing models.
    pub fn require_endpoint(&self) -> Result<(), ChatError> {
        if self.api_key.trim().is_empty() {
            return Err(ChatError::ConfigurationMissing { field: API_KEY_KEY });
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ChatError::ConfigurationMissing {
                field: API_BASE_URL_KEY,
            });
        }
        Ok(())
    }

    /// Everything a chat completion needs.
    pub fn require_chat(&self) -> Result<(), ChatError> {
        self.require_endpoint()?;
        if self.model.trim().is_empty() {
            return Err(ChatError::ConfigurationMissing { field: "model" });
        }
        Ok(())
    }

    /// API key with everything but the last four characters masked.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.is_empty() {
            return String::new();
        }
        let visible = chars.len().min(4);
        let tail: String = chars[chars.len() - visible..].iter().collect();
        format!("{}{tail}", "*".repeat(chars.len() - visible))
    }
}

/// Validate and normalize an API base URL: absolute, `http` or `https`,
/// without a trailing slash.
pub fn normalize_base_url(raw: &str) -> Result<String, StorageError> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed).map_err(|err| StorageError::InvalidValue {
        key: API_BASE_URL_KEY,
        message: format!("{trimmed:?} is not an absolute URL ({err})"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(StorageError::InvalidValue {
            key: API_BASE_URL_KEY,
            message: format!("scheme must be http or https, got {}", parsed.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    storage: LocalStorage,
}

impl SettingsStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    fn read(&self, key: &str) -> String {
        self.storage
            .get_item(key)
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }

    pub fn load(&self) -> Settings {
        Settings {
            api_key: self.read(API_KEY_KEY),
            api_base_url: self.read(API_BASE_URL_KEY),
            model: self.read(SELECTED_MODEL_KEY),
        }
    }

    /// Overwrite the stored settings. Key and base URL are required; an empty
    /// model keeps the previously selected one.
    pub fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        let api_key = settings.api_key.trim();
        if api_key.is_empty() {
            return Err(StorageError::InvalidValue {
                key: API_KEY_KEY,
                message: "must not be empty".into(),
            });
        }
        let base_url = normalize_base_url(&settings.api_base_url)?;

        self.storage.set_item(API_KEY_KEY, api_key)?;
        self.storage.set_item(API_BASE_URL_KEY, base_url)?;
        self.select_model(&settings.model)
    }

    pub fn select_model(&self, model: &str) -> Result<(), StorageError> {
        let model = model.trim();
        if model.is_empty() {
            return Ok(());
        }
        self.storage.set_item(SELECTED_MODEL_KEY, model)
    }
}
