use super::LocalStorage;
use crate::error::StorageError;
use std::str::FromStr;
use strum::{Display, EnumString};

pub const THEME_KEY: &str = "theme";
pub const PREFERRED_CITY_KEY: &str = "preferredCity";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Presentation preferences that live next to the chat data.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    storage: LocalStorage,
}

impl PreferencesStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub fn theme(&self) -> Theme {
        self.storage
            .get_item(THEME_KEY)
            .and_then(|raw| Theme::from_str(raw.trim()).ok())
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.storage.set_item(THEME_KEY, theme.to_string())
    }

    pub fn toggle_theme(&self) -> Result<Theme, StorageError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    pub fn preferred_city(&self, fallback: &str) -> String {
        self.storage
            .get_item(PREFERRED_CITY_KEY)
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn set_preferred_city(&self, city: &str) -> Result<(), StorageError> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(());
        }
        self.storage.set_item(PREFERRED_CITY_KEY, city)
    }
}
