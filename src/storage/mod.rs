//! Local persistent state: a JSON key/value file plus typed views over it.

mod local;
pub mod preferences;
pub mod settings;

pub use local::LocalStorage;
pub use preferences::{PreferencesStore, Theme};
pub use settings::{Settings, SettingsStore, normalize_base_url};
