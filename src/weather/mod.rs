mod client;
mod types;

pub use client::{DEFAULT_WEATHER_BASE_URL, WeatherClient, lookup_failed_message};
pub use types::CurrentConditions;
