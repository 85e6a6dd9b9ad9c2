use thiserror::Error;

// ─── Chat exchange errors ────────────────────────────────────────────────────

/// Errors a chat exchange can surface to the user.
///
/// Every variant is recoverable: the caller renders it as an inline transcript
/// entry and is ready for the next exchange. Malformed event lines inside a
/// stream are not represented here; they are skipped and logged.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{field} is not configured; run `skychat settings set`")]
    ConfigurationMissing { field: &'static str },

    #[error("request failed ({status}): {body}")]
    RequestFailed { status: u16, body: String },

    #[error("connection lost: {message}")]
    TransportFailed { message: String, partial: String },

    #[error("exchange cancelled")]
    Cancelled { partial: String },

    #[error("another exchange is still in flight")]
    ExchangeInFlight,

    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

impl ChatError {
    /// Assistant text that had already been rendered when the error occurred.
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            Self::TransportFailed { partial, .. } | Self::Cancelled { partial } => {
                Some(partial.as_str()).filter(|text| !text.is_empty())
            }
            _ => None,
        }
    }
}

// ─── Storage errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt storage file {path}: {message}")]
    Corrupt { path: String, message: String },

    #[error("failed to encode value for key {key}: {message}")]
    Encode { key: String, message: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

// ─── Weather errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("city name is empty")]
    EmptyCity,

    #[error("weather request failed: {0}")]
    Request(String),

    #[error("weather service returned {0}")]
    Status(u16),

    #[error("unexpected weather payload: {0}")]
    Payload(String),
}
