use super::types::{CurrentConditions, J1Report};
use crate::core::providers::build_http_client_with_timeout;
use crate::error::WeatherError;
use reqwest::Client;
use url::Url;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://wttr.in";
const WEATHER_TIMEOUT_SECS: u64 = 15;

/// Text shown for any failed lookup.
pub fn lookup_failed_message(city: &str) -> String {
    format!("Weather lookup failed for \"{}\"", city.trim())
}

/// One-shot lookups against a wttr.in-compatible service.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_http_client_with_timeout(WEATHER_TIMEOUT_SECS),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/{city}?format=<format>`, with the city percent-encoded as
    /// one path segment.
    pub fn lookup_url(&self, city: &str, format: &str) -> Result<Url, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }

        let mut url = Url::parse(self.base_url.trim())
            .map_err(|error| WeatherError::Request(format!("invalid base URL: {error}")))?;
        url.path_segments_mut()
            .map_err(|()| WeatherError::Request("base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .push(city);
        url.query_pairs_mut().clear().append_pair("format", format);
        Ok(url)
    }

    async fn fetch(&self, city: &str, format: &str) -> Result<String, WeatherError> {
        let url = self.lookup_url(city, format)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| WeatherError::Request(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|error| WeatherError::Request(error.to_string()))
    }

    /// One-line summary (`format=3`), e.g. `Wenzhou: ⛅️  +21°C`.
    pub async fn summary(&self, city: &str) -> Result<String, WeatherError> {
        let body = self.fetch(city, "3").await?;
        let line = body.trim();
        if line.is_empty() {
            return Err(WeatherError::Payload("empty summary".to_string()));
        }
        Ok(line.to_string())
    }

    /// Structured current conditions (`format=j1`).
    pub async fn current_conditions(&self, city: &str) -> Result<CurrentConditions, WeatherError> {
        let body = self.fetch(city, "j1").await?;
        parse_current_conditions(&body)
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, WeatherError> {
    raw.trim()
        .parse()
        .map_err(|_| WeatherError::Payload(format!("{field} is not a number: {raw:?}")))
}

pub(super) fn parse_current_conditions(body: &str) -> Result<CurrentConditions, WeatherError> {
    let report: J1Report =
        serde_json::from_str(body).map_err(|error| WeatherError::Payload(error.to_string()))?;
    let current = report
        .current_condition
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Payload("no current_condition entry".to_string()))?;

    Ok(CurrentConditions {
        description: current
            .weather_desc
            .into_iter()
            .next()
            .map(|desc| desc.value.trim().to_string())
            .unwrap_or_default(),
        temp_c: parse_number("temp_C", &current.temp_c)?,
        feels_like_c: parse_number("FeelsLikeC", &current.feels_like_c)?,
        humidity: parse_number("humidity", &current.humidity)?,
    })
}
