use serde::{Deserialize, Serialize};
use std::fmt;

/// Current conditions from the `format=j1` report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub description: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity: u8,
}

impl fmt::Display for CurrentConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}°C (feels like {}°C), humidity {}%",
            self.description, self.temp_c, self.feels_like_c, self.humidity
        )
    }
}

// wttr.in reports every number as a string.
#[derive(Debug, Deserialize)]
pub(super) struct J1Report {
    #[serde(default)]
    pub(super) current_condition: Vec<J1Condition>,
}

#[derive(Debug, Deserialize)]
pub(super) struct J1Condition {
    #[serde(rename = "temp_C")]
    pub(super) temp_c: String,
    #[serde(rename = "FeelsLikeC")]
    pub(super) feels_like_c: String,
    pub(super) humidity: String,
    #[serde(rename = "weatherDesc", default)]
    pub(super) weather_desc: Vec<J1Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct J1Value {
    pub(super) value: String,
}
