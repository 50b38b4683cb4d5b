// file: src/models/solar.rs
use serde::{Deserialize, Serialize};

/// Raw body of the sunrise-sunset API (`formatted=0` returns ISO 8601 times).
#[derive(Debug, Clone, Deserialize)]
pub struct SunriseSunsetResponse {
    pub results: SunriseSunsetResults,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SunriseSunsetResults {
    pub sunrise: String,
    pub sunset: String,
    pub solar_noon: String,
    // Seconds when formatted=0, a clock string otherwise.
    pub day_length: serde_json::Value,
    pub civil_twilight_begin: String,
    pub civil_twilight_end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarData {
    pub sunrise: String,
    pub sunset: String,
    pub solar_noon: String,
    pub day_length: String,
    pub civil_twilight_begin: String,
    pub civil_twilight_end: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolarResult {
    Success(SolarData),
    Error(String),
}

impl From<SunriseSunsetResponse> for SolarResult {
    fn from(response: SunriseSunsetResponse) -> Self {
        if !response.status.eq_ignore_ascii_case("OK") {
            return SolarResult::Error(format!("API status: {}", response.status));
        }

        let results = response.results;
        let day_length = match results.day_length {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };

        SolarResult::Success(SolarData {
            sunrise: results.sunrise,
            sunset: results.sunset,
            solar_noon: results.solar_noon,
            day_length,
            civil_twilight_begin: results.civil_twilight_begin,
            civil_twilight_end: results.civil_twilight_end,
        })
    }
}
