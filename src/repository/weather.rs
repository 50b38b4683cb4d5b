//! Sunrise and sunset times from the sunrise-sunset.org API.

use crate::error::{AppError, AppResult};
use crate::http_config::HttpConfig;
use crate::models::{SolarResult, SunriseSunsetResponse};
use crate::utils::circuit_breaker::CircuitBreaker;
use crate::utils::logging;
use crate::utils::retry::retry_with_exponential_backoff;
use log::{debug, warn};
use reqwest::Client;
use std::sync::Arc;
use url::Url;

pub struct WeatherRepository {
    client: Client,
    endpoint: Url,
    http: HttpConfig,
    breaker: Arc<CircuitBreaker>,
}

impl WeatherRepository {
    /// `base_url` is the API root, e.g. `https://api.sunrise-sunset.org/`.
    pub fn new(base_url: &str, http: HttpConfig, breaker: Arc<CircuitBreaker>) -> AppResult<Self> {
        let endpoint = json_endpoint(base_url)?;
        let client = http.build_client()?;
        Ok(Self { client, endpoint, http, breaker })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Never fails: transport and API errors come back as `SolarResult::Error`.
    pub async fn fetch_solar_data(&self, latitude: f64, longitude: f64) -> SolarResult {
        if !valid_coordinates(latitude, longitude) {
            return SolarResult::Error(format!("Invalid coordinates: {}, {}", latitude, longitude));
        }

        match self.request_sun_times(latitude, longitude).await {
            Ok(response) => {
                let result = SolarResult::from(response);
                if let SolarResult::Error(message) = &result {
                    warn!("Sunrise-sunset API rejected ({}, {}): {}", latitude, longitude, message);
                }
                result
            }
            Err(e) => {
                logging::log_error_with_context(&e, "Sunrise-sunset request");
                let message = format!("{:#}", e);
                if message.trim().is_empty() {
                    SolarResult::Error("Network error".to_string())
                } else {
                    SolarResult::Error(message)
                }
            }
        }
    }

    async fn request_sun_times(&self, latitude: f64, longitude: f64) -> anyhow::Result<SunriseSunsetResponse> {
        let retry_config = self.http.to_retry_config();
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        self.breaker
            .execute(move || async move {
                retry_with_exponential_backoff(&retry_config, || {
                    let client = client.clone();
                    let endpoint = endpoint.clone();
                    async move {
                        debug!("GET {} lat={} lng={}", endpoint, latitude, longitude);
                        let response = client
                            .get(endpoint)
                            .query(&[
                                ("lat", latitude.to_string()),
                                ("lng", longitude.to_string()),
                                ("formatted", "0".to_string()),
                            ])
                            .send()
                            .await?
                            .error_for_status()?;
                        let body = response.json::<SunriseSunsetResponse>().await?;
                        Ok::<_, anyhow::Error>(body)
                    }
                })
                .await
            })
            .await
    }
}

fn json_endpoint(base_url: &str) -> AppResult<Url> {
    let mut base = Url::parse(base_url.trim())
        .map_err(|e| AppError::config(format!("invalid solar API URL '{}': {}", base_url, e)))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("json")
        .map_err(|e| AppError::config(format!("invalid solar API URL '{}': {}", base_url, e)))
}

fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}
