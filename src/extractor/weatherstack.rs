use db::Observation;
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{ExtractError, Extractor};
use crate::describe_error;
use crate::settings::ExtractorSettings;

/// Fetches current conditions for a fixed list of cities from Weatherstack.
#[derive(Debug, Clone)]
pub struct WeatherstackExtractor {
    base_url: String,
    api_key: String,
    cities: Vec<String>,
    http: Client,
}

impl WeatherstackExtractor {
    pub fn new(settings: &ExtractorSettings) -> Result<Self, ExtractError> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(ExtractError::Client)?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            cities: settings.cities.clone(),
            http,
        })
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    fn fetch_current(&self, city: &str) -> Result<Observation, ExtractError> {
        let url = format!("{}/current", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("access_key", self.api_key.as_str()),
                ("query", city),
                ("units", "m"),
            ])
            .send()
            .map_err(|source| ExtractError::Request {
                city: city.to_string(),
                source: source.without_url(),
            })?;

        let status = res.status();
        let body = res.text().map_err(|source| ExtractError::Request {
            city: city.to_string(),
            source: source.without_url(),
        })?;

        if !status.is_success() {
            return Err(ExtractError::Status {
                city: city.to_string(),
                status,
            });
        }

        parse_current(city, &body)
    }
}

impl Extractor for WeatherstackExtractor {
    fn extract(&mut self) -> Result<Vec<Observation>, ExtractError> {
        let mut observations = Vec::with_capacity(self.cities.len());
        let mut last_error = None;

        for city in &self.cities {
            match self.fetch_current(city) {
                Ok(obs) => {
                    debug!("Fetched current weather for {}", city);
                    observations.push(obs);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", city, describe_error(&e));
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if observations.is_empty() => Err(e),
            _ => Ok(observations),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WsError {
    code: i64,
    info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WsCurrent {
    temperature: Option<f64>,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    feelslike: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WsResponse {
    error: Option<WsError>,
    current: Option<WsCurrent>,
}

/// Maps a `/current` response body to an observation for `city`.
/// The configured city name is kept rather than the provider's location name.
fn parse_current(city: &str, body: &str) -> Result<Observation, ExtractError> {
    let parsed: WsResponse = serde_json::from_str(body).map_err(|source| ExtractError::Decode {
        city: city.to_string(),
        source,
    })?;

    if let Some(error) = parsed.error {
        return Err(ExtractError::Provider {
            city: city.to_string(),
            code: error.code,
            info: error.info.unwrap_or_default(),
        });
    }

    let current = parsed.current.ok_or_else(|| ExtractError::MissingData {
        city: city.to_string(),
    })?;

    Ok(Observation {
        temperature_c: current.temperature,
        humidity_pct: current.humidity,
        wind_speed_kmh: current.wind_speed,
        feels_like_c: current.feelslike,
        ..Observation::new(city)
    })
}
