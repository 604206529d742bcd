//! Extraction of current weather observations from a remote provider.
use db::Observation;
use thiserror::Error;

pub mod weatherstack;

pub use weatherstack::WeatherstackExtractor;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The wrapped error has its URL stripped since the query carries the API key
    #[error("Request for {city} failed")]
    Request {
        city: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Weather provider returned status {status} for {city}")]
    Status {
        city: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse weather provider response for {city}")]
    Decode {
        city: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Weather provider error {code} for {city}: {info}")]
    Provider {
        city: String,
        code: i64,
        info: String,
    },

    #[error("Weather provider response for {city} has no current conditions")]
    MissingData { city: String },
}

/// One extraction run: no input, zero or more observations, or a failure.
pub trait Extractor {
    fn extract(&mut self) -> Result<Vec<Observation>, ExtractError>;
}

impl<E: Extractor + ?Sized> Extractor for Box<E> {
    fn extract(&mut self) -> Result<Vec<Observation>, ExtractError> {
        (**self).extract()
    }
}
