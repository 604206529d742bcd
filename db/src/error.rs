use thiserror::Error;

/// Errors raised by [`WeatherStore`](crate::WeatherStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Error connecting to {url}")]
    Connection {
        url: String,
        #[source]
        source: diesel::ConnectionError,
    },

    #[error("Query against the weather table failed")]
    Query(#[from] diesel::result::Error),
}
