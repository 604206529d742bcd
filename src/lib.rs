//! Hourly weather extraction into the `clima` table and a dashboard over it.
//!
//! - [`etl`] and [`scheduler`] drive the periodic extraction job;
//! - [`extractor`] talks to the weather provider;
//! - [`reader`], [`cache`] and [`dashboard`] serve the presentation side.
//!
//! Storage itself lives in the `db` crate.
pub mod cache;
pub mod dashboard;
pub mod etl;
pub mod extractor;
pub mod reader;
pub mod scheduler;
pub mod settings;

pub use settings::Settings;

/// `outer: inner: root cause` rendering of an error and its sources
pub fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    anyhow::Chain::new(err)
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}
