use config::{self, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prefix of the environment variables that override file settings,
/// e.g. `WEATHER_DATABASE__URL` or `WEATHER_EXTRACTOR__CITIES=Bogota,Cali`
pub const ENV_PREFIX: &str = "WEATHER";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    /// SQLite database file, or `:memory:`
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtractorSettings {
    pub base_url: String,
    pub api_key: String,
    pub cities: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SchedulerSettings {
    pub interval_secs: u64,
    pub poll_secs: u64,
    pub run_on_start: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DashboardSettings {
    pub host: String,
    pub port: u16,
    pub cache_ttl_secs: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub extractor: ExtractorSettings,
    pub scheduler: SchedulerSettings,
    pub dashboard: DashboardSettings,
}

impl Settings {
    /// Read settings from the defaults, the config file (if present) and the
    /// environment, in that order of precedence
    pub fn new(config_path: &str) -> Result<Self, ConfigError> {
        Self::load(config_path, environment())
    }

    fn load(config_path: &str, env: Environment) -> Result<Self, ConfigError> {
        log::info!("Reading config file {}", config_path);
        let settings: Settings = Self::builder()?
            .add_source(File::with_name(config_path).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        settings.scheduler.validate()?;
        Ok(settings)
    }

    /// Settings made only of the built-in defaults
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("database.url", "weather.sqlite")?
            .set_default("extractor.base_url", "http://api.weatherstack.com")?
            .set_default("extractor.api_key", "")?
            .set_default(
                "extractor.cities",
                vec!["Bogota", "Medellin", "Cali", "Barranquilla", "Cartagena"],
            )?
            .set_default("extractor.timeout_secs", 10)?
            .set_default("scheduler.interval_secs", 3600)?
            .set_default("scheduler.poll_secs", 60)?
            .set_default("scheduler.run_on_start", false)?
            .set_default("dashboard.host", "127.0.0.1")?
            .set_default("dashboard.port", 8501)?
            .set_default("dashboard.cache_ttl_secs", 60)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("extractor.cities")
        .try_parsing(true)
}

/// Longest accepted `scheduler.interval_secs`: one year
pub const MAX_INTERVAL_SECS: u64 = 366 * 24 * 60 * 60;

impl SchedulerSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 || self.interval_secs > MAX_INTERVAL_SECS {
            return Err(ConfigError::Message(format!(
                "scheduler.interval_secs must be between 1 and {}, got {}",
                MAX_INTERVAL_SECS, self.interval_secs
            )));
        }
        if self.poll_secs == 0 {
            return Err(ConfigError::Message(
                "scheduler.poll_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }
}

impl DashboardSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl ExtractorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
