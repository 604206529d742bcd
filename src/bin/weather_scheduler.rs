/// Weather ETL job: pulls current weather for the configured cities every
/// interval and appends it to the `clima` table.
use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use env_logger::Env;
use log::{info, warn};

use db::WeatherStore;
use weather_etl::etl::EtlJob;
use weather_etl::extractor::WeatherstackExtractor;
use weather_etl::scheduler::{Scheduler, StopSignal, SystemClock};
use weather_etl::Settings;

fn main() -> anyhow::Result<()> {
    let matches = Command::new("Weather ETL")
        .version("0.1.0")
        .author("Kirill Dubovikov <dubovikov.kirill@gmail.com>")
        .about("Periodic weather extraction into the clima table")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .default_value("config"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Runs a single extraction cycle and exits")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config");
    let settings = Settings::new(config).context("Error while reading settings")?;

    let store = WeatherStore::open(&settings.database.url)
        .with_context(|| format!("Error opening database {}", settings.database.url))?;

    if settings.extractor.api_key.is_empty() {
        warn!("No Weatherstack API key configured, requests will be rejected");
    }
    let extractor = WeatherstackExtractor::new(&settings.extractor)?;
    info!("Extracting weather for {}", settings.extractor.cities.join(", "));

    let mut job = EtlJob::new(extractor, store);

    if matches.get_flag("once") {
        let report = job.run_cycle().context("Extraction cycle failed")?;
        info!("✅ ETL completed: {} rows written", report.written);
        return Ok(());
    }

    info!("🚀 ETL automation started");
    let stop = StopSignal::new();
    Scheduler::new(settings.scheduler.interval(), settings.scheduler.poll())
        .run_on_start(settings.scheduler.run_on_start)
        .run(&mut job, &SystemClock, &stop);

    Ok(())
}
