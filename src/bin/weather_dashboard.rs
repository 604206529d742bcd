/// Weather dashboard: serves the `clima` table as an HTML page with metrics,
/// charts and a city filter, plus the raw rows as JSON.
use anyhow::Context;
use clap::{Arg, Command};
use env_logger::Env;
use log::{error, info};
use parking_lot::Mutex;
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

use db::WeatherStore;
use weather_etl::dashboard::html::{self, DashboardQuery};
use weather_etl::dashboard::{DashboardService, DashboardView};
use weather_etl::scheduler::SystemClock;
use weather_etl::Settings;

type SharedService = Arc<Mutex<DashboardService<WeatherStore, SystemClock>>>;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Handles `GET /`: one read-and-render pass for the requested selection
async fn dashboard_page(raw_query: String, service: SharedService) -> Result<impl warp::Reply, Infallible> {
    let query = DashboardQuery::parse(&raw_query);
    if query.refresh {
        info!("Manual refresh requested");
    }

    let selection = query.selection;
    let view = tokio::task::spawn_blocking(move || service.lock().view(&selection)).await;

    let view = view.unwrap_or_else(|e| {
        error!("Dashboard pass failed: {}", e);
        DashboardView::no_data(Some("Error interno al generar el tablero".to_string()))
    });
    Ok(warp::reply::html(html::page(&view)))
}

/// Handles `GET /api/observations`: the rows behind the dashboard
async fn list_observations(service: SharedService) -> Result<impl warp::Reply, Infallible> {
    let snapshot = tokio::task::spawn_blocking(move || service.lock().snapshot()).await;

    let reply = match snapshot {
        Ok(snapshot) if snapshot.is_available() => {
            warp::reply::with_status(warp::reply::json(&snapshot.rows), StatusCode::OK)
        }
        Ok(snapshot) => warp::reply::with_status(
            warp::reply::json(&ErrorResponse {
                error: snapshot.warning.unwrap_or_default(),
            }),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        Err(e) => {
            error!("Reading observations failed: {}", e);
            warp::reply::with_status(
                warp::reply::json(&ErrorResponse {
                    error: e.to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    };
    Ok(reply)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("Weather dashboard")
        .version("0.1.0")
        .author("Kirill Dubovikov <dubovikov.kirill@gmail.com>")
        .about("Dashboard over the clima weather table")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .default_value("config"),
        )
        .get_matches();

    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config");
    let settings = Settings::new(config).context("Error while reading settings")?;

    let addr: SocketAddr = format!("{}:{}", settings.dashboard.host, settings.dashboard.port)
        .parse()
        .context("Invalid address")?;

    let store = WeatherStore::open(&settings.database.url)
        .with_context(|| format!("Error opening database {}", settings.database.url))?;
    let service: SharedService = Arc::new(Mutex::new(DashboardService::new(
        store,
        settings.dashboard.cache_ttl(),
        SystemClock,
    )));

    info!("Listening on http://{}", addr);
    warp::serve(routes(service)).run(addr).await;

    Ok(())
}

/// `GET /` and `GET /api/observations`, with request logging
fn routes(
    service: SharedService,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_service = warp::any().map(move || service.clone());

    let page = warp::path::end()
        .and(warp::get())
        .and(
            warp::query::raw()
                .or(warp::any().map(String::new))
                .unify(),
        )
        .and(with_service.clone())
        .and_then(dashboard_page);

    let api = warp::path!("api" / "observations")
        .and(warp::get())
        .and(with_service)
        .and_then(list_observations)
        .with(warp::cors().allow_any_origin().allow_methods(vec!["GET"]));

    page.or(api).with(warp::log("weather_dashboard"))
}
