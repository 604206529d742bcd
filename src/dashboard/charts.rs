//! Chart descriptions for the dashboard and their plotly rendering.
//!
//! [`chart_specs`] only describes what to draw; [`to_plot`] turns a
//! description into a `plotly::Plot`, so the selection of data stays testable
//! without the charting library.
use db::Observation;
use plotly::common::{Mode, Title};
use plotly::layout::Axis;
use plotly::{Bar, Layout, Plot, Scatter};

use super::metrics::mean;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// Stable identifier, used as the HTML element id
    pub id: &'static str,
    pub title: &'static str,
    pub y_label: &'static str,
    pub kind: ChartKind,
    pub series: Vec<Series>,
}

/// One chart per numeric field over `rows`
pub fn chart_specs(rows: &[Observation]) -> Vec<ChartSpec> {
    let cities = cities_in_order(rows);

    vec![
        ChartSpec {
            id: "temperatura",
            title: "Temperatura por ciudad",
            y_label: "°C",
            kind: ChartKind::Line,
            series: cities
                .iter()
                .map(|city| temperature_over_time(rows, city))
                .collect(),
        },
        ChartSpec {
            id: "humedad",
            title: "Humedad promedio por ciudad",
            y_label: "%",
            kind: ChartKind::Bar,
            series: vec![mean_per_city(rows, &cities, "Humedad", |r| r.humidity_pct)],
        },
        ChartSpec {
            id: "velocidad_viento",
            title: "Velocidad del viento",
            y_label: "km/h",
            kind: ChartKind::Scatter,
            series: vec![Series {
                name: "Viento".to_string(),
                x: rows.iter().map(|r| r.city.clone()).collect(),
                y: rows.iter().map(|r| r.wind_speed_kmh).collect(),
            }],
        },
        ChartSpec {
            id: "sensacion_termica",
            title: "Sensación térmica promedio por ciudad",
            y_label: "°C",
            kind: ChartKind::Bar,
            series: vec![mean_per_city(rows, &cities, "Sensación térmica", |r| {
                r.feels_like_c
            })],
        },
    ]
}

/// Builds the plotly figure for `spec`
pub fn to_plot(spec: &ChartSpec) -> Plot {
    let mut plot = Plot::new();

    for series in &spec.series {
        let x = series.x.clone();
        let y = series.y.clone();
        let name = series.name.as_str();
        match spec.kind {
            ChartKind::Line => {
                plot.add_trace(Scatter::new(x, y).name(name).mode(Mode::LinesMarkers))
            }
            ChartKind::Bar => plot.add_trace(Bar::new(x, y).name(name)),
            ChartKind::Scatter => plot.add_trace(Scatter::new(x, y).name(name).mode(Mode::Markers)),
        }
    }

    plot.set_layout(
        Layout::new()
            .title(Title::with_text(spec.title))
            .y_axis(Axis::new().title(Title::with_text(spec.y_label))),
    );
    plot
}

/// Distinct cities in the order they first appear
pub fn cities_in_order(rows: &[Observation]) -> Vec<String> {
    let mut cities: Vec<String> = Vec::new();
    for row in rows {
        if !cities.contains(&row.city) {
            cities.push(row.city.clone());
        }
    }
    cities
}

fn temperature_over_time(rows: &[Observation], city: &str) -> Series {
    let mut points: Vec<(String, Option<f64>)> = rows
        .iter()
        .filter(|r| r.city == city)
        .map(|r| {
            let at = r
                .extracted_at
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_default();
            (at, r.temperature_c)
        })
        .collect();
    // the snapshot is newest first, lines read left to right
    points.sort_by(|a, b| a.0.cmp(&b.0));

    let (x, y) = points.into_iter().unzip();
    Series {
        name: city.to_string(),
        x,
        y,
    }
}

fn mean_per_city<F>(rows: &[Observation], cities: &[String], name: &str, field: F) -> Series
where
    F: Fn(&Observation) -> Option<f64>,
{
    Series {
        name: name.to_string(),
        x: cities.to_vec(),
        y: cities
            .iter()
            .map(|city| mean(rows.iter().filter(|r| &r.city == city).map(&field)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(city: &str, hour: u32, temp: f64, humidity: f64) -> Observation {
        Observation {
            temperature_c: Some(temp),
            humidity_pct: Some(humidity),
            extracted_at: NaiveDate::from_ymd_opt(2024, 5, 2)
                .unwrap()
                .and_hms_opt(hour, 0, 0),
            ..Observation::new(city)
        }
    }

    fn rows() -> Vec<Observation> {
        // newest first, as read from the store
        vec![
            obs("Cali", 12, 28.0, 55.0),
            obs("Bogota", 12, 15.0, 80.0),
            obs("Cali", 11, 27.0, 65.0),
            obs("Bogota", 11, 14.0, 84.0),
        ]
    }

    #[test]
    fn test_one_chart_per_numeric_field() {
        let specs = chart_specs(&rows());
        let ids: Vec<&str> = specs.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec!["temperatura", "humedad", "velocidad_viento", "sensacion_termica"]
        );
    }

    #[test]
    fn test_temperature_lines_run_oldest_to_newest() {
        let specs = chart_specs(&rows());
        let temperature = &specs[0];
        assert_eq!(temperature.kind, ChartKind::Line);
        assert_eq!(temperature.series.len(), 2);

        let cali = &temperature.series[0];
        assert_eq!(cali.name, "Cali");
        assert_eq!(cali.x, vec!["2024-05-02 11:00:00", "2024-05-02 12:00:00"]);
        assert_eq!(cali.y, vec![Some(27.0), Some(28.0)]);
    }

    #[test]
    fn test_humidity_is_averaged_per_city() {
        let specs = chart_specs(&rows());
        let humidity = &specs[1].series[0];
        assert_eq!(humidity.x, vec!["Cali", "Bogota"]);
        assert_eq!(humidity.y, vec![Some(60.0), Some(82.0)]);
    }

    #[test]
    fn test_plot_has_a_trace_per_series() {
        let specs = chart_specs(&rows());
        let html = to_plot(&specs[0]).to_inline_html(Some("temperatura"));
        assert!(html.contains("temperatura"));
        assert!(html.contains("Cali"));
        assert!(html.contains("Bogota"));
    }
}
