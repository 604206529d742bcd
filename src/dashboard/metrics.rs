use db::Observation;

/// Placeholder shown when a field has no values at all
pub const MISSING: &str = "n/d";

/// Summary figures over the rows shown on the dashboard.
///
/// Means are kept unrounded; rounding to one decimal place only happens in
/// the `display_*` helpers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub records: usize,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub feels_like_c: Option<f64>,
}

/// One labelled figure ready to be shown
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
}

impl Metrics {
    pub fn compute(rows: &[Observation]) -> Self {
        Self {
            records: rows.len(),
            temperature_c: mean(rows.iter().map(|r| r.temperature_c)),
            humidity_pct: mean(rows.iter().map(|r| r.humidity_pct)),
            wind_speed_kmh: mean(rows.iter().map(|r| r.wind_speed_kmh)),
            feels_like_c: mean(rows.iter().map(|r| r.feels_like_c)),
        }
    }

    pub fn display_temperature(&self) -> String {
        one_decimal(self.temperature_c, "°C")
    }

    pub fn display_humidity(&self) -> String {
        one_decimal(self.humidity_pct, "%")
    }

    pub fn display_wind_speed(&self) -> String {
        one_decimal(self.wind_speed_kmh, "km/h")
    }

    pub fn display_feels_like(&self) -> String {
        one_decimal(self.feels_like_c, "°C")
    }

    pub fn tiles(&self) -> Vec<MetricTile> {
        vec![
            MetricTile {
                label: "Registros",
                value: self.records.to_string(),
            },
            MetricTile {
                label: "Temperatura promedio",
                value: self.display_temperature(),
            },
            MetricTile {
                label: "Humedad promedio",
                value: self.display_humidity(),
            },
            MetricTile {
                label: "Viento promedio",
                value: self.display_wind_speed(),
            },
            MetricTile {
                label: "Sensación térmica promedio",
                value: self.display_feels_like(),
            },
        ]
    }
}

/// Arithmetic mean of the present values; `None` when nothing is present
pub fn mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn one_decimal(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1} {}", v, unit),
        None => MISSING.to_string(),
    }
}
