//! Presentation of the weather table.
//!
//! [`render`] is a pure function of a [`Snapshot`] and the user's
//! [`CitySelection`]; the hosting server calls it again on every interaction.
use db::Observation;

use crate::reader::Snapshot;

pub mod charts;
pub mod html;
pub mod metrics;
mod service;

pub use charts::{ChartKind, ChartSpec, Series};
pub use metrics::{MetricTile, Metrics};
pub use service::DashboardService;

pub const NO_DATA_NOTICE: &str = "No hay datos disponibles para mostrar.";

/// Which cities the dashboard shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CitySelection {
    #[default]
    All,
    Only(Vec<String>),
}

impl CitySelection {
    fn includes(&self, city: &str) -> bool {
        match self {
            CitySelection::All => true,
            CitySelection::Only(cities) => cities.iter().any(|c| c == city),
        }
    }
}

/// Everything drawn for a non-empty snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Rows in the snapshot, before filtering
    pub total_records: usize,
    /// Distinct cities present in the snapshot, first-seen order
    pub available_cities: Vec<String>,
    pub selected_cities: Vec<String>,
    pub metrics: Metrics,
    /// Filtered rows, newest first
    pub rows: Vec<Observation>,
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// Nothing to show; `warning` explains a failed read
    NoData {
        notice: String,
        warning: Option<String>,
    },
    Ready(Report),
}

impl DashboardView {
    pub fn no_data(warning: Option<String>) -> Self {
        DashboardView::NoData {
            notice: NO_DATA_NOTICE.to_string(),
            warning,
        }
    }
}

pub fn render(snapshot: &Snapshot, selection: &CitySelection) -> DashboardView {
    if snapshot.is_empty() {
        return DashboardView::no_data(snapshot.warning.clone());
    }

    let available_cities = charts::cities_in_order(&snapshot.rows);
    let selected_cities: Vec<String> = available_cities
        .iter()
        .filter(|city| selection.includes(city))
        .cloned()
        .collect();

    let rows: Vec<Observation> = snapshot
        .rows
        .iter()
        .filter(|r| selected_cities.contains(&r.city))
        .cloned()
        .collect();

    DashboardView::Ready(Report {
        total_records: snapshot.rows.len(),
        available_cities,
        selected_cities,
        metrics: Metrics::compute(&rows),
        charts: charts::chart_specs(&rows),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot::new(vec![
            Observation::with_readings("A", 20.0, 50.0, 10.0, 19.0),
            Observation::with_readings("B", 22.0, 70.0, 20.0, 23.0),
            Observation::with_readings("C", 30.0, 90.0, 30.0, 33.0),
            Observation::with_readings("A", 24.0, 60.0, 12.0, 25.0),
        ])
    }

    fn report(view: DashboardView) -> Report {
        match view {
            DashboardView::Ready(report) => report,
            other => panic!("expected a report, got {other:?}"),
        }
    }

    #[test]
    fn test_default_selection_shows_everything() {
        let report = report(render(&snapshot(), &CitySelection::default()));
        assert_eq!(report.available_cities, vec!["A", "B", "C"]);
        assert_eq!(report.selected_cities, report.available_cities);
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.total_records, 4);
        assert_eq!(report.metrics.temperature_c, Some(24.0));
    }

    #[test]
    fn test_filtering_keeps_only_selected_cities() {
        let selection = CitySelection::Only(vec!["A".to_string(), "B".to_string()]);
        let report = report(render(&snapshot(), &selection));

        assert!(report.rows.iter().all(|r| r.city == "A" || r.city == "B"));
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.metrics.records, 3);
        assert_eq!(report.metrics.temperature_c, Some(22.0));
        assert_eq!(report.metrics.humidity_pct, Some(60.0));
        // the choice offered still covers every city present
        assert_eq!(report.available_cities, vec!["A", "B", "C"]);
        assert_eq!(report.total_records, 4);

        let humidity = &report.charts[1].series[0];
        assert_eq!(humidity.x, vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_cities_are_ignored() {
        let selection = CitySelection::Only(vec!["B".to_string(), "Z".to_string()]);
        let report = report(render(&snapshot(), &selection));
        assert_eq!(report.selected_cities, vec!["B"]);
        assert_eq!(report.rows.len(), 1);
    }

    #[test]
    fn test_empty_selection_shows_no_rows() {
        let report = report(render(&snapshot(), &CitySelection::Only(vec![])));
        assert!(report.rows.is_empty());
        assert_eq!(report.metrics.temperature_c, None);
        assert_eq!(report.available_cities.len(), 3);
    }

    #[test]
    fn test_empty_snapshot_is_no_data() {
        let view = render(&Snapshot::default(), &CitySelection::All);
        assert_eq!(view, DashboardView::no_data(None));
    }

    #[test]
    fn test_failed_read_keeps_its_warning() {
        let view = render(&Snapshot::unavailable("sin conexión"), &CitySelection::All);
        match view {
            DashboardView::NoData { notice, warning } => {
                assert_eq!(notice, NO_DATA_NOTICE);
                assert_eq!(warning.as_deref(), Some("sin conexión"));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }
}
