//! Read side of the weather table as seen by the dashboard.
use db::{Observation, ObservationSource, ReadOrder};
use log::warn;
use serde::Serialize;

use crate::describe_error;

/// Everything one dashboard pass needs from the table.
///
/// A snapshot is never an error: when the store cannot be read it is empty
/// and carries a warning for the user instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub rows: Vec<Observation>,
    pub warning: Option<String>,
}

impl Snapshot {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows, warning: None }
    }

    pub fn unavailable(warning: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            warning: Some(warning.into()),
        }
    }

    /// False when the snapshot stands in for a failed read
    pub fn is_available(&self) -> bool {
        self.warning.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loads the whole table, turning storage failures into an unavailable snapshot
pub fn read_snapshot<S: ObservationSource + ?Sized>(source: &mut S, order: ReadOrder) -> Snapshot {
    match source.load(order) {
        Ok(rows) => Snapshot::new(rows),
        Err(e) => {
            let cause = describe_error(&e);
            warn!("Could not read weather table: {}", cause);
            Snapshot::unavailable(format!("No se pudo conectar a la base de datos: {}", cause))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use db::{establish_connection, ObservationSink, WeatherStore};

    #[test]
    fn test_reads_rows_newest_first() {
        let mut store = WeatherStore::in_memory().unwrap();
        let now = Utc::now().naive_utc();
        store
            .append(&[Observation::new("Bogota")], now - chrono::Duration::hours(1))
            .unwrap();
        store.append(&[Observation::new("Cali")], now).unwrap();

        let snapshot = read_snapshot(&mut store, ReadOrder::NewestFirst);
        assert!(snapshot.is_available());
        assert_eq!(snapshot.rows[0].city, "Cali");
        assert_eq!(snapshot.rows[1].city, "Bogota");
    }

    #[test]
    fn test_empty_table_is_not_an_error() {
        let mut store = WeatherStore::in_memory().unwrap();
        let snapshot = read_snapshot(&mut store, ReadOrder::NewestFirst);
        assert!(snapshot.is_available());
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_storage_error_becomes_warning() {
        let mut store = WeatherStore::new(establish_connection(":memory:").unwrap());
        let snapshot = read_snapshot(&mut store, ReadOrder::NewestFirst);

        assert!(snapshot.is_empty());
        assert!(!snapshot.is_available());
        assert!(snapshot
            .warning
            .unwrap()
            .starts_with("No se pudo conectar a la base de datos"));
    }
}
