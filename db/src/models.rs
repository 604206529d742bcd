use crate::schema::clima;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// One weather reading for one city at one point in time.
///
/// `extracted_at` stays `None` until the writer stamps the observation;
/// observations loaded from the database always carry it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Observation {
    pub city: String,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub extracted_at: Option<NaiveDateTime>,
}

impl Observation {
    /// Create an observation for `city` with every reading missing
    pub fn new(city: impl Into<String>) -> Observation {
        Observation {
            city: city.into(),
            temperature_c: None,
            humidity_pct: None,
            wind_speed_kmh: None,
            feels_like_c: None,
            extracted_at: None,
        }
    }

    /// Convenience constructor used when every reading is known
    pub fn with_readings(
        city: impl Into<String>,
        temperature_c: f64,
        humidity_pct: f64,
        wind_speed_kmh: f64,
        feels_like_c: f64,
    ) -> Observation {
        Observation {
            temperature_c: Some(temperature_c),
            humidity_pct: Some(humidity_pct),
            wind_speed_kmh: Some(wind_speed_kmh),
            feels_like_c: Some(feels_like_c),
            ..Observation::new(city)
        }
    }
}

/// Row representation for read queries against `clima`
#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = clima)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ObservationRow {
    pub id: i32,
    pub ciudad: String,
    pub temperatura: Option<f64>,
    pub humedad: Option<f64>,
    pub velocidad_viento: Option<f64>,
    pub sensacion_termica: Option<f64>,
    pub fecha_extraccion: NaiveDateTime,
}

/// Row representation for insert queries against `clima`
#[derive(Insertable, Debug)]
#[diesel(table_name = clima)]
pub struct NewObservationRow<'a> {
    pub ciudad: &'a str,
    pub temperatura: Option<f64>,
    pub humedad: Option<f64>,
    pub velocidad_viento: Option<f64>,
    pub sensacion_termica: Option<f64>,
    pub fecha_extraccion: NaiveDateTime,
}

impl<'a> NewObservationRow<'a> {
    /// Converts an observation into an insertable row, using `stamp` when the
    /// observation has not been stamped yet.
    pub fn from_observation(obs: &'a Observation, stamp: NaiveDateTime) -> NewObservationRow<'a> {
        NewObservationRow {
            ciudad: &obs.city,
            temperatura: obs.temperature_c,
            humedad: obs.humidity_pct,
            velocidad_viento: obs.wind_speed_kmh,
            sensacion_termica: obs.feels_like_c,
            fecha_extraccion: obs.extracted_at.unwrap_or(stamp),
        }
    }
}

impl From<ObservationRow> for Observation {
    fn from(row: ObservationRow) -> Self {
        Observation {
            city: row.ciudad,
            temperature_c: row.temperatura,
            humidity_pct: row.humedad,
            wind_speed_kmh: row.velocidad_viento,
            feels_like_c: row.sensacion_termica,
            extracted_at: Some(row.fecha_extraccion),
        }
    }
}
