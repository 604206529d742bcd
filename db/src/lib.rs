//! Storage for the weather table.
//!
//! The `clima` table is an append-only log of observations. The extraction job
//! writes to it through [`ObservationSink`] and the dashboard reads it through
//! [`ObservationSource`]; both are implemented by [`WeatherStore`].
mod error;
mod models;
mod schema;

pub use crate::error::StoreError;
pub use crate::models::{NewObservationRow, Observation, ObservationRow};

use crate::schema::clima;
use crate::schema::clima::dsl::*;
use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::{debug, info};

const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS clima (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ciudad TEXT NOT NULL,
        temperatura REAL,
        humedad REAL,
        velocidad_viento REAL,
        sensacion_termica REAL,
        fecha_extraccion TIMESTAMP NOT NULL
    );
    CREATE INDEX IF NOT EXISTS clima_fecha_extraccion_idx ON clima (fecha_extraccion);
";

/// Order in which [`ObservationSource::load`] returns rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOrder {
    /// Most recent extraction first
    NewestFirst,
    Unordered,
}

/// Anything that can persist a batch of observations
pub trait ObservationSink {
    /// Appends `batch` as new rows. Observations without `extracted_at` are
    /// stamped with `stamp`. Returns the number of rows written; an empty
    /// batch writes nothing.
    fn append(&mut self, batch: &[Observation], stamp: NaiveDateTime) -> Result<usize, StoreError>;
}

/// Anything that can read the whole weather table back
pub trait ObservationSource {
    fn load(&mut self, order: ReadOrder) -> Result<Vec<Observation>, StoreError>;
}

/// Connect to SQLite database
pub fn establish_connection(database_url: &str) -> Result<SqliteConnection, StoreError> {
    info!("Connecting to {}", database_url);
    SqliteConnection::establish(database_url).map_err(|source| StoreError::Connection {
        url: database_url.to_owned(),
        source,
    })
}

/// Owns the connection to the weather table
pub struct WeatherStore {
    connection: SqliteConnection,
}

impl WeatherStore {
    /// Wraps an already established connection
    pub fn new(connection: SqliteConnection) -> WeatherStore {
        WeatherStore { connection }
    }

    /// Opens `database_url` and makes sure the table exists
    pub fn open(database_url: &str) -> Result<WeatherStore, StoreError> {
        let mut store = WeatherStore::new(establish_connection(database_url)?);
        store.ensure_schema()?;
        Ok(store)
    }

    /// A private in-memory database, mostly useful for tests
    pub fn in_memory() -> Result<WeatherStore, StoreError> {
        WeatherStore::open(":memory:")
    }

    /// Creates the `clima` table and its index if they are missing
    pub fn ensure_schema(&mut self) -> Result<(), StoreError> {
        self.connection.batch_execute(CREATE_SCHEMA)?;
        Ok(())
    }

    /// Number of rows in the weather table
    pub fn count(&mut self) -> Result<i64, StoreError> {
        let rows = clima.count().get_result(&mut self.connection)?;
        Ok(rows)
    }
}

impl ObservationSink for WeatherStore {
    fn append(&mut self, batch: &[Observation], stamp: NaiveDateTime) -> Result<usize, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let rows: Vec<NewObservationRow> = batch
            .iter()
            .map(|obs| NewObservationRow::from_observation(obs, stamp))
            .collect();

        let written = self.connection.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(clima::table).values(&rows).execute(conn)
        })?;

        debug!("Appended {} rows to clima", written);
        Ok(written)
    }
}

impl ObservationSource for WeatherStore {
    fn load(&mut self, order: ReadOrder) -> Result<Vec<Observation>, StoreError> {
        let rows = match order {
            ReadOrder::NewestFirst => clima
                .order((fecha_extraccion.desc(), id.desc()))
                .select(ObservationRow::as_select())
                .load(&mut self.connection)?,
            ReadOrder::Unordered => clima
                .select(ObservationRow::as_select())
                .load(&mut self.connection)?,
        };

        Ok(rows.into_iter().map(Observation::from).collect())
    }
}
