//! One extraction cycle: fetch observations, then append them to the store.
use chrono::{NaiveDateTime, TimeDelta, Utc};
use db::{Observation, ObservationSink, StoreError};
use log::warn;
use std::collections::HashSet;
use thiserror::Error;

use crate::extractor::{ExtractError, Extractor};
use crate::scheduler::Job;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Extraction failed")]
    Extract(#[from] ExtractError),

    #[error("Write failed")]
    Store(#[from] StoreError),
}

/// Outcome of a successful cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Observations returned by the extractor
    pub extracted: usize,
    /// Rows appended to the store
    pub written: usize,
    /// Timestamp shared by every row of the cycle
    pub stamp: NaiveDateTime,
}

/// Pairs an extractor with the sink its observations are written to
pub struct EtlJob<E, S> {
    extractor: E,
    sink: S,
    last_stamp: Option<NaiveDateTime>,
}

impl<E: Extractor, S: ObservationSink> EtlJob<E, S> {
    pub fn new(extractor: E, sink: S) -> Self {
        Self {
            extractor,
            sink,
            last_stamp: None,
        }
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Extract, drop invalid or repeated cities, and append what is left
    /// under a single timestamp.
    pub fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let extracted = self.extractor.extract()?;
        let count = extracted.len();
        let batch = one_per_city(extracted);

        let stamp = self.next_stamp();
        let written = self.sink.append(&batch, stamp)?;

        Ok(CycleReport {
            extracted: count,
            written,
            stamp,
        })
    }

    /// Wall-clock UTC time, strictly after the previous cycle's stamp
    fn next_stamp(&mut self) -> NaiveDateTime {
        let now = Utc::now().naive_utc();
        let stamp = match self.last_stamp {
            Some(last) if last >= now => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

impl<E: Extractor, S: ObservationSink> Job for EtlJob<E, S> {
    fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        EtlJob::run_cycle(self)
    }
}

fn one_per_city(observations: Vec<Observation>) -> Vec<Observation> {
    let mut seen = HashSet::new();
    observations
        .into_iter()
        .filter(|obs| {
            if obs.city.trim().is_empty() {
                warn!("Dropping observation without a city");
                return false;
            }
            if !seen.insert(obs.city.clone()) {
                warn!("Dropping repeated observation for {}", obs.city);
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::ManualClock;
    use crate::scheduler::{Scheduler, StopSignal};
    use db::{establish_connection, ObservationSource, ReadOrder, WeatherStore};
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Extractor replaying canned results, then returning empty batches
    struct ScriptedExtractor {
        script: VecDeque<Result<Vec<Observation>, ExtractError>>,
    }

    impl ScriptedExtractor {
        fn new(script: Vec<Result<Vec<Observation>, ExtractError>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl Extractor for ScriptedExtractor {
        fn extract(&mut self) -> Result<Vec<Observation>, ExtractError> {
            self.script.pop_front().unwrap_or_else(|| Ok(vec![]))
        }
    }

    fn provider_down() -> ExtractError {
        ExtractError::Provider {
            city: "Bogota".to_string(),
            code: 104,
            info: "usage_limit_reached".to_string(),
        }
    }

    fn batch() -> Vec<Observation> {
        vec![
            Observation::with_readings("Bogota", 14.0, 82.0, 9.0, 13.0),
            Observation::with_readings("Medellin", 24.0, 65.0, 7.0, 25.0),
        ]
    }

    #[test]
    fn test_cycle_writes_with_shared_stamp() {
        let store = WeatherStore::in_memory().unwrap();
        let mut job = EtlJob::new(ScriptedExtractor::new(vec![Ok(batch())]), store);

        let report = job.run_cycle().unwrap();
        assert_eq!(report.extracted, 2);
        assert_eq!(report.written, 2);

        let rows = job.sink_mut().load(ReadOrder::Unordered).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.extracted_at == Some(report.stamp)));
    }

    #[test]
    fn test_empty_extraction_is_quiet_success() {
        let store = WeatherStore::in_memory().unwrap();
        let mut job = EtlJob::new(ScriptedExtractor::new(vec![Ok(vec![])]), store);

        let report = job.run_cycle().unwrap();
        assert_eq!(report.written, 0);
        assert_eq!(job.sink_mut().count().unwrap(), 0);
    }

    #[test]
    fn test_repeated_and_blank_cities_are_dropped() {
        let mut observations = batch();
        observations.push(Observation::with_readings("Bogota", 99.0, 0.0, 0.0, 99.0));
        observations.push(Observation::new("  "));

        let store = WeatherStore::in_memory().unwrap();
        let mut job = EtlJob::new(ScriptedExtractor::new(vec![Ok(observations)]), store);

        let report = job.run_cycle().unwrap();
        assert_eq!(report.extracted, 4);
        assert_eq!(report.written, 2);

        let rows = job.sink_mut().load(ReadOrder::Unordered).unwrap();
        let bogota = rows.iter().find(|r| r.city == "Bogota").unwrap();
        assert_eq!(bogota.temperature_c, Some(14.0));
    }

    #[test]
    fn test_extraction_failure_is_reported() {
        let store = WeatherStore::in_memory().unwrap();
        let mut job = EtlJob::new(ScriptedExtractor::new(vec![Err(provider_down())]), store);

        let err = job.run_cycle().unwrap_err();
        assert!(matches!(err, CycleError::Extract(ExtractError::Provider { .. })));
        assert_eq!(job.sink_mut().count().unwrap(), 0);
    }

    #[test]
    fn test_write_failure_is_reported() {
        // no schema: the insert fails
        let store = WeatherStore::new(establish_connection(":memory:").unwrap());
        let mut job = EtlJob::new(ScriptedExtractor::new(vec![Ok(batch())]), store);

        let err = job.run_cycle().unwrap_err();
        assert!(matches!(err, CycleError::Store(_)));
    }

    #[test]
    fn test_stamps_strictly_increase() {
        let store = WeatherStore::in_memory().unwrap();
        let script = vec![Ok(batch()), Ok(batch()), Ok(batch())];
        let mut job = EtlJob::new(ScriptedExtractor::new(script), store);

        let stamps: Vec<NaiveDateTime> = (0..3).map(|_| job.run_cycle().unwrap().stamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_stamp_moves_past_a_previous_stamp_from_the_future() {
        let store = WeatherStore::in_memory().unwrap();
        let mut job = EtlJob::new(ScriptedExtractor::new(vec![Ok(batch())]), store);
        let ahead = Utc::now().naive_utc() + TimeDelta::hours(1);
        job.last_stamp = Some(ahead);

        let report = job.run_cycle().unwrap();
        assert_eq!(report.stamp, ahead + TimeDelta::microseconds(1));
    }

    #[test]
    fn test_scheduler_survives_failed_cycle() {
        let hour = Duration::from_secs(3600);
        let minute = Duration::from_secs(60);
        let stop = StopSignal::new();
        let clock = ManualClock::stopping_after(hour * 2 + minute, &stop);

        let script = vec![Err(provider_down()), Ok(batch())];
        let mut job = EtlJob::new(ScriptedExtractor::new(script), WeatherStore::in_memory().unwrap());

        let stats = Scheduler::new(hour, minute).run(&mut job, &clock, &stop);

        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.failures, 1);
        let cities: Vec<String> = job
            .sink_mut()
            .load(ReadOrder::NewestFirst)
            .unwrap()
            .into_iter()
            .map(|obs| obs.city)
            .collect();
        assert_eq!(cities.len(), 2);
        assert!(cities.contains(&"Bogota".to_string()));
        assert!(cities.contains(&"Medellin".to_string()));
    }
}
