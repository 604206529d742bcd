//! Periodic driver for the extraction job.
//!
//! The loop wakes up every `poll` interval, runs a cycle when `interval` has
//! elapsed since the previous one finished, and exits once its [`StopSignal`]
//! is raised. Cycles never overlap: ticks that fall inside a running cycle are
//! skipped.
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::describe_error;
use crate::etl::{CycleError, CycleReport};

/// Source of time for the scheduler and the dashboard cache
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}

/// Cloneable flag asking a running loop to stop at its next poll
#[derive(Debug, Default, Clone)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A unit of work the scheduler runs once per tick
pub trait Job {
    fn run_cycle(&mut self) -> Result<CycleReport, CycleError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub cycles: u64,
    pub failures: u64,
    pub skipped_ticks: u64,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    poll: Duration,
    run_on_start: bool,
}

impl Scheduler {
    pub fn new(interval: Duration, poll: Duration) -> Self {
        Self {
            interval,
            poll,
            run_on_start: false,
        }
    }

    /// Run the first cycle immediately instead of one interval after start
    pub fn run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Drives `job` until `stop` is raised. A failing cycle is logged and the
    /// loop carries on with the next tick.
    pub fn run<J: Job, C: Clock>(&self, job: &mut J, clock: &C, stop: &StopSignal) -> SchedulerStats {
        info!("Scheduler started, running every {:?}", self.interval);

        let mut stats = SchedulerStats::default();
        let first_run = if self.run_on_start {
            Some(clock.now())
        } else {
            clock.now().checked_add(self.interval)
        };
        let Some(mut next_run) = first_run else {
            error!("Interval {:?} is out of range, scheduler not started", self.interval);
            return stats;
        };

        while !stop.is_stopped() {
            let started = clock.now();
            if started >= next_run {
                stats.cycles += 1;
                info!("Running extraction cycle {}", stats.cycles);
                match job.run_cycle() {
                    Ok(report) => info!(
                        "Extraction cycle {} completed: {} extracted, {} written",
                        stats.cycles, report.extracted, report.written
                    ),
                    Err(e) => {
                        stats.failures += 1;
                        error!(
                            "Extraction cycle {} failed: {}",
                            stats.cycles,
                            describe_error(&e)
                        );
                    }
                }

                let finished = clock.now();
                let missed = self.missed_ticks(finished - started);
                if missed > 0 {
                    warn!("Cycle overran the interval, skipping {} tick(s)", missed);
                    stats.skipped_ticks += missed;
                }

                match finished.checked_add(self.interval) {
                    Some(at) => next_run = at,
                    None => {
                        error!("Interval {:?} is out of range, stopping", self.interval);
                        break;
                    }
                }
                continue;
            }

            clock.sleep(self.poll);
        }

        info!(
            "Scheduler stopped after {} cycle(s), {} failed",
            stats.cycles, stats.failures
        );
        stats
    }

    /// Whole intervals that fit in `busy`
    fn missed_ticks(&self, busy: Duration) -> u64 {
        if self.interval.is_zero() {
            return 0;
        }
        (busy.as_nanos() / self.interval.as_nanos()) as u64
    }
}
