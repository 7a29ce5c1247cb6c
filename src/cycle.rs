//! # Wake Cycle Orchestration
//!
//! One wake of the device, start to finish: load the persisted schedule,
//! read the clock, refresh if the policy says so, interpolate, command the
//! actuator, and report how long to sleep. The body runs exactly once per
//! wake; persisted state is the only thing that survives between runs.
//!
//! Every failure is recovered here — a cycle always ends in a sleep
//! request, never a crash:
//! - clock unavailable → skip everything, sleep the short retry interval
//! - fetch/decode failure → keep the cached schedule, day marker stays
//!   stale, so the policy retries next wake
//! - no usable bracket → leave the pointer where it is
//! - store failure → log and continue with in-memory values

use crate::actuator::Actuator;
use crate::config::Config;
use crate::dial::{dial_angle, DialError};
use crate::extract::extract_anchors;
use crate::feed::PredictionSource;
use crate::policy::refresh_needed;
use crate::schedule::{ScheduleStore, TideSchedule};
use chrono::{DateTime, Datelike, Local};
use log::{debug, error, info, warn};
use std::time::Duration;
use thiserror::Error;

/// Time-source failure.
#[derive(Error, Debug)]
pub enum TimeError {
    /// Clock could not be read or returned an implausible value
    #[error("time source unavailable: {0}")]
    Unavailable(String),
}

/// Source of the current local time. On the real device this is an RTC that
/// may not have been set yet; tests substitute fixed instants.
pub trait Clock {
    fn now(&self) -> Result<DateTime<Local>, TimeError>;
}

/// System clock with a plausibility check: an RTC that lost power reports
/// an epoch-adjacent date, which must be treated as "no time available",
/// not as a valid reference time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Local>, TimeError> {
        let now = Local::now();
        if now.year() < 2024 {
            return Err(TimeError::Unavailable(format!(
                "clock reports implausible year {}",
                now.year()
            )));
        }
        Ok(now)
    }
}

/// What one wake cycle did, and how long to sleep before the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// A refresh was attempted and committed this cycle
    pub refreshed: bool,
    /// The angle commanded to the actuator, if a bracket existed
    pub angle: Option<u8>,
    /// Requested sleep before the next wake
    pub sleep: Duration,
}

/// The per-wake context: configuration plus the four collaborators.
///
/// Nothing here is shared or long-lived; the binary builds one of these per
/// process and calls [`run_cycle`](Orchestrator::run_cycle) once per wake.
pub struct Orchestrator<'a, C, S, P, A> {
    pub config: &'a Config,
    pub clock: &'a C,
    pub store: &'a S,
    pub source: &'a P,
    pub actuator: &'a mut A,
}

impl<C, S, P, A> Orchestrator<'_, C, S, P, A>
where
    C: Clock,
    S: ScheduleStore,
    P: PredictionSource,
    A: Actuator,
{
    /// Run one wake cycle to completion.
    pub fn run_cycle(&mut self) -> CycleReport {
        let wake = Duration::from_secs(self.config.timing.wake_interval_minutes * 60);
        let retry = Duration::from_secs(self.config.timing.retry_interval_minutes * 60);
        let station_id = self.config.station.id.as_str();

        // Load: a missing document is first boot; a broken store is
        // fatal-soft and degrades to an empty in-memory schedule.
        let mut schedule = match self.store.load() {
            Ok(Some(schedule)) => schedule,
            Ok(None) => {
                info!("no persisted schedule, starting empty");
                TideSchedule::empty(station_id)
            }
            Err(e) => {
                error!("schedule load failed, continuing in memory: {e}");
                TideSchedule::empty(station_id)
            }
        };

        // Without a trustworthy "now" nothing downstream is meaningful;
        // retry soon rather than burning a full wake interval.
        let now_local = match self.clock.now() {
            Ok(t) => t,
            Err(e) => {
                warn!("{e}; sleeping {}s before retry", retry.as_secs());
                return CycleReport {
                    refreshed: false,
                    angle: None,
                    sleep: retry,
                };
            }
        };
        let now = now_local.timestamp();
        let today = now_local.day();

        let mut refreshed = false;
        if let Some(reason) = refresh_needed(&schedule, station_id, today, now) {
            info!("refreshing schedule: {reason}");
            match self.source.fetch(station_id, now_local) {
                Ok(records) => {
                    let anchors = extract_anchors(now, &records);
                    let replacement = TideSchedule::from_refresh(station_id, anchors, today);
                    if let Err(e) = self.store.save(&replacement) {
                        error!("schedule save failed, refresh held in memory only: {e}");
                    }
                    schedule = replacement;
                    refreshed = true;
                }
                Err(e) => {
                    // Previous schedule and day marker stay untouched; the
                    // policy will fire again next wake.
                    warn!("refresh failed, keeping cached schedule: {e}");
                }
            }
        }

        let angle = match dial_angle(now, &schedule) {
            Ok(angle) => {
                debug!("dial angle {angle}°");
                if let Err(e) = self.actuator.set_angle(angle) {
                    error!("actuator rejected angle {angle}°: {e}");
                }
                Some(angle)
            }
            Err(DialError::NoBracket) => {
                debug!("no bracket around now; holding pointer position");
                None
            }
            Err(DialError::InvalidBracket) => {
                warn!("cached anchors are not chronological; holding pointer position");
                None
            }
        };

        CycleReport {
            refreshed,
            angle,
            sleep: wake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_reports_a_plausible_time() {
        let now = SystemClock.now().expect("host clock should be set");
        assert!(now.year() >= 2024);
    }
}
