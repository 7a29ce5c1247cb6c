//! # Persisted Tide Schedule
//!
//! The schedule is the only state that survives a sleep: the four anchor
//! events, the station they came from, and a calendar-day marker recording
//! when they were last refreshed. It is persisted as a single JSON document
//! and replaced wholesale — never field by field — so a power loss mid-write
//! can't leave a torn mix of old and new anchors on disk.
//!
//! ## Caching Strategy
//!
//! - **Format**: compact JSON via serde, one document per station
//! - **Atomicity**: write to a sibling temp file, then rename over the
//!   target; rename is atomic on the filesystems we care about
//! - **Generation marker**: `last_refresh_day` is a day-of-month stamp, not
//!   a timestamp — the refresh policy compares it against today's calendar
//!   day to roll the cache once per day
//!
//! Store failures are never fatal to a wake cycle; the orchestrator logs
//! them and carries on with in-memory values.

use crate::extract::ScheduleAnchors;
use crate::TideEvent;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

/// Errors that can occur loading or saving the schedule document.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem operations failed (permissions, disk space, missing dir)
    #[error("store IO: {0}")]
    Io(#[from] io::Error),

    /// Document on disk could not be (de)serialized
    #[error("store codec: {0}")]
    Codec(#[from] serde_json::Error),
}

/// The persisted schedule aggregate.
///
/// `last_refresh_day` of 0 is the never-refreshed sentinel (calendar days
/// run 1–31).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TideSchedule {
    /// Prediction source identifier; empty means unconfigured
    pub station_id: String,
    /// Earliest High at or after the last refresh's reference time
    pub next_high: Option<TideEvent>,
    /// Earliest Low at or after the last refresh's reference time
    pub next_low: Option<TideEvent>,
    /// Latest High strictly before that reference time
    pub last_high: Option<TideEvent>,
    /// Latest Low strictly before that reference time
    pub last_low: Option<TideEvent>,
    /// Day-of-month at the last successful refresh; 0 if never refreshed
    pub last_refresh_day: u32,
}

impl TideSchedule {
    /// A schedule that has never been refreshed, as created on first boot.
    pub fn empty(station_id: &str) -> Self {
        TideSchedule {
            station_id: station_id.to_string(),
            ..TideSchedule::default()
        }
    }

    /// Build the replacement schedule for a successful refresh. All four
    /// anchors and the day marker change together; callers must persist the
    /// result as one document.
    pub fn from_refresh(station_id: &str, anchors: ScheduleAnchors, refresh_day: u32) -> Self {
        TideSchedule {
            station_id: station_id.to_string(),
            next_high: anchors.next_high,
            next_low: anchors.next_low,
            last_high: anchors.last_high,
            last_low: anchors.last_low,
            last_refresh_day: refresh_day,
        }
    }

    /// The chronologically earliest of the present `next_*` anchors, if any.
    pub fn earliest_next(&self) -> Option<TideEvent> {
        match (self.next_high, self.next_low) {
            (Some(h), Some(l)) => Some(if h.timestamp <= l.timestamp { h } else { l }),
            (Some(h), None) => Some(h),
            (None, Some(l)) => Some(l),
            (None, None) => None,
        }
    }
}

/// Durable home for the schedule document.
pub trait ScheduleStore {
    /// Load the persisted schedule; `Ok(None)` means nothing has ever been
    /// saved (first boot or after a reset).
    fn load(&self) -> Result<Option<TideSchedule>, StoreError>;

    /// Persist the schedule, replacing any previous document atomically.
    fn save(&self, schedule: &TideSchedule) -> Result<(), StoreError>;

    /// Remove the persisted document entirely (explicit reset path).
    fn clear(&self) -> Result<(), StoreError>;
}

/// JSON-file-backed store.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl ScheduleStore for FileStore {
    fn load(&self) -> Result<Option<TideSchedule>, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let schedule = serde_json::from_slice(&data)?;
        Ok(Some(schedule))
    }

    fn save(&self, schedule: &TideSchedule) -> Result<(), StoreError> {
        // Whole-document replace: temp file plus rename keeps a power loss
        // from leaving a half-written schedule behind.
        let tmp = self.temp_path();
        let data = serde_json::to_vec(schedule)?;
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
