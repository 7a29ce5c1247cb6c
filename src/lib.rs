//! # Tide Dial Core Library
//!
//! This library provides the schedule cache and dial-interpolation engine for
//! a physical tide indicator: a dial moved by a servo on a battery-powered
//! device that wakes briefly, updates the pointer, and goes back to sleep.
//!
//! ## Design Philosophy
//!
//! ### One cycle, explicit state
//! The device is powered off between wakes, so there is no long-running loop
//! to hang state off. Everything that survives a sleep lives in one persisted
//! [`schedule::TideSchedule`] document; each wake loads it, optionally
//! refreshes it, and saves it back. No module-level mutable state exists.
//!
//! ### Minimal network cost
//! NOAA hilo predictions change once a day at most, so the refresh policy
//! ([`policy`]) only fetches when the cached schedule is genuinely stale:
//! a new calendar day, an unconfigured station, or cached "next" events that
//! have already elapsed. A failed fetch keeps the old schedule and retries
//! on the next wake.
//!
//! ### Pure core, fallible edges
//! Extraction ([`extract`]), staleness ([`policy`]) and interpolation
//! ([`dial`]) are pure functions of their inputs, unit-testable without any
//! I/O. Network, clock, persistence, and the servo sit behind small traits
//! so the whole wake cycle ([`cycle`]) runs against mocks in tests.
//!
//! ## Data Flow
//! 1. **Load**: read the persisted schedule (empty on first boot)
//! 2. **Decide**: refresh policy compares the schedule against "now"
//! 3. **Refresh**: fetch hilo predictions, extract the four anchors, save
//! 4. **Interpolate**: map "now" onto a dial angle between the bracketing
//!    high/low events
//! 5. **Actuate**: command the servo, then sleep until the next wake

use serde::{Deserialize, Serialize};

// Module declarations
pub mod actuator;
pub mod config;
pub mod cycle;
pub mod dial;
pub mod extract;
pub mod feed;
pub mod policy;
pub mod schedule;

/// Whether a predicted tide extremum is a high or a low water mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TideKind {
    /// High water (local maximum of the tide curve)
    High,
    /// Low water (local minimum of the tide curve)
    Low,
}

impl TideKind {
    /// The opposite extremum. Tides alternate, so a valid interpolation
    /// bracket is always High→Low or Low→High.
    pub fn opposite(self) -> Self {
        match self {
            TideKind::High => TideKind::Low,
            TideKind::Low => TideKind::High,
        }
    }
}

/// One predicted tide extremum.
///
/// Timestamps are Unix seconds; "future" and "past" are only meaningful
/// relative to a reference time supplied by the caller, never stored here.
///
/// # Example
/// ```
/// use tide_dial_lib::{TideEvent, TideKind};
///
/// let high = TideEvent { timestamp: 1_700_000_000, kind: TideKind::High, height_ft: 11.2 };
/// let low = TideEvent { timestamp: 1_700_022_000, kind: TideKind::Low, height_ft: 1.8 };
/// assert!(high.timestamp < low.timestamp);
/// assert_eq!(high.kind.opposite(), low.kind);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    /// Prediction time as Unix seconds (local station time zone applied
    /// during parsing, see [`extract`])
    pub timestamp: i64,
    /// High or low water
    pub kind: TideKind,
    /// Predicted height in feet above datum (informational; the dial
    /// position depends only on timing)
    pub height_ft: f32,
}
