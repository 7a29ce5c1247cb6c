//! # Dial Interpolation
//!
//! Maps "now" onto a pointer angle between the two tide events bracketing
//! it. The dial face is laid out as a half circle:
//!
//! ```text
//!   0° ─ high water          (pointer at the top of the falling arc)
//!  90° ─ low water
//! 180° ─ high water again    (end of the rising arc)
//! ```
//!
//! A falling tide (last event High, next Low) sweeps 0°→90°; a rising tide
//! (last Low, next High) sweeps 90°→180°. Progress through the segment is
//! linear in time and clamped, so the pointer never overshoots an endpoint
//! even if the device wakes a little late.
//!
//! When the schedule cannot supply a past event and an opposite-kind future
//! event around "now", the interpolator reports [`DialError::NoBracket`]
//! instead of guessing; the orchestrator then leaves the pointer where it
//! is for this cycle.

use crate::schedule::TideSchedule;
use crate::{TideEvent, TideKind};
use thiserror::Error;

/// Why no angle could be computed this cycle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialError {
    /// No past anchor / opposite-kind future anchor pair encloses "now"
    #[error("no usable bracket around the current time")]
    NoBracket,

    /// A bracket was supplied whose events are not in chronological order
    #[error("bracket duration is not positive")]
    InvalidBracket,
}

/// A pair of opposite-kind events enclosing the current time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// The most recent extremum before "now"
    pub last: TideEvent,
    /// The upcoming extremum of the opposite kind
    pub next: TideEvent,
}

impl Bracket {
    /// Linear angle for `now` within this bracket.
    ///
    /// Progress is clamped to [0, 1], so times slightly outside the bracket
    /// pin to the nearest endpoint. A non-positive bracket duration is
    /// [`DialError::InvalidBracket`], never a defaulted angle.
    pub fn angle_at(&self, now: i64) -> Result<u8, DialError> {
        let duration = self.next.timestamp - self.last.timestamp;
        if duration <= 0 {
            return Err(DialError::InvalidBracket);
        }

        let progress = ((now - self.last.timestamp) as f64 / duration as f64).clamp(0.0, 1.0);

        // Falling tide occupies the first quadrant pair, rising the second.
        let (start, end) = match self.last.kind {
            TideKind::High => (0.0, 90.0),
            TideKind::Low => (90.0, 180.0),
        };
        let angle = start + progress * (end - start);

        Ok(angle.round().clamp(0.0, 180.0) as u8)
    }
}

/// Pick the bracket enclosing `now` from the schedule's anchors.
///
/// Candidates are the two structurally opposite pairs: (last High, next Low)
/// and (last Low, next High). A candidate is usable when
/// `last.timestamp < now < next.timestamp`. If both qualify (stale but
/// overlapping anchors from an old refresh), the pair whose past event is
/// most recent wins, since the latest extremum determines the tide's current
/// direction.
pub fn select_bracket(now: i64, schedule: &TideSchedule) -> Option<Bracket> {
    let falling = pair(schedule.last_high, schedule.next_low, now);
    let rising = pair(schedule.last_low, schedule.next_high, now);

    match (falling, rising) {
        (Some(f), Some(r)) => Some(if f.last.timestamp >= r.last.timestamp { f } else { r }),
        (Some(f), None) => Some(f),
        (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

fn pair(last: Option<TideEvent>, next: Option<TideEvent>, now: i64) -> Option<Bracket> {
    let (last, next) = (last?, next?);
    if last.timestamp < now && now < next.timestamp {
        Some(Bracket { last, next })
    } else {
        None
    }
}

/// Compute the pointer angle for `now` from the schedule, or the reason it
/// cannot be computed.
pub fn dial_angle(now: i64, schedule: &TideSchedule) -> Result<u8, DialError> {
    select_bracket(now, schedule)
        .ok_or(DialError::NoBracket)?
        .angle_at(now)
}
