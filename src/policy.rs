//! # Refresh Policy
//!
//! Decides, once per wake, whether the cached schedule can still be trusted
//! or a network refresh is required. Pure predicate: no I/O, no side
//! effects; the orchestrator acts on the answer and owns what gets
//! persisted afterwards.
//!
//! The day marker is only advanced on a *successful* refresh, so a failed
//! fetch leaves every staleness condition standing and the device naturally
//! retries on its next wake, bounded by the wake interval.

use crate::schedule::TideSchedule;
use std::fmt;

/// Why the cached schedule must be refreshed this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// No station has ever been configured
    Unconfigured,
    /// The cached schedule belongs to a different station than configured
    StationChanged,
    /// The local calendar day has rolled past the cache generation marker
    DayRolled,
    /// Neither next-high nor next-low is present; no forward-looking data
    NoForwardAnchors,
    /// The earliest cached "next" event has already elapsed (long sleep,
    /// missed wakes) even though the day marker still matches
    NextElapsed,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefreshReason::Unconfigured => "station not configured",
            RefreshReason::StationChanged => "configured station changed",
            RefreshReason::DayRolled => "calendar day rolled over",
            RefreshReason::NoForwardAnchors => "no future anchors cached",
            RefreshReason::NextElapsed => "cached next event already elapsed",
        };
        f.write_str(s)
    }
}

/// Evaluate the staleness rules.
///
/// `station_id` is the *configured* station, `today` the current local
/// day-of-month, `now` Unix seconds. Returns `None` when the cache is still
/// fresh, otherwise the first matching reason (the rules are a logical OR;
/// the ordering here only affects which reason gets logged).
pub fn refresh_needed(
    schedule: &TideSchedule,
    station_id: &str,
    today: u32,
    now: i64,
) -> Option<RefreshReason> {
    if station_id.is_empty() {
        return Some(RefreshReason::Unconfigured);
    }
    if schedule.station_id != station_id {
        return Some(RefreshReason::StationChanged);
    }
    if schedule.last_refresh_day != today {
        return Some(RefreshReason::DayRolled);
    }
    match schedule.earliest_next() {
        None => Some(RefreshReason::NoForwardAnchors),
        Some(next) if next.timestamp <= now => Some(RefreshReason::NextElapsed),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TideEvent, TideKind};

    const NOW: i64 = 1_750_000_000;
    const TODAY: u32 = 16;

    fn event(kind: TideKind, offset_secs: i64) -> Option<TideEvent> {
        Some(TideEvent {
            timestamp: NOW + offset_secs,
            kind,
            height_ft: 5.0,
        })
    }

    fn fresh_schedule() -> TideSchedule {
        TideSchedule {
            station_id: "8418150".to_string(),
            next_high: event(TideKind::High, 4 * 3600),
            next_low: event(TideKind::Low, 10 * 3600),
            last_high: event(TideKind::High, -8 * 3600),
            last_low: event(TideKind::Low, -2 * 3600),
            last_refresh_day: TODAY,
        }
    }

    #[test]
    fn fresh_schedule_needs_no_refresh() {
        assert_eq!(refresh_needed(&fresh_schedule(), "8418150", TODAY, NOW), None);
    }

    #[test]
    fn empty_station_id_always_refreshes() {
        // Even a completely fresh schedule cannot override an unconfigured
        // station
        assert_eq!(
            refresh_needed(&fresh_schedule(), "", TODAY, NOW),
            Some(RefreshReason::Unconfigured)
        );
    }

    #[test]
    fn station_change_invalidates_cache() {
        assert_eq!(
            refresh_needed(&fresh_schedule(), "9414290", TODAY, NOW),
            Some(RefreshReason::StationChanged)
        );
    }

    #[test]
    fn day_rollover_refreshes_even_with_future_anchors() {
        let schedule = fresh_schedule();
        assert!(schedule.earliest_next().unwrap().timestamp > NOW);
        assert_eq!(
            refresh_needed(&schedule, "8418150", TODAY + 1, NOW),
            Some(RefreshReason::DayRolled)
        );
    }

    #[test]
    fn never_refreshed_sentinel_triggers_day_rule() {
        let schedule = TideSchedule::empty("8418150");
        assert_eq!(
            refresh_needed(&schedule, "8418150", TODAY, NOW),
            Some(RefreshReason::DayRolled)
        );
    }

    #[test]
    fn missing_forward_anchors_refresh() {
        let mut schedule = fresh_schedule();
        schedule.next_high = None;
        schedule.next_low = None;
        assert_eq!(
            refresh_needed(&schedule, "8418150", TODAY, NOW),
            Some(RefreshReason::NoForwardAnchors)
        );
    }

    #[test]
    fn one_remaining_future_anchor_is_still_fresh() {
        let mut schedule = fresh_schedule();
        schedule.next_high = None;
        assert_eq!(refresh_needed(&schedule, "8418150", TODAY, NOW), None);
    }

    #[test]
    fn elapsed_next_event_refreshes_within_same_day() {
        let mut schedule = fresh_schedule();
        // The earliest next anchor slipped into the past without a refresh
        schedule.next_high = event(TideKind::High, -600);
        assert_eq!(
            refresh_needed(&schedule, "8418150", TODAY, NOW),
            Some(RefreshReason::NextElapsed)
        );
    }

    #[test]
    fn next_event_exactly_now_counts_as_elapsed() {
        let mut schedule = fresh_schedule();
        schedule.next_high = event(TideKind::High, 0);
        assert_eq!(
            refresh_needed(&schedule, "8418150", TODAY, NOW),
            Some(RefreshReason::NextElapsed)
        );
    }
}
