//! # Schedule Anchor Extraction
//!
//! Turns a batch of raw feed records into the four schedule anchors: the
//! earliest future high and low, and the latest past high and low, relative
//! to a caller-supplied reference time.
//!
//! This is a pure function of `(now, records)`: no I/O, no hidden state,
//! deterministic for identical inputs. Records the feed delivers malformed
//! (unparseable time, unknown kind code, non-numeric height) are skipped
//! individually rather than failing the batch — one bad row should not cost
//! the device its daily refresh.

use crate::feed::RawPrediction;
use crate::{TideEvent, TideKind};
use chrono::{Local, NaiveDateTime, TimeZone};
use log::debug;

/// The four optional anchor slots produced by one extraction pass.
///
/// Any slot may be absent: an all-future batch has no `last_*`, an all-past
/// batch has no `next_*`, and an empty batch has none at all.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScheduleAnchors {
    /// Earliest High at or after the reference time
    pub next_high: Option<TideEvent>,
    /// Earliest Low at or after the reference time
    pub next_low: Option<TideEvent>,
    /// Latest High strictly before the reference time
    pub last_high: Option<TideEvent>,
    /// Latest Low strictly before the reference time
    pub last_low: Option<TideEvent>,
}

/// Extract the four schedule anchors from raw feed records.
///
/// `now` is Unix seconds. A record with `timestamp >= now` competes for a
/// `next_*` slot, one with `timestamp < now` for a `last_*` slot. When two
/// records carry an identical timestamp and kind, the later one in input
/// order wins, so re-running over identical input is idempotent.
pub fn extract_anchors(now: i64, records: &[RawPrediction]) -> ScheduleAnchors {
    let mut anchors = ScheduleAnchors::default();

    for record in records {
        let Some(event) = parse_record(record) else {
            debug!("skipping malformed prediction record: {record:?}");
            continue;
        };

        let slot = match (event.kind, event.timestamp >= now) {
            (TideKind::High, true) => &mut anchors.next_high,
            (TideKind::Low, true) => &mut anchors.next_low,
            (TideKind::High, false) => &mut anchors.last_high,
            (TideKind::Low, false) => &mut anchors.last_low,
        };

        // next_* keeps the earliest candidate, last_* the latest; both use
        // non-strict comparison so an exact duplicate replaces the earlier
        // occurrence.
        let replace = match slot {
            None => true,
            Some(held) if event.timestamp >= now => event.timestamp <= held.timestamp,
            Some(held) => event.timestamp >= held.timestamp,
        };
        if replace {
            *slot = Some(event);
        }
    }

    anchors
}

/// Parse one raw record into a [`TideEvent`], or `None` if any field is
/// malformed.
///
/// The feed's time strings are station-local wall clock; they are resolved
/// against the local time zone the same way the rest of the crate reads the
/// clock. A wall time that does not exist or is ambiguous (DST transitions)
/// is treated as malformed.
fn parse_record(record: &RawPrediction) -> Option<TideEvent> {
    let kind = match record.kind.trim() {
        "H" => TideKind::High,
        "L" => TideKind::Low,
        _ => return None,
    };

    let naive = NaiveDateTime::parse_from_str(record.time.trim(), "%Y-%m-%d %H:%M").ok()?;
    let timestamp = Local
        .from_local_datetime(&naive)
        .single()?
        .timestamp();

    let height_ft: f32 = record.height.trim().parse().ok()?;

    Some(TideEvent {
        timestamp,
        kind,
        height_ft,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn record(time: &str, kind: &str, height: &str) -> RawPrediction {
        RawPrediction {
            time: time.to_string(),
            kind: kind.to_string(),
            height: height.to_string(),
        }
    }

    /// Reference time helper: local wall clock to Unix seconds, matching how
    /// records are parsed.
    fn local_ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .unwrap()
            .timestamp()
    }

    #[test]
    fn scenario_midmorning_between_high_and_low() {
        let records = vec![
            record("2025-06-16 08:10", "H", "11.2"),
            record("2025-06-16 14:45", "L", "1.8"),
            record("2025-06-16 20:30", "H", "10.9"),
        ];
        let now = local_ts(2025, 6, 16, 11, 0);

        let anchors = extract_anchors(now, &records);

        let last_high = anchors.last_high.expect("08:10 high should be the last high");
        assert_eq!(last_high.timestamp, local_ts(2025, 6, 16, 8, 10));
        assert_eq!(last_high.kind, TideKind::High);

        let next_low = anchors.next_low.expect("14:45 low should be the next low");
        assert_eq!(next_low.timestamp, local_ts(2025, 6, 16, 14, 45));

        let next_high = anchors.next_high.expect("20:30 high should be the next high");
        assert_eq!(next_high.timestamp, local_ts(2025, 6, 16, 20, 30));

        assert!(anchors.last_low.is_none(), "no past low in this batch");
    }

    #[test]
    fn empty_input_yields_all_absent() {
        let anchors = extract_anchors(local_ts(2025, 6, 16, 11, 0), &[]);
        assert_eq!(anchors, ScheduleAnchors::default());
    }

    #[test]
    fn all_past_records_populate_only_last_slots() {
        let records = vec![
            record("2025-06-15 02:00", "H", "10.0"),
            record("2025-06-15 08:30", "L", "1.1"),
            record("2025-06-15 14:20", "H", "10.5"),
        ];
        let now = local_ts(2025, 6, 16, 11, 0);

        let anchors = extract_anchors(now, &records);
        assert!(anchors.next_high.is_none());
        assert!(anchors.next_low.is_none());
        // Latest past of each kind wins
        assert_eq!(
            anchors.last_high.unwrap().timestamp,
            local_ts(2025, 6, 15, 14, 20)
        );
        assert_eq!(
            anchors.last_low.unwrap().timestamp,
            local_ts(2025, 6, 15, 8, 30)
        );
    }

    #[test]
    fn all_future_records_populate_only_next_slots() {
        let records = vec![
            record("2025-06-17 03:00", "L", "0.9"),
            record("2025-06-17 09:10", "H", "11.0"),
            record("2025-06-17 15:30", "L", "1.2"),
        ];
        let now = local_ts(2025, 6, 16, 11, 0);

        let anchors = extract_anchors(now, &records);
        assert!(anchors.last_high.is_none());
        assert!(anchors.last_low.is_none());
        // Earliest future of each kind wins
        assert_eq!(
            anchors.next_low.unwrap().timestamp,
            local_ts(2025, 6, 17, 3, 0)
        );
        assert_eq!(
            anchors.next_high.unwrap().timestamp,
            local_ts(2025, 6, 17, 9, 10)
        );
    }

    #[test]
    fn record_at_exactly_now_counts_as_future() {
        let records = vec![record("2025-06-16 11:00", "H", "11.0")];
        let now = local_ts(2025, 6, 16, 11, 0);

        let anchors = extract_anchors(now, &records);
        assert!(anchors.next_high.is_some(), "timestamp == now is a next_* candidate");
        assert!(anchors.last_high.is_none());
    }

    #[test]
    fn later_duplicate_wins_on_identical_timestamp_and_kind() {
        let records = vec![
            record("2025-06-16 14:45", "L", "1.8"),
            record("2025-06-16 14:45", "L", "2.2"),
        ];
        let now = local_ts(2025, 6, 16, 11, 0);

        let anchors = extract_anchors(now, &records);
        let next_low = anchors.next_low.unwrap();
        assert_eq!(next_low.height_ft, 2.2, "later record in input order should win");
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let records = vec![
            record("not-a-date", "H", "11.2"),
            record("2025-06-16 14:45", "X", "1.8"), // unknown kind code
            record("2025-06-16 16:00", "L", "n/a"), // non-numeric height
            record("2025-06-16 20:30", "H", "10.9"),
        ];
        let now = local_ts(2025, 6, 16, 11, 0);

        let anchors = extract_anchors(now, &records);
        assert_eq!(
            anchors.next_high.unwrap().timestamp,
            local_ts(2025, 6, 16, 20, 30),
            "the one well-formed record should still be extracted"
        );
        assert!(anchors.next_low.is_none());
        assert!(anchors.last_high.is_none());
    }

    #[test]
    fn extraction_is_idempotent_on_identical_input() {
        let records = vec![
            record("2025-06-16 08:10", "H", "11.2"),
            record("2025-06-16 14:45", "L", "1.8"),
        ];
        let now = local_ts(2025, 6, 16, 11, 0);

        let first = extract_anchors(now, &records);
        let second = extract_anchors(now, &records);
        assert_eq!(first, second);
    }

    #[test]
    fn unordered_input_produces_same_anchors() {
        let ordered = vec![
            record("2025-06-16 08:10", "H", "11.2"),
            record("2025-06-16 14:45", "L", "1.8"),
            record("2025-06-16 20:30", "H", "10.9"),
        ];
        let shuffled = vec![
            record("2025-06-16 20:30", "H", "10.9"),
            record("2025-06-16 08:10", "H", "11.2"),
            record("2025-06-16 14:45", "L", "1.8"),
        ];
        let now = local_ts(2025, 6, 16, 11, 0);

        assert_eq!(extract_anchors(now, &ordered), extract_anchors(now, &shuffled));
    }
}
