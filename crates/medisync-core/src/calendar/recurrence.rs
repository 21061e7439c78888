//! Recurrence rules and time-of-day parsing.

use chrono::{NaiveDate, NaiveTime};

use crate::records::Frequency;

/// Build the RRULE string for a recurring schedule.
///
/// Returns `None` when the frequency is unrecognized, the end date is
/// absent, or start equals end (a single-day event needs no recurrence).
/// The end date becomes an inclusive UNTIL bound at 23:59:00 UTC.
pub fn build_rrule(
    repetitiveness: &str,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Option<String> {
    let freq = Frequency::parse(repetitiveness)?;
    let end = end_date?;
    if start_date == end {
        return None;
    }
    Some(format!(
        "RRULE:FREQ={};UNTIL={}T235900Z",
        freq.rrule_code(),
        end.format("%Y%m%d")
    ))
}

/// Parse an "HH:MM" entry, falling back to 09:00 on any failure.
pub fn parse_time_of_day(raw: &str) -> NaiveTime {
    try_parse(raw).unwrap_or_else(|| NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default())
}

fn try_parse(raw: &str) -> Option<NaiveTime> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    if minutes.contains(':') {
        return None;
    }
    let hh: u32 = hours.trim().parse().ok()?;
    let mm: u32 = minutes.trim().parse().ok()?;
    NaiveTime::from_hms_opt(hh, mm, 0)
}
