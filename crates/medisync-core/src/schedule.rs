//! Dose-schedule arithmetic.
//!
//! Pure date math shared by the lifecycle handler: deriving a missing end
//! date from a repetition count, finding the next dose on or after today,
//! and the completed-medicines percentage shown on the patient record.

use chrono::{Days, Months, NaiveDate};

use crate::records::{Frequency, Medicine, MedicineStatus};

/// Upper bound on next-dose stepping, matching the longest schedule the
/// record form accepts.
const MAX_NEXT_DOSE_STEPS: u32 = 400;

/// End date of a schedule with `count` occurrences starting at `start`.
///
/// Daily steps by days, weekly by 7 days, monthly by calendar months.
/// `None` for an unrecognized frequency or a zero count.
pub fn auto_end_date(start: NaiveDate, repetitiveness: &str, count: u32) -> Option<NaiveDate> {
    if count == 0 {
        return None;
    }
    let n = count - 1;
    match Frequency::parse(repetitiveness)? {
        Frequency::Daily => start.checked_add_days(Days::new(u64::from(n))),
        Frequency::Weekly => start.checked_add_days(Days::new(u64::from(n) * 7)),
        Frequency::Monthly => start.checked_add_months(Months::new(n)),
    }
}

/// First occurrence of the schedule on or after `today`.
///
/// `None` when the frequency is unrecognized or the schedule has run out
/// (past `end_date`).
pub fn next_dose(
    start: NaiveDate,
    repetitiveness: &str,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let freq = Frequency::parse(repetitiveness)?;
    let mut next = start;
    if next >= today {
        return Some(next);
    }
    for _ in 0..MAX_NEXT_DOSE_STEPS {
        next = step(next, freq)?;
        if let Some(end) = end_date {
            if next > end {
                return None;
            }
        }
        if next >= today {
            return Some(next);
        }
    }
    None
}

fn step(date: NaiveDate, freq: Frequency) -> Option<NaiveDate> {
    match freq {
        Frequency::Daily => date.checked_add_days(Days::new(1)),
        Frequency::Weekly => date.checked_add_days(Days::new(7)),
        Frequency::Monthly => date.checked_add_months(Months::new(1)),
    }
}

/// Rounded percentage of medicines whose status is Completed.
pub fn medicine_progress(medicines: &[Medicine]) -> u8 {
    if medicines.is_empty() {
        return 0;
    }
    let completed = medicines
        .iter()
        .filter(|m| m.status_kind() == MedicineStatus::Completed)
        .count();
    ((completed as f64 / medicines.len() as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Medicine;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn auto_end_date_daily_and_weekly() {
        assert_eq!(
            auto_end_date(d(2024, 1, 1), "Daily", 10),
            Some(d(2024, 1, 10))
        );
        assert_eq!(
            auto_end_date(d(2024, 1, 1), "weekly", 3),
            Some(d(2024, 1, 15))
        );
    }

    #[test]
    fn auto_end_date_monthly_steps_calendar_months() {
        assert_eq!(
            auto_end_date(d(2024, 1, 31), "Monthly", 2),
            Some(d(2024, 2, 29))
        );
        assert_eq!(
            auto_end_date(d(2024, 1, 15), "Monthly", 4),
            Some(d(2024, 4, 15))
        );
    }

    #[test]
    fn auto_end_date_rejects_zero_and_unknown() {
        assert_eq!(auto_end_date(d(2024, 1, 1), "Daily", 0), None);
        assert_eq!(auto_end_date(d(2024, 1, 1), "Hourly", 5), None);
        assert_eq!(auto_end_date(d(2024, 1, 1), "", 5), None);
    }

    #[test]
    fn auto_end_date_single_occurrence_is_start() {
        assert_eq!(auto_end_date(d(2024, 1, 1), "Daily", 1), Some(d(2024, 1, 1)));
    }

    #[test]
    fn next_dose_future_start_is_start() {
        let today = d(2024, 6, 1);
        assert_eq!(
            next_dose(d(2024, 6, 10), "Daily", None, today),
            Some(d(2024, 6, 10))
        );
    }

    #[test]
    fn next_dose_daily_started_in_past_is_today() {
        let today = d(2024, 6, 1);
        assert_eq!(
            next_dose(d(2024, 5, 1), "Daily", Some(d(2024, 12, 31)), today),
            Some(today)
        );
    }

    #[test]
    fn next_dose_weekly_lands_on_cycle() {
        let today = d(2024, 1, 10);
        // Weekly from Jan 1: Jan 1, 8, 15, ...
        assert_eq!(
            next_dose(d(2024, 1, 1), "Weekly", None, today),
            Some(d(2024, 1, 15))
        );
    }

    #[test]
    fn next_dose_none_after_end_date() {
        let today = d(2024, 6, 1);
        assert_eq!(
            next_dose(d(2024, 5, 1), "Weekly", Some(d(2024, 5, 20)), today),
            None
        );
    }

    #[test]
    fn next_dose_unknown_frequency() {
        assert_eq!(next_dose(d(2024, 5, 1), "sometimes", None, d(2024, 6, 1)), None);
    }

    #[test]
    fn progress_counts_completed() {
        let completed = Medicine {
            status: "Completed".into(),
            ..Medicine::default()
        };
        let active = Medicine {
            status: "Active".into(),
            ..Medicine::default()
        };
        assert_eq!(medicine_progress(&[]), 0);
        assert_eq!(medicine_progress(&[completed.clone(), active.clone()]), 50);
        assert_eq!(medicine_progress(&[completed.clone()]), 100);
        assert_eq!(
            medicine_progress(&[completed, active.clone(), active]),
            33
        );
    }
}
