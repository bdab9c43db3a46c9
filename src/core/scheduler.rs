//! Pure guards for the assignment scheduler. The handlers run these before
//! touching the database; the `(employee, shift, date)` unique key is the
//! final arbiter under concurrency.

use crate::core::error::CoreError;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Upper bound on one bulk assign call (employees × shifts × dates).
pub const MAX_BATCH_TUPLES: usize = 1_000;

/// Longest date range a single bulk assign may cover.
pub const MAX_RANGE_DAYS: usize = 92;

/// Expand an inclusive date range into its days.
pub fn expand_range(from: NaiveDate, to: NaiveDate) -> Result<Vec<NaiveDate>, CoreError> {
    if from > to {
        return Err(CoreError::Validation(
            "date_from must not be after date_to".into(),
        ));
    }
    let mut dates = Vec::new();
    let mut day = from;
    while day <= to {
        if dates.len() >= MAX_RANGE_DAYS {
            return Err(CoreError::Validation(format!(
                "date range exceeds {MAX_RANGE_DAYS} days"
            )));
        }
        dates.push(day);
        day = day
            .checked_add_days(Days::new(1))
            .ok_or_else(|| CoreError::Validation("date range overflows the calendar".into()))?;
    }
    Ok(dates)
}

/// Bulk assign is all-or-nothing: any past date fails the entire batch.
pub fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> Result<(), CoreError> {
    if date < today {
        return Err(CoreError::PastDate(date));
    }
    Ok(())
}

/// Worked (or in-progress) schedule data stays auditable: deletion is
/// refused once the date has passed, once today's shift has started, or
/// once an attendance record hangs off the assignment.
pub fn ensure_deletable(
    assignment_date: NaiveDate,
    shift_start: NaiveTime,
    now: NaiveDateTime,
    has_attendance: bool,
) -> Result<(), CoreError> {
    if has_attendance {
        return Err(CoreError::PastAssignment);
    }
    if assignment_date < now.date() {
        return Err(CoreError::PastAssignment);
    }
    if assignment_date == now.date() && shift_start <= now.time() {
        return Err(CoreError::PastAssignment);
    }
    Ok(())
}

/// A swap request must involve two distinct employees.
pub fn ensure_distinct_parties(requester: u64, target: u64) -> Result<(), CoreError> {
    if requester == target {
        return Err(CoreError::SelfTarget);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn expand_range_is_inclusive() {
        let dates = expand_range(d(2026, 9, 1), d(2026, 9, 3)).unwrap();
        assert_eq!(dates, vec![d(2026, 9, 1), d(2026, 9, 2), d(2026, 9, 3)]);
        assert_eq!(expand_range(d(2026, 9, 1), d(2026, 9, 1)).unwrap().len(), 1);
    }

    #[test]
    fn expand_range_rejects_inverted_and_oversized_ranges() {
        assert!(expand_range(d(2026, 9, 3), d(2026, 9, 1)).is_err());
        assert!(expand_range(d(2026, 1, 1), d(2026, 12, 31)).is_err());
    }

    #[test]
    fn past_dates_fail() {
        let today = d(2026, 9, 2);
        assert!(matches!(
            ensure_not_past(d(2026, 9, 1), today),
            Err(CoreError::PastDate(_))
        ));
        assert!(ensure_not_past(today, today).is_ok());
        assert!(ensure_not_past(d(2026, 9, 3), today).is_ok());
    }

    #[test]
    fn delete_guards() {
        let now = d(2026, 9, 2).and_time(t(9, 0));

        // yesterday: refused
        assert!(ensure_deletable(d(2026, 9, 1), t(8, 0), now, false).is_err());
        // today, shift started at 08:00: refused
        assert!(ensure_deletable(d(2026, 9, 2), t(8, 0), now, false).is_err());
        // today, shift starts at 14:00: allowed
        assert!(ensure_deletable(d(2026, 9, 2), t(14, 0), now, false).is_ok());
        // tomorrow: allowed
        assert!(ensure_deletable(d(2026, 9, 3), t(8, 0), now, false).is_ok());
        // future but attendance already linked: refused as the same
        // conflict the conditioned DELETE reports when a check-in races in
        assert!(matches!(
            ensure_deletable(d(2026, 9, 3), t(8, 0), now, true),
            Err(CoreError::PastAssignment)
        ));
    }

    #[test]
    fn swap_approval_is_refused_once_the_shift_date_has_passed() {
        // An accepted swap that waited past its own date would rewrite a
        // historical assignment row; the same guard that gates bulk
        // assign gates the reassignment.
        let today = d(2026, 9, 5);
        assert!(matches!(
            ensure_not_past(d(2026, 9, 4), today),
            Err(CoreError::PastDate(_))
        ));
        // approving on the shift day itself is still allowed
        assert!(ensure_not_past(d(2026, 9, 5), today).is_ok());
    }

    #[test]
    fn self_targeting_is_rejected() {
        assert!(matches!(
            ensure_distinct_parties(7, 7),
            Err(CoreError::SelfTarget)
        ));
        assert!(ensure_distinct_parties(7, 8).is_ok());
    }
}
