//! Leave balance arithmetic. Balances are mutated only here, inside the
//! workflow transaction that triggers them, and always conserve
//! `used_day + remaining_day == entitled_day`.

use crate::core::error::CoreError;
use crate::model::leave::LeaveBalance;
use chrono::{Datelike, NaiveDate};

/// Open a fresh balance row for a year, snapshotting the entitlement so
/// later edits to the leave type leave this year untouched.
pub fn open_balance(
    employee_id: u64,
    leave_type_id: u64,
    year: i32,
    entitled_day: i32,
) -> LeaveBalance {
    LeaveBalance {
        employee_id,
        leave_type_id,
        year,
        entitled_day,
        used_day: 0,
        remaining_day: entitled_day,
    }
}

/// Inclusive day count of a leave span. A span is debited against a
/// single (employee, type, year) balance row, so it must not cross a
/// year boundary; New Year straddlers are filed as two requests.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> Result<i32, CoreError> {
    if start > end {
        return Err(CoreError::Validation(
            "start_date must not be after end_date".into(),
        ));
    }
    if start.year() != end.year() {
        return Err(CoreError::Validation(
            "a leave span must fall within one calendar year".into(),
        ));
    }
    Ok((end - start).num_days() as i32 + 1)
}

pub fn debit(
    balance: &mut LeaveBalance,
    days: i32,
    allow_negative: bool,
) -> Result<(), CoreError> {
    if days <= 0 {
        return Err(CoreError::Validation("debit must be a positive day count".into()));
    }
    if !allow_negative && days > balance.remaining_day {
        return Err(CoreError::InsufficientBalance {
            requested: days,
            remaining: balance.remaining_day,
        });
    }
    balance.used_day += days;
    balance.remaining_day -= days;
    Ok(())
}

/// Inverse of `debit`, used when an approved leave is reverted. Never
/// credits more than was used.
pub fn credit(balance: &mut LeaveBalance, days: i32) -> Result<(), CoreError> {
    if days <= 0 {
        return Err(CoreError::Validation("credit must be a positive day count".into()));
    }
    if days > balance.used_day {
        return Err(CoreError::Validation(format!(
            "credit of {days} day(s) exceeds the {} day(s) used",
            balance.used_day
        )));
    }
    balance.used_day -= days;
    balance.remaining_day += days;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conserved(b: &LeaveBalance) -> bool {
        b.used_day + b.remaining_day == b.entitled_day
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inclusive_day_count() {
        assert_eq!(inclusive_days(date(2026, 9, 1), date(2026, 9, 1)).unwrap(), 1);
        assert_eq!(inclusive_days(date(2026, 9, 1), date(2026, 9, 3)).unwrap(), 3);
        assert!(inclusive_days(date(2026, 9, 3), date(2026, 9, 1)).is_err());
    }

    #[test]
    fn spans_crossing_a_year_boundary_are_rejected() {
        // Dec 28 – Jan 3 would charge the January days to the old year's
        // balance; such a span must be filed as two requests.
        assert!(inclusive_days(date(2026, 12, 28), date(2027, 1, 3)).is_err());
        // the year's edges themselves are fine
        assert_eq!(
            inclusive_days(date(2026, 12, 28), date(2026, 12, 31)).unwrap(),
            4
        );
        assert_eq!(inclusive_days(date(2027, 1, 1), date(2027, 1, 3)).unwrap(), 3);
    }

    #[test]
    fn debit_and_credit_conserve_the_entitlement() {
        let mut b = open_balance(1000, 1, 2026, 20);
        assert!(conserved(&b));

        debit(&mut b, 3, false).unwrap();
        assert_eq!(b.used_day, 3);
        assert_eq!(b.remaining_day, 17);
        assert!(conserved(&b));

        credit(&mut b, 3).unwrap();
        assert_eq!(b.used_day, 0);
        assert_eq!(b.remaining_day, 20);
        assert!(conserved(&b));
    }

    #[test]
    fn overdraw_is_refused_and_leaves_the_balance_untouched() {
        let mut b = open_balance(1000, 1, 2026, 20);
        debit(&mut b, 18, false).unwrap();

        let err = debit(&mut b, 3, false).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientBalance { requested: 3, remaining: 2 }
        ));
        assert_eq!(b.used_day, 18);
        assert_eq!(b.remaining_day, 2);
        assert!(conserved(&b));
    }

    #[test]
    fn negative_balance_policy_allows_overdraw_but_stays_conserved() {
        let mut b = open_balance(1000, 1, 2026, 2);
        debit(&mut b, 5, true).unwrap();
        assert_eq!(b.used_day, 5);
        assert_eq!(b.remaining_day, -3);
        assert!(conserved(&b));
    }

    #[test]
    fn credit_never_exceeds_usage() {
        let mut b = open_balance(1000, 1, 2026, 20);
        debit(&mut b, 2, false).unwrap();
        assert!(credit(&mut b, 3).is_err());
        assert!(conserved(&b));
    }

    #[test]
    fn non_positive_amounts_are_invalid() {
        let mut b = open_balance(1000, 1, 2026, 20);
        assert!(debit(&mut b, 0, false).is_err());
        assert!(debit(&mut b, -1, true).is_err());
        assert!(credit(&mut b, 0).is_err());
    }
}
