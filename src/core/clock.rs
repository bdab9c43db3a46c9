use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Source of "now" for every temporal guard. Handlers receive this as
/// shared app data so tests can pin the wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn time_of_day(&self) -> NaiveTime {
        self.now().time()
    }
}

/// Local wall-clock time. Shift windows and assignment dates are local
/// civil time, matching how the rosters are written.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock pinned to a fixed instant, for deterministic tests.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_derives_date_and_time() {
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2026, 9, 1)
                .unwrap()
                .and_hms_opt(8, 5, 0)
                .unwrap(),
        );
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());
        assert_eq!(clock.time_of_day(), NaiveTime::from_hms_opt(8, 5, 0).unwrap());
    }
}
