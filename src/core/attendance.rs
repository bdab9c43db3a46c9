//! Attendance recorder rules: shift-window admission, PRESENT/LATE
//! derivation, and the absence sweep's excuse decision. Status is always
//! derived here, never taken from the client.

use crate::core::error::CoreError;
use crate::model::attendance::AttendanceStatus;
use crate::model::location::Location;
use chrono::{Duration, NaiveTime};

/// A check-in is admissible only while the shift window is open.
pub fn ensure_within_window(
    now: NaiveTime,
    shift_start: NaiveTime,
    shift_end: NaiveTime,
) -> Result<(), CoreError> {
    if now < shift_start || now > shift_end {
        return Err(CoreError::OutsideShiftWindow);
    }
    Ok(())
}

/// PRESENT up to `late_threshold_minutes` past the shift start, LATE after.
pub fn status_for_check_in(
    check_in: NaiveTime,
    shift_start: NaiveTime,
    late_threshold_minutes: i64,
) -> AttendanceStatus {
    if check_in <= shift_start + Duration::minutes(late_threshold_minutes) {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::Late
    }
}

/// What the absence sweep records for an assignment whose window elapsed
/// with no check-in: LEAVE if an approved leave or remote-work request
/// covers the day, ABSENT otherwise.
pub fn unattended_status(excused: bool) -> AttendanceStatus {
    if excused {
        AttendanceStatus::Leave
    } else {
        AttendanceStatus::Absent
    }
}

/// A deactivated site no longer admits check-ins; existing attendance
/// keeps its reference.
pub fn ensure_active_site(site: &Location) -> Result<(), CoreError> {
    if !site.active {
        return Err(CoreError::Validation(format!(
            "work site '{}' is deactivated",
            site.name
        )));
    }
    Ok(())
}

/// Identity confirmation: a check-in must carry a captured image.
pub fn ensure_image_ref(image_ref: &str) -> Result<(), CoreError> {
    if image_ref.trim().is_empty() {
        return Err(CoreError::Validation(
            "a captured image reference is required to check in".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn window_is_inclusive_at_both_edges() {
        assert!(ensure_within_window(t(8, 0), t(8, 0), t(12, 0)).is_ok());
        assert!(ensure_within_window(t(12, 0), t(8, 0), t(12, 0)).is_ok());
        assert!(ensure_within_window(t(7, 59), t(8, 0), t(12, 0)).is_err());
        assert!(ensure_within_window(t(12, 1), t(8, 0), t(12, 0)).is_err());
    }

    #[test]
    fn late_threshold_boundary() {
        // 08:05 with a 10 minute threshold is still present
        assert_eq!(
            status_for_check_in(t(8, 5), t(8, 0), 10),
            AttendanceStatus::Present
        );
        // exactly on the threshold counts as present
        assert_eq!(
            status_for_check_in(t(8, 10), t(8, 0), 10),
            AttendanceStatus::Present
        );
        assert_eq!(
            status_for_check_in(t(8, 11), t(8, 0), 10),
            AttendanceStatus::Late
        );
    }

    #[test]
    fn zero_threshold_means_present_only_at_start() {
        assert_eq!(
            status_for_check_in(t(8, 0), t(8, 0), 0),
            AttendanceStatus::Present
        );
        assert_eq!(
            status_for_check_in(t(8, 1), t(8, 0), 0),
            AttendanceStatus::Late
        );
    }

    #[test]
    fn unattended_assignments_split_on_excuse() {
        assert_eq!(unattended_status(true), AttendanceStatus::Leave);
        assert_eq!(unattended_status(false), AttendanceStatus::Absent);
    }

    #[test]
    fn deactivated_sites_refuse_check_in() {
        let mut site = Location {
            id: 1,
            name: "Head Office".into(),
            latitude: 23.8103,
            longitude: 90.4125,
            radius_meters: 200.0,
            active: true,
        };
        assert!(ensure_active_site(&site).is_ok());
        site.active = false;
        assert!(ensure_active_site(&site).is_err());
    }

    #[test]
    fn image_reference_is_mandatory() {
        assert!(ensure_image_ref("").is_err());
        assert!(ensure_image_ref("   ").is_err());
        assert!(ensure_image_ref("https://img.example/a.jpg").is_ok());
    }
}
