//! Single error type for the scheduling, attendance and workflow core.
//! Every rejection carries a stable machine-readable kind (the `error`
//! field of the JSON body) plus a human-readable message; the view layer
//! owns localization.

use crate::core::workflow::{Action, RequestState};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("date {0} is in the past")]
    PastDate(NaiveDate),

    #[error("assignment is historical and can no longer be removed")]
    PastAssignment,

    #[error("employee {employee_id} is already assigned to shift {shift_id} on {date}")]
    DuplicateAssignment {
        employee_id: u64,
        shift_id: u64,
        date: NaiveDate,
    },

    #[error("employee {employee_id} does not hold the assignment for shift {shift_id} on {date}")]
    NotAssignmentOwner {
        employee_id: u64,
        shift_id: u64,
        date: NaiveDate,
    },

    #[error("a shift change request cannot target its own requester")]
    SelfTarget,

    #[error("request was decided concurrently, refetch and retry")]
    StaleState,

    #[error("insufficient leave balance: requested {requested} day(s), {remaining} remaining")]
    InsufficientBalance { requested: i32, remaining: i32 },

    #[error("position is {distance_meters:.0} m from the work site (allowed radius {radius_meters:.0} m)")]
    OutOfRadius {
        distance_meters: f64,
        radius_meters: f64,
    },

    #[error("current time is outside the shift window")]
    OutsideShiftWindow,

    #[error("assignment already has a check-in")]
    AlreadyCheckedIn,

    #[error("no open check-in to close")]
    NotCheckedIn,

    #[error("no {action} transition from state {state}")]
    InvalidTransition {
        state: RequestState,
        action: Action,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("a collaborator timed out, retry later")]
    Transient,

    #[error("database error")]
    Database(#[source] sqlx::Error),
}

impl CoreError {
    /// Stable machine-readable kind, part of the API contract.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::PastDate(_) => "past_date",
            CoreError::PastAssignment => "past_assignment",
            CoreError::DuplicateAssignment { .. } => "duplicate_assignment",
            CoreError::NotAssignmentOwner { .. } => "ownership",
            CoreError::SelfTarget => "self_target",
            CoreError::StaleState => "stale_state",
            CoreError::InsufficientBalance { .. } => "insufficient_balance",
            CoreError::OutOfRadius { .. } => "out_of_radius",
            CoreError::OutsideShiftWindow => "outside_shift_window",
            CoreError::AlreadyCheckedIn => "already_checked_in",
            CoreError::NotCheckedIn => "not_checked_in",
            CoreError::InvalidTransition { .. } => "invalid_transition",
            CoreError::NotFound(_) => "not_found",
            CoreError::Transient => "transient",
            CoreError::Database(_) => "internal",
        }
    }
}

impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            // domain-rule violations
            CoreError::Validation(_)
            | CoreError::PastDate(_)
            | CoreError::NotAssignmentOwner { .. }
            | CoreError::SelfTarget
            | CoreError::InsufficientBalance { .. }
            | CoreError::OutOfRadius { .. }
            | CoreError::OutsideShiftWindow => StatusCode::UNPROCESSABLE_ENTITY,

            // state and invariant conflicts
            CoreError::PastAssignment
            | CoreError::DuplicateAssignment { .. }
            | CoreError::StaleState
            | CoreError::AlreadyCheckedIn
            | CoreError::NotCheckedIn
            | CoreError::InvalidTransition { .. } => StatusCode::CONFLICT,

            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Transient => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let CoreError::Database(e) = self {
            tracing::error!(error = %e, "database failure");
        }
        let message = match self {
            // never leak driver details
            CoreError::Database(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.kind(),
            "message": message,
        }))
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => CoreError::Transient,
            sqlx::Error::RowNotFound => CoreError::NotFound("record"),
            other => CoreError::Database(other),
        }
    }
}

/// MySQL reports unique-key collisions under SQLSTATE class 23000; both
/// the assignment and attendance unique keys surface through this.
pub fn is_duplicate_key(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23000"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_kinds_map_to_409() {
        for err in [
            CoreError::StaleState,
            CoreError::AlreadyCheckedIn,
            CoreError::PastAssignment,
            CoreError::DuplicateAssignment {
                employee_id: 1,
                shift_id: 2,
                date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            },
        ] {
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn domain_rule_kinds_map_to_422() {
        for err in [
            CoreError::PastDate(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
            CoreError::OutsideShiftWindow,
            CoreError::SelfTarget,
            CoreError::InsufficientBalance {
                requested: 3,
                remaining: 2,
            },
            CoreError::OutOfRadius {
                distance_meters: 500.0,
                radius_meters: 200.0,
            },
        ] {
            assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn transient_is_retryable_service_unavailable() {
        assert_eq!(
            CoreError::Transient.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(CoreError::from(sqlx::Error::PoolTimedOut).kind(), "transient");
    }

    #[test]
    fn kinds_are_stable_strings() {
        assert_eq!(CoreError::StaleState.kind(), "stale_state");
        assert_eq!(CoreError::OutsideShiftWindow.kind(), "outside_shift_window");
        assert_eq!(CoreError::NotCheckedIn.kind(), "not_checked_in");
    }
}
