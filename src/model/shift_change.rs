use crate::core::workflow::RequestState;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A two-phase swap request: the requester asks to take over the target's
/// assignment for (shift, date). The target must accept before an admin
/// can approve; approval moves the assignment row to the requester.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ShiftChangeRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub requester_employee_id: u64,

    #[schema(example = 1001)]
    pub target_employee_id: u64,

    #[schema(example = 3)]
    pub work_shift_id: u64,

    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "doctor appointment clash")]
    pub reason: String,

    #[schema(example = "pending")]
    pub status: RequestState,

    #[schema(example = 1, nullable = true)]
    pub response_by: Option<u64>,

    #[schema(example = "swap fine with me", nullable = true)]
    pub response_note: Option<String>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub response_date: Option<NaiveDateTime>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
