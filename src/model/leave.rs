use crate::core::workflow::RequestState;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A leave category with its yearly entitlement.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveType {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Annual")]
    pub name: String,

    #[schema(example = 20)]
    pub max_day_per_year: i32,

    #[schema(example = true)]
    pub active: bool,
}

/// Per-(employee, leave type, year) day accounting. `entitled_day` is the
/// entitlement snapshotted when the row was opened, so
/// `used_day + remaining_day == entitled_day` holds for the row's whole
/// lifetime even if the leave type is edited later.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = 1)]
    pub leave_type_id: u64,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(example = 20)]
    pub entitled_day: i32,

    #[schema(example = 3)]
    pub used_day: i32,

    #[schema(example = 17)]
    pub remaining_day: i32,
}

/// A leave application. Mutated only through workflow transitions and
/// never hard-deleted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = 1)]
    pub leave_type_id: u64,

    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-09-03", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = "family matter")]
    pub reason: String,

    #[schema(example = "pending")]
    pub status: RequestState,

    #[schema(example = 1, nullable = true)]
    pub response_by: Option<u64>,

    #[schema(example = "ok", nullable = true)]
    pub response_note: Option<String>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub response_date: Option<NaiveDateTime>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
