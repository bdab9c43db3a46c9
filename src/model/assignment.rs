use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A scheduled (employee, shift, date) obligation to work.
/// Unique on that triple; the unique key is what serializes
/// concurrent bulk assigns.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ShiftAssignment {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = 3)]
    pub work_shift_id: u64,

    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub date: NaiveDate,
}
