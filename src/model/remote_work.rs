use crate::core::workflow::RequestState;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A request to work a scheduled shift remotely. An approved request
/// excuses the day from the absence sweep.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct RemoteWorkRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = 3)]
    pub work_shift_id: u64,

    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "home internet installation")]
    pub reason: String,

    #[schema(example = "pending")]
    pub status: RequestState,

    #[schema(example = 1, nullable = true)]
    pub response_by: Option<u64>,

    #[schema(example = "approved for one day", nullable = true)]
    pub response_note: Option<String>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub response_date: Option<NaiveDateTime>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
