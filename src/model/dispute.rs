use crate::core::workflow::RequestState;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DisputeType {
    MissedCheckIn,
    MissedCheckOut,
    WrongStatus,
    Other,
}

/// An attendance dispute raised by an employee, resolved by an admin with
/// a mandatory response note.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Dispute {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub attendance_date: NaiveDate,

    #[schema(example = "missed_check_in")]
    pub dispute_type: DisputeType,

    #[schema(example = "badge reader was down")]
    pub reason: String,

    #[schema(example = "pending")]
    pub status: RequestState,

    #[schema(example = 1, nullable = true)]
    pub response_by: Option<u64>,

    #[schema(example = "confirmed with facilities", nullable = true)]
    pub response_note: Option<String>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub response_date: Option<NaiveDateTime>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
