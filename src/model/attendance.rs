use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Attendance outcome for one assignment. Derived by the recorder or the
/// absence sweep, never supplied by the client.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Leave,
}

/// One day's attendance record, created lazily on first check-in (or by
/// the absence sweep). 1:1 with its assignment.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub assignment_id: u64,

    #[schema(example = "2026-09-01T08:05:00", value_type = String, format = "date-time", nullable = true)]
    pub check_in: Option<NaiveDateTime>,

    #[schema(example = "2026-09-01T12:01:00", value_type = String, format = "date-time", nullable = true)]
    pub check_out: Option<NaiveDateTime>,

    #[schema(example = 1, nullable = true)]
    pub location_id: Option<u64>,

    #[schema(example = "present")]
    pub status: AttendanceStatus,

    #[schema(example = "https://img.example/5f3a.jpg", nullable = true)]
    pub image_ref: Option<String>,
}
