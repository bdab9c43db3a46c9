use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A shift definition from the catalog. Start/end are local times of day;
/// deactivating a shift only blocks new assignments.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct WorkShift {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Morning")]
    pub name: String,

    #[schema(example = "08:00:00", value_type = String, format = "time")]
    pub start_time: NaiveTime,

    #[schema(example = "12:00:00", value_type = String, format = "time")]
    pub end_time: NaiveTime,

    #[schema(example = false)]
    pub part_time: bool,

    #[schema(example = true)]
    pub active: bool,
}
