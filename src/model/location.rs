use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered work site with its geofence radius.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Location {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Head Office")]
    pub name: String,

    #[schema(example = 23.8103)]
    pub latitude: f64,

    #[schema(example = 90.4125)]
    pub longitude: f64,

    #[schema(example = 200.0)]
    pub radius_meters: f64,

    #[schema(example = true)]
    pub active: bool,
}
