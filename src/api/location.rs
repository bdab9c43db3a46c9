use crate::auth::auth::AuthUser;
use crate::core::error::CoreError;
use crate::model::location::Location;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateLocation {
    #[schema(example = "Head Office")]
    pub name: String,
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
    #[schema(example = 200.0)]
    pub radius_meters: f64,
}

/// Register a work site with its geofence
#[utoipa::path(
    post,
    path = "/api/v1/locations",
    request_body = CreateLocation,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 422, description = "Invalid coordinates or radius"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Locations"
)]
pub async fn create_location(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLocation>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("location name is required".into()).into());
    }
    if !(-90.0..=90.0).contains(&payload.latitude)
        || !(-180.0..=180.0).contains(&payload.longitude)
    {
        return Err(CoreError::Validation("coordinates out of range".into()).into());
    }
    if !payload.radius_meters.is_finite() || payload.radius_meters <= 0.0 {
        return Err(CoreError::Validation("radius_meters must be positive".into()).into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO locations (name, latitude, longitude, radius_meters, active)
        VALUES (?, ?, ?, ?, TRUE)
        "#,
    )
    .bind(name)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(payload.radius_meters)
    .execute(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    Ok(HttpResponse::Created().json(Location {
        id: result.last_insert_id(),
        name: name.to_string(),
        latitude: payload.latitude,
        longitude: payload.longitude,
        radius_meters: payload.radius_meters,
        active: true,
    }))
}

/// Deactivate a work site (blocks new check-ins; existing attendance
/// keeps its reference)
#[utoipa::path(
    put,
    path = "/api/v1/locations/{id}/deactivate",
    params(("id" = u64, Path, description = "Location id")),
    responses(
        (status = 200, description = "Work site deactivated"),
        (status = 404, description = "Location not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Locations"
)]
pub async fn deactivate_location(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let location_id = path.into_inner();

    let result = sqlx::query("UPDATE locations SET active = FALSE WHERE id = ?")
        .bind(location_id)
        .execute(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    if result.rows_affected() == 0 {
        return Err(CoreError::NotFound("location").into());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Work site deactivated"
    })))
}

/// List registered work sites
#[utoipa::path(
    get,
    path = "/api/v1/locations",
    responses(
        (status = 200, description = "Registered sites", body = [Location]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Locations"
)]
pub async fn list_locations(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let locations = sqlx::query_as::<_, Location>(
        "SELECT id, name, latitude, longitude, radius_meters, active FROM locations ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(locations))
}
