use crate::auth::auth::AuthUser;
use crate::core::error::CoreError;
use crate::model::shift::WorkShift;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveTime;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateShift {
    #[schema(example = "Morning")]
    pub name: String,
    #[schema(example = "08:00:00", value_type = String, format = "time")]
    pub start_time: NaiveTime,
    #[schema(example = "12:00:00", value_type = String, format = "time")]
    pub end_time: NaiveTime,
    #[serde(default)]
    #[schema(example = false)]
    pub part_time: bool,
}

/// Add a shift definition to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/shifts",
    request_body = CreateShift,
    responses(
        (status = 201, description = "Shift created", body = WorkShift),
        (status = 422, description = "Invalid shift window"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn create_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("shift name is required".into()).into());
    }
    // Overnight shifts are not supported; a shift lives within one day.
    if payload.start_time >= payload.end_time {
        return Err(CoreError::Validation("start_time must be before end_time".into()).into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO work_shifts (name, start_time, end_time, part_time, active)
        VALUES (?, ?, ?, ?, TRUE)
        "#,
    )
    .bind(name)
    .bind(payload.start_time)
    .bind(payload.end_time)
    .bind(payload.part_time)
    .execute(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    Ok(HttpResponse::Created().json(WorkShift {
        id: result.last_insert_id(),
        name: name.to_string(),
        start_time: payload.start_time,
        end_time: payload.end_time,
        part_time: payload.part_time,
        active: true,
    }))
}

/// List the shift catalog
#[utoipa::path(
    get,
    path = "/api/v1/shifts",
    responses(
        (status = 200, description = "Shift catalog", body = [WorkShift]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn list_shifts(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let shifts = sqlx::query_as::<_, WorkShift>(
        "SELECT id, name, start_time, end_time, part_time, active FROM work_shifts ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(shifts))
}

/// Deactivate a shift (blocks new assignments only; existing assignments
/// and their attendance stay valid)
#[utoipa::path(
    put,
    path = "/api/v1/shifts/{id}/deactivate",
    params(("id" = u64, Path, description = "Shift id")),
    responses(
        (status = 200, description = "Shift deactivated"),
        (status = 404, description = "Shift not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Shifts"
)]
pub async fn deactivate_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let shift_id = path.into_inner();

    let result = sqlx::query("UPDATE work_shifts SET active = FALSE WHERE id = ?")
        .bind(shift_id)
        .execute(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    if result.rows_affected() == 0 {
        return Err(CoreError::NotFound("shift").into());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Shift deactivated"
    })))
}
