use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::core::attendance as rules;
use crate::core::clock::Clock;
use crate::core::error::{CoreError, is_duplicate_key};
use crate::core::geo;
use crate::model::attendance::Attendance;
use crate::model::location::Location;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 42)]
    pub assignment_id: u64,
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
    /// Opaque URL of the captured confirmation image.
    #[schema(example = "https://img.example/5f3a.jpg")]
    pub image_ref: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutRequest {
    #[schema(example = 7)]
    pub attendance_id: u64,
}

#[derive(sqlx::FromRow)]
struct CheckInContext {
    employee_id: u64,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    location_id: Option<u64>,
}

/* =========================
Check-in
========================= */
/// Geofenced check-in against today's assignment
///
/// Admission requires the caller to own the assignment, today's date, the
/// shift window to be open, the claimed position to fall inside the work
/// site's geofence, and a confirmation image. Status (present/late) is
/// derived from the configured late threshold.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in", body = Attendance),
        (status = 422, description = "Out of radius, outside shift window, deactivated site, or missing image"),
        (status = 409, description = "Already checked in"),
        (status = 404, description = "Assignment not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<CheckInRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    rules::ensure_image_ref(&payload.image_ref)?;
    if !(-90.0..=90.0).contains(&payload.latitude)
        || !(-180.0..=180.0).contains(&payload.longitude)
    {
        return Err(CoreError::Validation("coordinates out of range".into()).into());
    }

    let ctx: Option<CheckInContext> = sqlx::query_as(
        r#"
        SELECT a.employee_id, a.date, s.start_time, s.end_time, e.location_id
        FROM shift_assignments a
        JOIN work_shifts s ON s.id = a.work_shift_id
        JOIN employees e ON e.id = a.employee_id
        WHERE a.id = ?
        "#,
    )
    .bind(payload.assignment_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    let ctx = ctx.ok_or(CoreError::NotFound("assignment"))?;

    if ctx.employee_id != employee_id {
        return Err(actix_web::error::ErrorForbidden(
            "Assignment belongs to another employee",
        ));
    }

    let now = clock.now();
    if ctx.date != now.date() {
        return Err(CoreError::OutsideShiftWindow.into());
    }
    rules::ensure_within_window(now.time(), ctx.start_time, ctx.end_time)?;

    let location_id = ctx.location_id.ok_or_else(|| {
        CoreError::Validation("no work site is registered for this employee".into())
    })?;
    let site: Option<Location> = sqlx::query_as(
        "SELECT id, name, latitude, longitude, radius_meters, active FROM locations WHERE id = ?",
    )
    .bind(location_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(CoreError::from)?;
    let site = site.ok_or(CoreError::NotFound("work site"))?;
    rules::ensure_active_site(&site)?;

    let check = geo::validate(payload.latitude, payload.longitude, &site);
    if !check.within_radius {
        return Err(CoreError::OutOfRadius {
            distance_meters: check.distance_meters,
            radius_meters: site.radius_meters,
        }
        .into());
    }

    let status = rules::status_for_check_in(now.time(), ctx.start_time, config.late_threshold_minutes);

    // Single insert: either the whole attendance row lands or nothing
    // does, and the unique key on assignment_id serializes racing
    // check-ins for the same assignment.
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (assignment_id, check_in, location_id, status, image_ref)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.assignment_id)
    .bind(now)
    .bind(site.id)
    .bind(status)
    .bind(payload.image_ref.trim())
    .execute(pool.get_ref())
    .await;

    let result = match result {
        Ok(r) => r,
        Err(e) if is_duplicate_key(&e) => return Err(CoreError::AlreadyCheckedIn.into()),
        Err(e) => {
            tracing::error!(error = %e, employee_id, "Check-in failed");
            return Err(CoreError::from(e).into());
        }
    };

    Ok(HttpResponse::Ok().json(Attendance {
        id: result.last_insert_id(),
        assignment_id: payload.assignment_id,
        check_in: Some(now),
        check_out: None,
        location_id: Some(site.id),
        status,
        image_ref: Some(payload.image_ref.trim().to_string()),
    }))
}

/* =========================
Check-out
========================= */
/// Close an open check-in
///
/// No geofence re-check on the way out; only the timestamp is recorded.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Checked out", body = Attendance),
        (status = 409, description = "No open check-in to close"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<CheckOutRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let now = clock.now();

    let result = sqlx::query(
        r#"
        UPDATE attendance t
        JOIN shift_assignments a ON a.id = t.assignment_id
        SET t.check_out = ?
        WHERE t.id = ?
          AND a.employee_id = ?
          AND t.check_in IS NOT NULL
          AND t.check_out IS NULL
        "#,
    )
    .bind(now)
    .bind(payload.attendance_id)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Check-out failed");
        CoreError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(CoreError::NotCheckedIn.into());
    }

    let attendance = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, assignment_id, check_in, check_out, location_id, status, image_ref
        FROM attendance
        WHERE id = ?
        "#,
    )
    .bind(payload.attendance_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(attendance))
}
