use crate::auth::auth::AuthUser;
use crate::core::clock::Clock;
use crate::core::error::CoreError;
use crate::model::leave::{LeaveBalance, LeaveType};
use actix_web::{HttpResponse, Responder, web};
use chrono::Datelike;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveType {
    #[schema(example = "Annual")]
    pub name: String,
    #[schema(example = 20)]
    pub max_day_per_year: i32,
}

/// Define a leave category
///
/// Editing the entitlement later only affects balance rows opened after
/// the edit; years already in progress keep their snapshot.
#[utoipa::path(
    post,
    path = "/api/v1/leave-types",
    request_body = CreateLeaveType,
    responses(
        (status = 201, description = "Leave type created", body = LeaveType),
        (status = 422, description = "Invalid entitlement"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("leave type name is required".into()).into());
    }
    if payload.max_day_per_year <= 0 {
        return Err(CoreError::Validation("max_day_per_year must be positive".into()).into());
    }

    let result = sqlx::query(
        "INSERT INTO leave_types (name, max_day_per_year, active) VALUES (?, ?, TRUE)",
    )
    .bind(name)
    .bind(payload.max_day_per_year)
    .execute(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    Ok(HttpResponse::Created().json(LeaveType {
        id: result.last_insert_id(),
        name: name.to_string(),
        max_day_per_year: payload.max_day_per_year,
        active: true,
    }))
}

/// List leave categories
#[utoipa::path(
    get,
    path = "/api/v1/leave-types",
    responses(
        (status = 200, description = "Leave categories", body = [LeaveType]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leave_types(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let types = sqlx::query_as::<_, LeaveType>(
        "SELECT id, name, max_day_per_year, active FROM leave_types ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(types))
}

#[derive(Deserialize, IntoParams)]
pub struct BalanceFilter {
    /// Employee to read balances for; defaults to the caller. Only admins
    /// may read other employees' balances.
    pub employee_id: Option<u64>,
    /// Defaults to the current year.
    pub year: Option<i32>,
}

/// Read leave balances for an employee and year
#[utoipa::path(
    get,
    path = "/api/v1/leave-balances",
    params(BalanceFilter),
    responses(
        (status = 200, description = "Balances", body = [LeaveBalance]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leave_balances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    query: web::Query<BalanceFilter>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match query.employee_id {
        Some(id) if auth.is_admin() => id,
        Some(id) if id == auth.employee_id()? => id,
        Some(_) => return Err(actix_web::error::ErrorForbidden("Admin only")),
        None => auth.employee_id()?,
    };
    let year = query.year.unwrap_or_else(|| clock.today().year());

    let balances = sqlx::query_as::<_, LeaveBalance>(
        r#"
        SELECT employee_id, leave_type_id, year, entitled_day, used_day, remaining_day
        FROM leave_balances
        WHERE employee_id = ? AND year = ?
        ORDER BY leave_type_id
        "#,
    )
    .bind(employee_id)
    .bind(year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(balances))
}
