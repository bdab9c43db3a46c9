use crate::auth::auth::AuthUser;
use crate::core::clock::Clock;
use crate::core::error::{CoreError, is_duplicate_key};
use crate::core::scheduler;
use crate::model::assignment::ShiftAssignment;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct BulkAssign {
    #[schema(example = json!([1000, 1001]))]
    pub employee_ids: Vec<u64>,
    #[schema(example = json!([3]))]
    pub shift_ids: Vec<u64>,
    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub date_from: NaiveDate,
    #[schema(example = "2026-09-05", value_type = String, format = "date")]
    pub date_to: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct BulkAssignResponse {
    pub created: Vec<ShiftAssignment>,
}

/* =========================
Bulk assign (Admin)
========================= */
/// Assign employees to shifts over a date range
///
/// The cross product employees × shifts × dates is inserted in a single
/// transaction: any past date or duplicate tuple fails the whole batch, so
/// a published roster never has silent gaps.
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    request_body = BulkAssign,
    responses(
        (status = 201, description = "All assignments created", body = BulkAssignResponse),
        (status = 409, description = "A tuple collides with an existing assignment"),
        (status = 422, description = "Past date or invalid range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
pub async fn create_assignments(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<BulkAssign>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.employee_ids.is_empty() || payload.shift_ids.is_empty() {
        return Err(
            CoreError::Validation("employee_ids and shift_ids must be non-empty".into()).into(),
        );
    }

    let dates = scheduler::expand_range(payload.date_from, payload.date_to)?;
    let today = clock.today();
    for date in &dates {
        scheduler::ensure_not_past(*date, today)?;
    }

    let tuples = payload.employee_ids.len() * payload.shift_ids.len() * dates.len();
    if tuples > scheduler::MAX_BATCH_TUPLES {
        return Err(CoreError::Validation(format!(
            "batch of {tuples} assignments exceeds the limit of {}",
            scheduler::MAX_BATCH_TUPLES
        ))
        .into());
    }

    for shift_id in &payload.shift_ids {
        let active: Option<(bool,)> =
            sqlx::query_as("SELECT active FROM work_shifts WHERE id = ?")
                .bind(shift_id)
                .fetch_optional(pool.get_ref())
                .await
                .map_err(CoreError::from)?;
        match active {
            None => return Err(CoreError::NotFound("shift").into()),
            Some((false,)) => {
                return Err(CoreError::Validation(format!(
                    "shift {shift_id} is deactivated and cannot take new assignments"
                ))
                .into());
            }
            Some((true,)) => {}
        }
    }
    for employee_id in &payload.employee_ids {
        let exists: Option<(u64,)> = sqlx::query_as("SELECT id FROM employees WHERE id = ?")
            .bind(employee_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(CoreError::from)?;
        if exists.is_none() {
            return Err(CoreError::NotFound("employee").into());
        }
    }

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let mut created = Vec::with_capacity(tuples);

    for employee_id in &payload.employee_ids {
        for shift_id in &payload.shift_ids {
            for date in &dates {
                let result = sqlx::query(
                    r#"
                    INSERT INTO shift_assignments (employee_id, work_shift_id, date)
                    VALUES (?, ?, ?)
                    "#,
                )
                .bind(employee_id)
                .bind(shift_id)
                .bind(date)
                .execute(&mut *tx)
                .await;

                match result {
                    Ok(res) => created.push(ShiftAssignment {
                        id: res.last_insert_id(),
                        employee_id: *employee_id,
                        work_shift_id: *shift_id,
                        date: *date,
                    }),
                    // Dropping the transaction rolls the batch back.
                    Err(e) if is_duplicate_key(&e) => {
                        return Err(CoreError::DuplicateAssignment {
                            employee_id: *employee_id,
                            shift_id: *shift_id,
                            date: *date,
                        }
                        .into());
                    }
                    Err(e) => return Err(CoreError::from(e).into()),
                }
            }
        }
    }

    tx.commit().await.map_err(CoreError::from)?;

    tracing::info!(count = created.len(), "bulk assignment committed");
    Ok(HttpResponse::Created().json(BulkAssignResponse { created }))
}

/* =========================
Delete assignment (Admin)
========================= */
/// Remove a future assignment
#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{id}",
    params(("id" = u64, Path, description = "Assignment id")),
    responses(
        (status = 204, description = "Assignment removed"),
        (status = 409, description = "Assignment is historical or has attendance"),
        (status = 404, description = "Assignment not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
pub async fn delete_assignment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let assignment_id = path.into_inner();

    let row: Option<(NaiveDate, chrono::NaiveTime, i64)> = sqlx::query_as(
        r#"
        SELECT a.date, s.start_time,
               EXISTS(SELECT 1 FROM attendance t WHERE t.assignment_id = a.id)
        FROM shift_assignments a
        JOIN work_shifts s ON s.id = a.work_shift_id
        WHERE a.id = ?
        "#,
    )
    .bind(assignment_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    let (date, shift_start, has_attendance) =
        row.ok_or(CoreError::NotFound("assignment"))?;

    scheduler::ensure_deletable(date, shift_start, clock.now(), has_attendance != 0)?;

    // The attendance re-check rides inside the DELETE itself: a check-in
    // landing between the guard read and here leaves the row in place
    // instead of tripping the attendance foreign key.
    let result = sqlx::query(
        r#"
        DELETE a FROM shift_assignments a
        WHERE a.id = ?
          AND NOT EXISTS (SELECT 1 FROM attendance t WHERE t.assignment_id = a.id)
        "#,
    )
    .bind(assignment_id)
    .execute(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    if result.rows_affected() == 0 {
        return Err(CoreError::PastAssignment.into());
    }

    Ok(HttpResponse::NoContent().finish())
}

/* =========================
List assignments
========================= */
#[derive(Deserialize, IntoParams)]
pub struct AssignmentFilter {
    /// Filter by employee
    pub employee_id: Option<u64>,
    /// Filter by shift
    pub work_shift_id: Option<u64>,
    /// Filter by the employee's department
    pub department_id: Option<u64>,
    /// Inclusive start of the date window
    pub date_from: Option<NaiveDate>,
    /// Inclusive end of the date window
    pub date_to: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

#[derive(Serialize, ToSchema)]
pub struct AssignmentListResponse {
    pub data: Vec<ShiftAssignment>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/// List assignments with filter composition
///
/// Employees see their own schedule; admins can filter freely.
#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    params(AssignmentFilter),
    responses(
        (status = 200, description = "Paginated assignment list", body = AssignmentListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
pub async fn list_assignments(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AssignmentFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    // Non-admins are pinned to their own schedule regardless of filters.
    let employee_filter = if auth.is_admin() {
        query.employee_id
    } else {
        Some(auth.employee_id()?)
    };

    if let Some(emp_id) = employee_filter {
        where_sql.push_str(" AND a.employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }
    if let Some(shift_id) = query.work_shift_id {
        where_sql.push_str(" AND a.work_shift_id = ?");
        args.push(FilterValue::U64(shift_id));
    }
    if let Some(dept_id) = query.department_id {
        where_sql.push_str(" AND e.department_id = ?");
        args.push(FilterValue::U64(dept_id));
    }
    if let Some(from) = query.date_from {
        where_sql.push_str(" AND a.date >= ?");
        args.push(FilterValue::Date(from));
    }
    if let Some(to) = query.date_to {
        where_sql.push_str(" AND a.date <= ?");
        args.push(FilterValue::Date(to));
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM shift_assignments a JOIN employees e ON e.id = a.employee_id{}",
        where_sql
    );
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }
    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    let data_sql = format!(
        r#"
        SELECT a.id, a.employee_id, a.work_shift_id, a.date
        FROM shift_assignments a
        JOIN employees e ON e.id = a.employee_id
        {}
        ORDER BY a.date, a.id
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, ShiftAssignment>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let assignments = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(AssignmentListResponse {
        data: assignments,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
