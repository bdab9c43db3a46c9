use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::core::clock::Clock;
use crate::core::error::CoreError;
use crate::core::ledger;
use crate::core::workflow::{self, Action, Actor, RequestKind, RequestState, SideEffect};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{MySql, MySqlPool, Transaction};
use utoipa::{IntoParams, ToSchema};

use crate::model::leave::{LeaveBalance, LeaveRequest};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-03", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "family matter")]
    pub reason: String,
}

/// Decision payload for approve/reject/decline endpoints.
#[derive(Deserialize, ToSchema)]
pub struct DecisionNote {
    #[schema(example = "ok")]
    pub note: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by request status
    pub status: Option<RequestState>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    State(RequestState),
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

const SELECT_LEAVE: &str = r#"
    SELECT id, employee_id, leave_type_id, start_date, end_date, reason,
           status, response_by, response_note, response_date, created_at
    FROM leave_requests
"#;

async fn fetch_for_update(
    tx: &mut Transaction<'_, MySql>,
    leave_id: u64,
) -> Result<LeaveRequest, CoreError> {
    let sql = format!("{SELECT_LEAVE} WHERE id = ? FOR UPDATE");
    sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(CoreError::NotFound("leave request"))
}

/// Apply the optimistic status write; zero rows means someone decided the
/// request between our read and our write.
async fn write_decision(
    tx: &mut Transaction<'_, MySql>,
    leave_id: u64,
    expected: RequestState,
    next: RequestState,
    response_by: u64,
    note: Option<&str>,
    now: chrono::NaiveDateTime,
) -> Result<(), CoreError> {
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?, response_by = ?, response_note = ?, response_date = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(next)
    .bind(response_by)
    .bind(note)
    .bind(now)
    .bind(leave_id)
    .bind(expected)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::StaleState);
    }
    Ok(())
}

/// Load (or open) the balance row for the request's year and apply the
/// ledger mutation, all under the caller's transaction.
async fn apply_ledger_effect(
    tx: &mut Transaction<'_, MySql>,
    request: &LeaveRequest,
    days: i32,
    effect: SideEffect,
    allow_negative: bool,
) -> Result<(), CoreError> {
    let year = request.start_date.year();

    let existing: Option<LeaveBalance> = sqlx::query_as(
        r#"
        SELECT employee_id, leave_type_id, year, entitled_day, used_day, remaining_day
        FROM leave_balances
        WHERE employee_id = ? AND leave_type_id = ? AND year = ?
        FOR UPDATE
        "#,
    )
    .bind(request.employee_id)
    .bind(request.leave_type_id)
    .bind(year)
    .fetch_optional(&mut **tx)
    .await?;

    let mut balance = match existing {
        Some(b) => b,
        None => {
            let entitled: Option<(i32,)> = sqlx::query_as(
                "SELECT max_day_per_year FROM leave_types WHERE id = ? AND active = TRUE",
            )
            .bind(request.leave_type_id)
            .fetch_optional(&mut **tx)
            .await?;
            let (entitled,) = entitled.ok_or_else(|| {
                CoreError::Validation("unknown or inactive leave type".into())
            })?;
            let opened =
                ledger::open_balance(request.employee_id, request.leave_type_id, year, entitled);
            sqlx::query(
                r#"
                INSERT INTO leave_balances
                    (employee_id, leave_type_id, year, entitled_day, used_day, remaining_day)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(opened.employee_id)
            .bind(opened.leave_type_id)
            .bind(opened.year)
            .bind(opened.entitled_day)
            .bind(opened.used_day)
            .bind(opened.remaining_day)
            .execute(&mut **tx)
            .await?;
            opened
        }
    };

    match effect {
        SideEffect::DebitLeave => ledger::debit(&mut balance, days, allow_negative)?,
        SideEffect::CreditLeave => ledger::credit(&mut balance, days)?,
        SideEffect::ReassignAssignment => {
            return Err(CoreError::Validation("misrouted side effect".into()));
        }
    }

    sqlx::query(
        r#"
        UPDATE leave_balances
        SET used_day = ?, remaining_day = ?
        WHERE employee_id = ? AND leave_type_id = ? AND year = ?
        "#,
    )
    .bind(balance.used_day)
    .bind(balance.remaining_day)
    .bind(balance.employee_id)
    .bind(balance.leave_type_id)
    .bind(balance.year)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/* =========================
Create leave request
========================= */
/// Apply for leave
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave request submitted"),
        (status = 422, description = "Invalid dates or leave type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let reason = payload.reason.trim();
    if reason.is_empty() {
        return Err(CoreError::Validation("a reason is required".into()).into());
    }
    // validates start <= end
    ledger::inclusive_days(payload.start_date, payload.end_date)?;

    let leave_type: Option<(bool,)> =
        sqlx::query_as("SELECT active FROM leave_types WHERE id = ?")
            .bind(payload.leave_type_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(CoreError::from)?;
    match leave_type {
        None => return Err(CoreError::NotFound("leave type").into()),
        Some((false,)) => {
            return Err(CoreError::Validation("leave type is inactive".into()).into());
        }
        Some((true,)) => {}
    }

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests (employee_id, leave_type_id, start_date, end_date, reason)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.leave_type_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave request");
        CoreError::from(e)
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": result.last_insert_id(),
        "status": RequestState::Pending,
    })))
}

/* =========================
Approve leave (Admin)
========================= */
/// Approve a pending leave request and debit the balance
///
/// Approval and the ledger debit commit together or not at all; an
/// insufficient balance (with negative balances disallowed) rejects the
/// approval and leaves both the request and the ledger untouched.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/approve",
    params(("id" = u64, Path, description = "Leave request id")),
    request_body = DecisionNote,
    responses(
        (status = 200, description = "Leave approved"),
        (status = 409, description = "Request already decided"),
        (status = 422, description = "Past start date, missing note, or insufficient balance"),
        (status = 404, description = "Leave request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<DecisionNote>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let leave_id = path.into_inner();
    let note = workflow::require_note(Action::Approve, payload.note.as_deref())?;

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, leave_id).await?;

    let transition = workflow::transition(
        RequestKind::Leave,
        request.status,
        Actor::Admin,
        Action::Approve,
    )?;

    if request.start_date < clock.today() {
        return Err(CoreError::PastDate(request.start_date).into());
    }
    let days = ledger::inclusive_days(request.start_date, request.end_date)?;

    for effect in transition.effects {
        apply_ledger_effect(&mut tx, &request, days, *effect, config.allow_negative_balance)
            .await?;
    }

    write_decision(
        &mut tx,
        leave_id,
        request.status,
        transition.next,
        auth.user_id,
        note.as_deref(),
        clock.now(),
    )
    .await?;

    tx.commit().await.map_err(CoreError::from)?;

    tracing::info!(leave_id, days, "leave approved");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave approved"
    })))
}

/* =========================
Reject leave (Admin)
========================= */
/// Reject a pending leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/reject",
    params(("id" = u64, Path, description = "Leave request id")),
    request_body = DecisionNote,
    responses(
        (status = 200, description = "Leave rejected"),
        (status = 409, description = "Request already decided"),
        (status = 422, description = "Missing note"),
        (status = 404, description = "Leave request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<DecisionNote>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let leave_id = path.into_inner();
    let note = workflow::require_note(Action::Reject, payload.note.as_deref())?;

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, leave_id).await?;
    let transition = workflow::transition(
        RequestKind::Leave,
        request.status,
        Actor::Admin,
        Action::Reject,
    )?;
    write_decision(
        &mut tx,
        leave_id,
        request.status,
        transition.next,
        auth.user_id,
        note.as_deref(),
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected"
    })))
}

/* =========================
Recall leave (owner)
========================= */
/// Withdraw one's own pending leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/recall",
    params(("id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave recalled"),
        (status = 409, description = "Request already decided"),
        (status = 404, description = "Leave request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn recall_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let leave_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, leave_id).await?;
    if request.employee_id != employee_id {
        return Err(actix_web::error::ErrorForbidden(
            "Only the requester may recall",
        ));
    }
    let transition = workflow::transition(
        RequestKind::Leave,
        request.status,
        Actor::Owner,
        Action::Recall,
    )?;
    write_decision(
        &mut tx,
        leave_id,
        request.status,
        transition.next,
        auth.user_id,
        None,
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave recalled"
    })))
}

/* =========================
Revert approval (Admin)
========================= */
/// Revert an approved leave and credit the balance back
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/revert",
    params(("id" = u64, Path, description = "Leave request id")),
    request_body = DecisionNote,
    responses(
        (status = 200, description = "Approval reverted"),
        (status = 409, description = "Request is not in an approved state"),
        (status = 422, description = "Missing note"),
        (status = 404, description = "Leave request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn revert_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<DecisionNote>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let leave_id = path.into_inner();
    let note = workflow::require_note(Action::Revert, payload.note.as_deref())?;

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, leave_id).await?;
    let transition = workflow::transition(
        RequestKind::Leave,
        request.status,
        Actor::Admin,
        Action::Revert,
    )?;
    let days = ledger::inclusive_days(request.start_date, request.end_date)?;

    for effect in transition.effects {
        apply_ledger_effect(&mut tx, &request, days, *effect, config.allow_negative_balance)
            .await?;
    }

    write_decision(
        &mut tx,
        leave_id,
        request.status,
        transition.next,
        auth.user_id,
        note.as_deref(),
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    tracing::info!(leave_id, days, "leave approval reverted");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave approval reverted"
    })))
}

/* =========================
Read paths
========================= */
/// Fetch one leave request
#[utoipa::path(
    get,
    path = "/api/v1/leave/{id}",
    params(("id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave request", body = LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let sql = format!("{SELECT_LEAVE} WHERE id = ?");
    let leave = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    let leave = leave.ok_or(CoreError::NotFound("leave request"))?;
    if !auth.is_admin() && leave.employee_id != auth.employee_id()? {
        return Err(actix_web::error::ErrorForbidden("Not your request"));
    }

    Ok(HttpResponse::Ok().json(leave))
}

/// List leave requests with filters
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    let employee_filter = if auth.is_admin() {
        query.employee_id
    } else {
        Some(auth.employee_id()?)
    };
    if let Some(emp_id) = employee_filter {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }
    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::State(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::State(s) => count_q.bind(*s),
        };
    }
    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    let data_sql = format!(
        "{SELECT_LEAVE}{}\n ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::State(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
