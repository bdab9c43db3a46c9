use crate::api::leave_request::DecisionNote;
use crate::auth::auth::AuthUser;
use crate::core::clock::Clock;
use crate::core::error::{CoreError, is_duplicate_key};
use crate::core::scheduler;
use crate::core::workflow::{self, Action, Actor, RequestKind, RequestState, SideEffect};
use crate::model::shift_change::ShiftChangeRequest;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{MySql, MySqlPool, Transaction};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateShiftChange {
    #[schema(example = 1001)]
    pub target_employee_id: u64,
    #[schema(example = 3)]
    pub work_shift_id: u64,
    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "doctor appointment clash")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams)]
pub struct ShiftChangeFilter {
    /// Filter by request status
    pub status: Option<RequestState>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ShiftChangeListResponse {
    pub data: Vec<ShiftChangeRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

const SELECT_REQUEST: &str = r#"
    SELECT id, requester_employee_id, target_employee_id, work_shift_id, date,
           reason, status, response_by, response_note, response_date, created_at
    FROM shift_change_requests
"#;

async fn fetch_for_update(
    tx: &mut Transaction<'_, MySql>,
    request_id: u64,
) -> Result<ShiftChangeRequest, CoreError> {
    let sql = format!("{SELECT_REQUEST} WHERE id = ? FOR UPDATE");
    sqlx::query_as::<_, ShiftChangeRequest>(&sql)
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(CoreError::NotFound("shift change request"))
}

async fn write_decision(
    tx: &mut Transaction<'_, MySql>,
    request_id: u64,
    expected: RequestState,
    next: RequestState,
    response_by: u64,
    note: Option<&str>,
    now: chrono::NaiveDateTime,
) -> Result<(), CoreError> {
    let result = sqlx::query(
        r#"
        UPDATE shift_change_requests
        SET status = ?, response_by = ?, response_note = ?, response_date = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(next)
    .bind(response_by)
    .bind(note)
    .bind(now)
    .bind(request_id)
    .bind(expected)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::StaleState);
    }
    Ok(())
}

/// Does the target currently hold the assignment the request is about?
async fn target_owns_assignment(
    tx: &mut Transaction<'_, MySql>,
    request: &ShiftChangeRequest,
) -> Result<bool, CoreError> {
    let row: Option<(u64,)> = sqlx::query_as(
        r#"
        SELECT id FROM shift_assignments
        WHERE employee_id = ? AND work_shift_id = ? AND date = ?
        "#,
    )
    .bind(request.target_employee_id)
    .bind(request.work_shift_id)
    .bind(request.date)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row.is_some())
}

/* =========================
Create (requester)
========================= */
/// Ask to take over a colleague's assignment
#[utoipa::path(
    post,
    path = "/api/v1/shift-change",
    request_body = CreateShiftChange,
    responses(
        (status = 201, description = "Request submitted"),
        (status = 422, description = "Self-targeted, past date, or unknown shift"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ShiftChange"
)]
pub async fn create_shift_change(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<CreateShiftChange>,
) -> actix_web::Result<impl Responder> {
    let requester = auth.employee_id()?;

    scheduler::ensure_distinct_parties(requester, payload.target_employee_id)?;
    scheduler::ensure_not_past(payload.date, clock.today())?;
    let reason = payload.reason.trim();
    if reason.is_empty() {
        return Err(CoreError::Validation("a reason is required".into()).into());
    }

    let shift: Option<(u64,)> = sqlx::query_as("SELECT id FROM work_shifts WHERE id = ?")
        .bind(payload.work_shift_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(CoreError::from)?;
    if shift.is_none() {
        return Err(CoreError::NotFound("shift").into());
    }
    let target: Option<(u64,)> = sqlx::query_as("SELECT id FROM employees WHERE id = ?")
        .bind(payload.target_employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(CoreError::from)?;
    if target.is_none() {
        return Err(CoreError::NotFound("employee").into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO shift_change_requests
            (requester_employee_id, target_employee_id, work_shift_id, date, reason)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(requester)
    .bind(payload.target_employee_id)
    .bind(payload.work_shift_id)
    .bind(payload.date)
    .bind(reason)
    .execute(pool.get_ref())
    .await
    .map_err(CoreError::from)?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": result.last_insert_id(),
        "status": RequestState::Pending,
    })))
}

/* =========================
Accept (target employee)
========================= */
/// Target employee consents to hand the assignment over
///
/// Consent is only meaningful while the target still holds the
/// assignment; ownership is re-verified here and again at approval.
#[utoipa::path(
    put,
    path = "/api/v1/shift-change/{id}/accept",
    params(("id" = u64, Path, description = "Request id")),
    responses(
        (status = 200, description = "Accepted, awaiting admin approval"),
        (status = 409, description = "Request already decided"),
        (status = 422, description = "Target no longer owns the assignment"),
        (status = 404, description = "Request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ShiftChange"
)]
pub async fn accept_shift_change(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let request_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, request_id).await?;
    if request.target_employee_id != employee_id {
        return Err(actix_web::error::ErrorForbidden(
            "Only the targeted employee may accept",
        ));
    }
    let transition = workflow::transition(
        RequestKind::ShiftChange,
        request.status,
        Actor::Counterparty,
        Action::Accept,
    )?;

    if !target_owns_assignment(&mut tx, &request).await? {
        return Err(CoreError::NotAssignmentOwner {
            employee_id: request.target_employee_id,
            shift_id: request.work_shift_id,
            date: request.date,
        }
        .into());
    }

    write_decision(
        &mut tx,
        request_id,
        request.status,
        transition.next,
        auth.user_id,
        None,
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Accepted, awaiting admin approval"
    })))
}

/* =========================
Decline (target employee)
========================= */
/// Target employee declines the swap (terminal)
#[utoipa::path(
    put,
    path = "/api/v1/shift-change/{id}/decline",
    params(("id" = u64, Path, description = "Request id")),
    request_body = DecisionNote,
    responses(
        (status = 200, description = "Declined"),
        (status = 409, description = "Request already decided"),
        (status = 422, description = "Missing note"),
        (status = 404, description = "Request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ShiftChange"
)]
pub async fn decline_shift_change(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<DecisionNote>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let request_id = path.into_inner();
    let note = workflow::require_note(Action::Decline, payload.note.as_deref())?;

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, request_id).await?;
    if request.target_employee_id != employee_id {
        return Err(actix_web::error::ErrorForbidden(
            "Only the targeted employee may decline",
        ));
    }
    let transition = workflow::transition(
        RequestKind::ShiftChange,
        request.status,
        Actor::Counterparty,
        Action::Decline,
    )?;
    write_decision(
        &mut tx,
        request_id,
        request.status,
        transition.next,
        auth.user_id,
        note.as_deref(),
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Request declined"
    })))
}

/* =========================
Approve (Admin)
========================= */
/// Approve an accepted swap and move the assignment
///
/// The assignment row is reassigned from the target to the requester in
/// the same transaction as the status write; if the requester already
/// works that (shift, date) the approval fails with a duplicate conflict.
#[utoipa::path(
    put,
    path = "/api/v1/shift-change/{id}/approve",
    params(("id" = u64, Path, description = "Request id")),
    request_body = DecisionNote,
    responses(
        (status = 200, description = "Approved, assignment moved"),
        (status = 409, description = "Request already decided or duplicate assignment"),
        (status = 422, description = "Missing note, past date, or target no longer owns the assignment"),
        (status = 404, description = "Request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ShiftChange"
)]
pub async fn approve_shift_change(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<DecisionNote>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let request_id = path.into_inner();
    let note = workflow::require_note(Action::Approve, payload.note.as_deref())?;

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, request_id).await?;
    let transition = workflow::transition(
        RequestKind::ShiftChange,
        request.status,
        Actor::Admin,
        Action::Approve,
    )?;

    // The assignment row is history once its date has passed; an accepted
    // request that sat past its own date can no longer be approved.
    scheduler::ensure_not_past(request.date, clock.today())?;

    for effect in transition.effects {
        match effect {
            SideEffect::ReassignAssignment => {
                let result = sqlx::query(
                    r#"
                    UPDATE shift_assignments
                    SET employee_id = ?
                    WHERE employee_id = ? AND work_shift_id = ? AND date = ?
                    "#,
                )
                .bind(request.requester_employee_id)
                .bind(request.target_employee_id)
                .bind(request.work_shift_id)
                .bind(request.date)
                .execute(&mut *tx)
                .await;

                match result {
                    Ok(r) if r.rows_affected() == 0 => {
                        return Err(CoreError::NotAssignmentOwner {
                            employee_id: request.target_employee_id,
                            shift_id: request.work_shift_id,
                            date: request.date,
                        }
                        .into());
                    }
                    Ok(_) => {}
                    Err(e) if is_duplicate_key(&e) => {
                        return Err(CoreError::DuplicateAssignment {
                            employee_id: request.requester_employee_id,
                            shift_id: request.work_shift_id,
                            date: request.date,
                        }
                        .into());
                    }
                    Err(e) => return Err(CoreError::from(e).into()),
                }
            }
            _ => return Err(CoreError::Validation("misrouted side effect".into()).into()),
        }
    }

    write_decision(
        &mut tx,
        request_id,
        request.status,
        transition.next,
        auth.user_id,
        note.as_deref(),
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    tracing::info!(request_id, "shift change approved and assignment moved");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Shift change approved"
    })))
}

/* =========================
Reject (Admin)
========================= */
/// Reject an accepted swap
#[utoipa::path(
    put,
    path = "/api/v1/shift-change/{id}/reject",
    params(("id" = u64, Path, description = "Request id")),
    request_body = DecisionNote,
    responses(
        (status = 200, description = "Rejected"),
        (status = 409, description = "Request already decided"),
        (status = 422, description = "Missing note"),
        (status = 404, description = "Request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ShiftChange"
)]
pub async fn reject_shift_change(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<DecisionNote>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let request_id = path.into_inner();
    let note = workflow::require_note(Action::Reject, payload.note.as_deref())?;

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, request_id).await?;
    let transition = workflow::transition(
        RequestKind::ShiftChange,
        request.status,
        Actor::Admin,
        Action::Reject,
    )?;
    write_decision(
        &mut tx,
        request_id,
        request.status,
        transition.next,
        auth.user_id,
        note.as_deref(),
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Shift change rejected"
    })))
}

/* =========================
Recall (requester)
========================= */
/// Withdraw one's own pending swap request
#[utoipa::path(
    put,
    path = "/api/v1/shift-change/{id}/recall",
    params(("id" = u64, Path, description = "Request id")),
    responses(
        (status = 200, description = "Recalled"),
        (status = 409, description = "Request already decided"),
        (status = 404, description = "Request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ShiftChange"
)]
pub async fn recall_shift_change(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let request_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, request_id).await?;
    if request.requester_employee_id != employee_id {
        return Err(actix_web::error::ErrorForbidden(
            "Only the requester may recall",
        ));
    }
    let transition = workflow::transition(
        RequestKind::ShiftChange,
        request.status,
        Actor::Owner,
        Action::Recall,
    )?;
    write_decision(
        &mut tx,
        request_id,
        request.status,
        transition.next,
        auth.user_id,
        None,
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Request recalled"
    })))
}

/* =========================
List
========================= */
/// List swap requests (admins all, employees those involving them)
#[utoipa::path(
    get,
    path = "/api/v1/shift-change",
    params(ShiftChangeFilter),
    responses(
        (status = 200, description = "Paginated request list", body = ShiftChangeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ShiftChange"
)]
pub async fn list_shift_changes(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ShiftChangeFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut involved: Option<u64> = None;
    if !auth.is_admin() {
        where_sql.push_str(" AND (requester_employee_id = ? OR target_employee_id = ?)");
        involved = Some(auth.employee_id()?);
    }
    if query.status.is_some() {
        where_sql.push_str(" AND status = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM shift_change_requests{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(emp) = involved {
        count_q = count_q.bind(emp).bind(emp);
    }
    if let Some(status) = query.status {
        count_q = count_q.bind(status);
    }
    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    let data_sql = format!(
        "{SELECT_REQUEST}{}\n ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, ShiftChangeRequest>(&data_sql);
    if let Some(emp) = involved {
        data_q = data_q.bind(emp).bind(emp);
    }
    if let Some(status) = query.status {
        data_q = data_q.bind(status);
    }

    let requests = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(ShiftChangeListResponse {
        data: requests,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
