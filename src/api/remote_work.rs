use crate::api::leave_request::DecisionNote;
use crate::auth::auth::AuthUser;
use crate::core::clock::Clock;
use crate::core::error::CoreError;
use crate::core::scheduler;
use crate::core::workflow::{self, Action, Actor, RequestKind, RequestState};
use crate::model::remote_work::RemoteWorkRequest;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{MySql, MySqlPool, Transaction};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateRemoteWork {
    #[schema(example = 3)]
    pub work_shift_id: u64,
    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "home internet installation")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams)]
pub struct RemoteWorkFilter {
    /// Filter by request status
    pub status: Option<RequestState>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct RemoteWorkListResponse {
    pub data: Vec<RemoteWorkRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

const SELECT_REQUEST: &str = r#"
    SELECT id, employee_id, work_shift_id, date, reason, status,
           response_by, response_note, response_date, created_at
    FROM remote_work_requests
"#;

async fn fetch_for_update(
    tx: &mut Transaction<'_, MySql>,
    request_id: u64,
) -> Result<RemoteWorkRequest, CoreError> {
    let sql = format!("{SELECT_REQUEST} WHERE id = ? FOR UPDATE");
    sqlx::query_as::<_, RemoteWorkRequest>(&sql)
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(CoreError::NotFound("remote work request"))
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
        UPDATE remote_work_requests
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

/* =========================
Create
========================= */
/// Ask to work a scheduled shift from home
///
/// The request must point at a shift the caller is actually assigned to
/// on that date; an approved request excuses the day from the absence
/// sweep.
#[utoipa::path(
    post,
    path = "/api/v1/remote-work",
    request_body = CreateRemoteWork,
    responses(
        (status = 201, description = "Request submitted"),
        (status = 422, description = "Past date, missing reason, or no such assignment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "RemoteWork"
)]
pub async fn create_remote_work(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<CreateRemoteWork>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    scheduler::ensure_not_past(payload.date, clock.today())?;
    let reason = payload.reason.trim();
    if reason.is_empty() {
        return Err(CoreError::Validation("a reason is required".into()).into());
    }

    let assignment: Option<(u64,)> = sqlx::query_as(
        r#"
        SELECT id FROM shift_assignments
        WHERE employee_id = ? AND work_shift_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(payload.work_shift_id)
    .bind(payload.date)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(CoreError::from)?;
    if assignment.is_none() {
        return Err(CoreError::NotAssignmentOwner {
            employee_id,
            shift_id: payload.work_shift_id,
            date: payload.date,
        }
        .into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO remote_work_requests (employee_id, work_shift_id, date, reason)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
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
Approve (Admin)
========================= */
/// Approve a remote work request
#[utoipa::path(
    put,
    path = "/api/v1/remote-work/{id}/approve",
    params(("id" = u64, Path, description = "Request id")),
    request_body = DecisionNote,
    responses(
        (status = 200, description = "Approved"),
        (status = 409, description = "Request already decided"),
        (status = 422, description = "Missing note"),
        (status = 404, description = "Request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "RemoteWork"
)]
pub async fn approve_remote_work(
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
        RequestKind::RemoteWork,
        request.status,
        Actor::Admin,
        Action::Approve,
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
        "message": "Remote work approved"
    })))
}

/* =========================
Reject (Admin)
========================= */
/// Reject a remote work request
#[utoipa::path(
    put,
    path = "/api/v1/remote-work/{id}/reject",
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
    tag = "RemoteWork"
)]
pub async fn reject_remote_work(
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
        RequestKind::RemoteWork,
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
        "message": "Remote work rejected"
    })))
}

/* =========================
Recall (owner)
========================= */
/// Withdraw one's own pending request
#[utoipa::path(
    put,
    path = "/api/v1/remote-work/{id}/recall",
    params(("id" = u64, Path, description = "Request id")),
    responses(
        (status = 200, description = "Recalled"),
        (status = 409, description = "Request already decided"),
        (status = 404, description = "Request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "RemoteWork"
)]
pub async fn recall_remote_work(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let request_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let request = fetch_for_update(&mut tx, request_id).await?;
    if request.employee_id != employee_id {
        return Err(actix_web::error::ErrorForbidden(
            "Only the requester may recall",
        ));
    }
    let transition = workflow::transition(
        RequestKind::RemoteWork,
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
/// List remote work requests (admins all, employees their own)
#[utoipa::path(
    get,
    path = "/api/v1/remote-work",
    params(RemoteWorkFilter),
    responses(
        (status = 200, description = "Paginated request list", body = RemoteWorkListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "RemoteWork"
)]
pub async fn list_remote_work(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RemoteWorkFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut owner: Option<u64> = None;
    if !auth.is_admin() {
        where_sql.push_str(" AND employee_id = ?");
        owner = Some(auth.employee_id()?);
    }
    if query.status.is_some() {
        where_sql.push_str(" AND status = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM remote_work_requests{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(emp) = owner {
        count_q = count_q.bind(emp);
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
    let mut data_q = sqlx::query_as::<_, RemoteWorkRequest>(&data_sql);
    if let Some(emp) = owner {
        data_q = data_q.bind(emp);
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

    Ok(HttpResponse::Ok().json(RemoteWorkListResponse {
        data: requests,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
