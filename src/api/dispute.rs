use crate::api::leave_request::DecisionNote;
use crate::auth::auth::AuthUser;
use crate::core::clock::Clock;
use crate::core::error::CoreError;
use crate::core::workflow::{self, Action, Actor, RequestKind, RequestState};
use crate::model::dispute::{Dispute, DisputeType};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{MySql, MySqlPool, Transaction};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateDispute {
    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub attendance_date: NaiveDate,
    #[schema(example = "missed_check_in")]
    pub dispute_type: DisputeType,
    #[schema(example = "badge reader was down")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams)]
pub struct DisputeFilter {
    /// Filter by request status
    pub status: Option<RequestState>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct DisputeListResponse {
    pub data: Vec<Dispute>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

const SELECT_DISPUTE: &str = r#"
    SELECT id, employee_id, attendance_date, dispute_type, reason, status,
           response_by, response_note, response_date, created_at
    FROM disputes
"#;

async fn fetch_for_update(
    tx: &mut Transaction<'_, MySql>,
    dispute_id: u64,
) -> Result<Dispute, CoreError> {
    let sql = format!("{SELECT_DISPUTE} WHERE id = ? FOR UPDATE");
    sqlx::query_as::<_, Dispute>(&sql)
        .bind(dispute_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(CoreError::NotFound("dispute"))
}

async fn write_decision(
    tx: &mut Transaction<'_, MySql>,
    dispute_id: u64,
    expected: RequestState,
    next: RequestState,
    response_by: u64,
    note: Option<&str>,
    now: chrono::NaiveDateTime,
) -> Result<(), CoreError> {
    let result = sqlx::query(
        r#"
        UPDATE disputes
        SET status = ?, response_by = ?, response_note = ?, response_date = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(next)
    .bind(response_by)
    .bind(note)
    .bind(now)
    .bind(dispute_id)
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
/// Raise an attendance dispute
///
/// Disputes are about days that already happened, so the date must not be
/// in the future.
#[utoipa::path(
    post,
    path = "/api/v1/disputes",
    request_body = CreateDispute,
    responses(
        (status = 201, description = "Dispute raised"),
        (status = 422, description = "Future date or missing reason"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Disputes"
)]
pub async fn create_dispute(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<CreateDispute>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    if payload.attendance_date > clock.today() {
        return Err(
            CoreError::Validation("cannot dispute a day that has not happened".into()).into(),
        );
    }
    let reason = payload.reason.trim();
    if reason.is_empty() {
        return Err(CoreError::Validation("a reason is required".into()).into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO disputes (employee_id, attendance_date, dispute_type, reason)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.attendance_date)
    .bind(payload.dispute_type)
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
/// Uphold a dispute
///
/// The decision note is the audit trail of what was corrected; it is
/// mandatory either way the dispute goes.
#[utoipa::path(
    put,
    path = "/api/v1/disputes/{id}/approve",
    params(("id" = u64, Path, description = "Dispute id")),
    request_body = DecisionNote,
    responses(
        (status = 200, description = "Dispute upheld"),
        (status = 409, description = "Dispute already decided"),
        (status = 422, description = "Missing note"),
        (status = 404, description = "Dispute not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Disputes"
)]
pub async fn approve_dispute(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<DecisionNote>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let dispute_id = path.into_inner();
    let note = workflow::require_note(Action::Approve, payload.note.as_deref())?;

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let dispute = fetch_for_update(&mut tx, dispute_id).await?;
    let transition = workflow::transition(
        RequestKind::Dispute,
        dispute.status,
        Actor::Admin,
        Action::Approve,
    )?;
    write_decision(
        &mut tx,
        dispute_id,
        dispute.status,
        transition.next,
        auth.user_id,
        note.as_deref(),
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    tracing::info!(dispute_id, "dispute upheld");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Dispute upheld"
    })))
}

/* =========================
Reject (Admin)
========================= */
/// Dismiss a dispute
#[utoipa::path(
    put,
    path = "/api/v1/disputes/{id}/reject",
    params(("id" = u64, Path, description = "Dispute id")),
    request_body = DecisionNote,
    responses(
        (status = 200, description = "Dispute dismissed"),
        (status = 409, description = "Dispute already decided"),
        (status = 422, description = "Missing note"),
        (status = 404, description = "Dispute not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Disputes"
)]
pub async fn reject_dispute(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<DecisionNote>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let dispute_id = path.into_inner();
    let note = workflow::require_note(Action::Reject, payload.note.as_deref())?;

    let mut tx = pool.begin().await.map_err(CoreError::from)?;
    let dispute = fetch_for_update(&mut tx, dispute_id).await?;
    let transition = workflow::transition(
        RequestKind::Dispute,
        dispute.status,
        Actor::Admin,
        Action::Reject,
    )?;
    write_decision(
        &mut tx,
        dispute_id,
        dispute.status,
        transition.next,
        auth.user_id,
        note.as_deref(),
        clock.now(),
    )
    .await?;
    tx.commit().await.map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Dispute dismissed"
    })))
}

/* =========================
List
========================= */
/// List disputes (admins all, employees their own)
#[utoipa::path(
    get,
    path = "/api/v1/disputes",
    params(DisputeFilter),
    responses(
        (status = 200, description = "Paginated dispute list", body = DisputeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Disputes"
)]
pub async fn list_disputes(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<DisputeFilter>,
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

    let count_sql = format!("SELECT COUNT(*) FROM disputes{}", where_sql);
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
        "{SELECT_DISPUTE}{}\n ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, Dispute>(&data_sql);
    if let Some(emp) = owner {
        data_q = data_q.bind(emp);
    }
    if let Some(status) = query.status {
        data_q = data_q.bind(status);
    }

    let disputes = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(DisputeListResponse {
        data: disputes,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
