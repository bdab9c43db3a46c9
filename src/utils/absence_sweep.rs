use crate::core::attendance as rules;
use crate::core::clock::Clock;
use crate::core::error::is_duplicate_key;
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

/// An assignment whose shift window has fully elapsed with no attendance
/// row. Candidates are resolved to `leave` (excused) or `absent`.
#[derive(sqlx::FromRow)]
struct SweepCandidate {
    assignment_id: u64,
    employee_id: u64,
    date: NaiveDate,
    end_time: NaiveTime,
}

/// Periodically mark elapsed assignments that never got a check-in.
///
/// Runs forever; a failed pass is logged and retried on the next tick so
/// a transient database outage never kills the sweeper.
pub async fn run(pool: MySqlPool, clock: Arc<dyn Clock>, interval_secs: u64) {
    let mut ticker = actix_web::rt::time::interval(Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        match sweep_once(&pool, clock.as_ref()).await {
            Ok(0) => {}
            Ok(n) => tracing::info!(marked = n, "absence sweep pass complete"),
            Err(e) => tracing::error!(error = %e, "absence sweep pass failed"),
        }
    }
}

/// One sweep pass. Returns the number of attendance rows written.
pub async fn sweep_once(pool: &MySqlPool, clock: &dyn Clock) -> Result<u64> {
    let now = clock.now();

    // Past days qualify outright; today's assignments only once the shift
    // window has closed.
    let candidates: Vec<SweepCandidate> = sqlx::query_as(
        r#"
        SELECT a.id AS assignment_id, a.employee_id, a.date, s.end_time
        FROM shift_assignments a
        JOIN work_shifts s ON s.id = a.work_shift_id
        LEFT JOIN attendance t ON t.assignment_id = a.id
        WHERE t.id IS NULL AND a.date <= ?
        "#,
    )
    .bind(now.date())
    .fetch_all(pool)
    .await?;

    let mut marked = 0u64;
    for candidate in candidates {
        if candidate.date == now.date() && now.time() <= candidate.end_time {
            continue;
        }

        let excused = is_excused(pool, candidate.employee_id, candidate.date).await?;
        let status = rules::unattended_status(excused);

        let result = sqlx::query(
            "INSERT INTO attendance (assignment_id, status) VALUES (?, ?)",
        )
        .bind(candidate.assignment_id)
        .bind(status)
        .execute(pool)
        .await;

        match result {
            Ok(_) => marked += 1,
            // A check-in or a concurrent sweeper beat us to the row.
            Err(e) if is_duplicate_key(&e) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(marked)
}

/// Approved leave covering the date, or approved remote work for it,
/// excuses the absence.
async fn is_excused(pool: &MySqlPool, employee_id: u64, date: NaiveDate) -> Result<bool> {
    let leave: Option<(u64,)> = sqlx::query_as(
        r#"
        SELECT id FROM leave_requests
        WHERE employee_id = ? AND status = 'approved'
          AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .bind(date)
    .fetch_optional(pool)
    .await?;
    if leave.is_some() {
        return Ok(true);
    }

    let remote: Option<(u64,)> = sqlx::query_as(
        r#"
        SELECT id FROM remote_work_requests
        WHERE employee_id = ? AND status = 'approved' AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;
    Ok(remote.is_some())
}
