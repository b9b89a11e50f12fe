//! Database query functions for the `assignments` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AssignmentRow, AssignmentStatus, PlanKind};

/// Parameters for inserting an assignment. Status always starts `active`.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub plan_id: Uuid,
    pub plan_kind: PlanKind,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub active_days: Vec<String>,
    pub notify_email: bool,
    pub notify_sms: bool,
    pub notify_whatsapp: bool,
    pub notify_in_app: bool,
    pub notes: Option<String>,
}

/// Mutable columns of an assignment. Member and plan are fixed at creation.
#[derive(Debug, Clone)]
pub struct AssignmentUpdate {
    pub status: AssignmentStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub active_days: Vec<String>,
    pub notify_email: bool,
    pub notify_sms: bool,
    pub notify_whatsapp: bool,
    pub notify_in_app: bool,
    pub notes: Option<String>,
}

/// Insert a new assignment row.
pub async fn insert_assignment(pool: &PgPool, new: &NewAssignment) -> Result<AssignmentRow> {
    let row = sqlx::query_as::<_, AssignmentRow>(
        "INSERT INTO assignments \
             (id, member_id, plan_id, plan_kind, status, start_date, end_date, active_days, \
              notify_email, notify_sms, notify_whatsapp, notify_in_app, notes) \
         VALUES ($1, $2, $3, $4, 'active', $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING *",
    )
    .bind(new.id)
    .bind(new.member_id)
    .bind(new.plan_id)
    .bind(new.plan_kind)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(&new.active_days)
    .bind(new.notify_email)
    .bind(new.notify_sms)
    .bind(new.notify_whatsapp)
    .bind(new.notify_in_app)
    .bind(&new.notes)
    .fetch_one(pool)
    .await
    .with_context(|| {
        format!(
            "failed to insert assignment of plan {} to member {}",
            new.plan_id, new.member_id
        )
    })?;

    Ok(row)
}

/// Fetch an assignment by ID.
pub async fn get_assignment(pool: &PgPool, id: Uuid) -> Result<Option<AssignmentRow>> {
    let row = sqlx::query_as::<_, AssignmentRow>("SELECT * FROM assignments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch assignment")?;

    Ok(row)
}

/// List all assignments of one plan kind, newest first.
pub async fn list_assignments(pool: &PgPool, kind: PlanKind) -> Result<Vec<AssignmentRow>> {
    let rows = sqlx::query_as::<_, AssignmentRow>(
        "SELECT * FROM assignments WHERE plan_kind = $1 ORDER BY created_at DESC, id ASC",
    )
    .bind(kind)
    .fetch_all(pool)
    .await
    .context("failed to list assignments")?;

    Ok(rows)
}

/// List assignments referencing a plan, oldest first.
pub async fn list_assignments_for_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<AssignmentRow>> {
    let rows = sqlx::query_as::<_, AssignmentRow>(
        "SELECT * FROM assignments WHERE plan_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to list assignments for plan {plan_id}"))?;

    Ok(rows)
}

/// Overwrite the mutable columns of an assignment.
pub async fn update_assignment(
    pool: &PgPool,
    id: Uuid,
    update: &AssignmentUpdate,
) -> Result<AssignmentRow> {
    let row = sqlx::query_as::<_, AssignmentRow>(
        "UPDATE assignments \
         SET status = $2, start_date = $3, end_date = $4, active_days = $5, \
             notify_email = $6, notify_sms = $7, notify_whatsapp = $8, notify_in_app = $9, \
             notes = $10, updated_at = now() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(update.status)
    .bind(update.start_date)
    .bind(update.end_date)
    .bind(&update.active_days)
    .bind(update.notify_email)
    .bind(update.notify_sms)
    .bind(update.notify_whatsapp)
    .bind(update.notify_in_app)
    .bind(&update.notes)
    .fetch_optional(pool)
    .await
    .context("failed to update assignment")?;

    match row {
        Some(row) => Ok(row),
        None => anyhow::bail!("assignment {id} not found"),
    }
}

/// Delete an assignment. The overlay row, if any, goes with it.
///
/// Returns `false` when no row matched.
pub async fn delete_assignment(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete assignment {id}"))?;

    Ok(result.rows_affected() > 0)
}

/// Count assignments of one plan kind grouped by status.
pub async fn count_assignments_by_status(
    pool: &PgPool,
    kind: PlanKind,
) -> Result<Vec<(AssignmentStatus, i64)>> {
    let rows: Vec<(AssignmentStatus, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*)::bigint FROM assignments \
         WHERE plan_kind = $1 \
         GROUP BY status \
         ORDER BY status",
    )
    .bind(kind)
    .fetch_all(pool)
    .await
    .context("failed to count assignments by status")?;

    Ok(rows)
}
