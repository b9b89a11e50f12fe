//! Database query functions for the `overlays` table.

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{OverlayRow, OverlayStatus};

/// Full contents of an overlay row as written by the domain layer.
#[derive(Debug, Clone)]
pub struct OverlayRecord {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub member_id: Uuid,
    pub base_plan_id: Uuid,
    pub schedule: Value,
    pub macro_overrides: Value,
    pub restrictions: Value,
    pub meal_overrides: Value,
    pub status: OverlayStatus,
    pub weeks_applied: i32,
    pub notes: Option<String>,
}

/// Insert an overlay, or replace the one already attached to the same
/// assignment.
pub async fn upsert_overlay(pool: &PgPool, record: &OverlayRecord) -> Result<OverlayRow> {
    let row = sqlx::query_as::<_, OverlayRow>(
        "INSERT INTO overlays \
             (id, assignment_id, member_id, base_plan_id, schedule, macro_overrides, \
              restrictions, meal_overrides, status, weeks_applied, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (assignment_id) DO UPDATE SET \
             schedule = EXCLUDED.schedule, \
             macro_overrides = EXCLUDED.macro_overrides, \
             restrictions = EXCLUDED.restrictions, \
             meal_overrides = EXCLUDED.meal_overrides, \
             status = EXCLUDED.status, \
             weeks_applied = EXCLUDED.weeks_applied, \
             notes = EXCLUDED.notes, \
             updated_at = now() \
         RETURNING *",
    )
    .bind(record.id)
    .bind(record.assignment_id)
    .bind(record.member_id)
    .bind(record.base_plan_id)
    .bind(&record.schedule)
    .bind(&record.macro_overrides)
    .bind(&record.restrictions)
    .bind(&record.meal_overrides)
    .bind(record.status)
    .bind(record.weeks_applied)
    .bind(&record.notes)
    .fetch_one(pool)
    .await
    .with_context(|| {
        format!(
            "failed to save overlay for assignment {}",
            record.assignment_id
        )
    })?;

    Ok(row)
}

/// Fetch the overlay attached to an assignment, if any.
pub async fn get_overlay_for_assignment(
    pool: &PgPool,
    assignment_id: Uuid,
) -> Result<Option<OverlayRow>> {
    let row = sqlx::query_as::<_, OverlayRow>("SELECT * FROM overlays WHERE assignment_id = $1")
        .bind(assignment_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch overlay")?;

    Ok(row)
}

/// List every overlay, oldest first.
pub async fn list_overlays(pool: &PgPool) -> Result<Vec<OverlayRow>> {
    let rows =
        sqlx::query_as::<_, OverlayRow>("SELECT * FROM overlays ORDER BY created_at ASC, id ASC")
            .fetch_all(pool)
            .await
            .context("failed to list overlays")?;

    Ok(rows)
}

/// Remove the overlay attached to an assignment. Returns `false` when none
/// existed.
pub async fn delete_overlay_for_assignment(pool: &PgPool, assignment_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM overlays WHERE assignment_id = $1")
        .bind(assignment_id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete overlay for assignment {assignment_id}"))?;

    Ok(result.rows_affected() > 0)
}
