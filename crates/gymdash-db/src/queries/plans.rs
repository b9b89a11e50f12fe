//! Database query functions for the `plans` table.

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{PlanKind, PlanRow};

/// Parameters for inserting or replacing a plan row.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub id: Uuid,
    pub kind: PlanKind,
    pub name: String,
    pub goal: String,
    pub trainer: Option<String>,
    pub details: Value,
    pub default_active_days: Vec<String>,
}

/// Insert a new plan row.
pub async fn insert_plan(pool: &PgPool, new: &NewPlan) -> Result<PlanRow> {
    let plan = sqlx::query_as::<_, PlanRow>(
        "INSERT INTO plans (id, kind, name, goal, trainer, details, default_active_days) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING *",
    )
    .bind(new.id)
    .bind(new.kind)
    .bind(&new.name)
    .bind(&new.goal)
    .bind(&new.trainer)
    .bind(&new.details)
    .bind(&new.default_active_days)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert plan {:?}", new.name))?;

    Ok(plan)
}

/// Fetch a plan by its ID.
pub async fn get_plan(pool: &PgPool, id: Uuid) -> Result<Option<PlanRow>> {
    let plan = sqlx::query_as::<_, PlanRow>("SELECT * FROM plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan")?;

    Ok(plan)
}

/// List plans, optionally restricted to one kind, ordered by name.
pub async fn list_plans(
    pool: &PgPool,
    kind: Option<PlanKind>,
    include_archived: bool,
) -> Result<Vec<PlanRow>> {
    let plans = sqlx::query_as::<_, PlanRow>(
        "SELECT * FROM plans \
         WHERE ($1::text IS NULL OR kind = $1) \
           AND ($2 OR NOT archived) \
         ORDER BY name ASC, created_at ASC",
    )
    .bind(kind)
    .bind(include_archived)
    .fetch_all(pool)
    .await
    .context("failed to list plans")?;

    Ok(plans)
}

/// Replace every editable column of an existing plan.
pub async fn update_plan(pool: &PgPool, plan: &NewPlan) -> Result<PlanRow> {
    let row = sqlx::query_as::<_, PlanRow>(
        "UPDATE plans \
         SET name = $2, goal = $3, trainer = $4, details = $5, \
             default_active_days = $6, updated_at = now() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(plan.id)
    .bind(&plan.name)
    .bind(&plan.goal)
    .bind(&plan.trainer)
    .bind(&plan.details)
    .bind(&plan.default_active_days)
    .fetch_optional(pool)
    .await
    .context("failed to update plan")?;

    match row {
        Some(row) => Ok(row),
        None => anyhow::bail!("plan {} not found", plan.id),
    }
}

/// Set or clear the archived flag on a plan.
pub async fn set_plan_archived(pool: &PgPool, id: Uuid, archived: bool) -> Result<()> {
    let result = sqlx::query("UPDATE plans SET archived = $1, updated_at = now() WHERE id = $2")
        .bind(archived)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update plan archived flag")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("plan {id} not found");
    }

    Ok(())
}

/// Delete a plan. Returns `false` when no row matched.
///
/// Assignments that reference the plan are left in place.
pub async fn delete_plan(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete plan {id}"))?;

    Ok(result.rows_affected() > 0)
}
