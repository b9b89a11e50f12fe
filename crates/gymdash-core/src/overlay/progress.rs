//! Weekly progression job.
//!
//! For every active overlay with progression enabled, each whole week since
//! the assignment started that has not been folded in yet moves the
//! effective macros by the configured percentage, rounding after each week.
//! The result is stored as absolute overrides and the week counter advanced,
//! so running the job again on the same day changes nothing.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::macros::{compute_effective_macros, step_week};
use super::model::CustomizationOverlay;
use crate::catalog::Macros;
use crate::repository::Store;
use crate::{AssignmentStatus, OverlayStatus};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProgressionRun {
    /// Assignments whose targets moved.
    pub advanced: Vec<Uuid>,
    /// Overlays looked at but left alone.
    pub unchanged: usize,
}

/// Fold `target_weeks` of progression into `overlay`. Returns whether
/// anything changed.
pub fn advance_overlay(overlay: &mut CustomizationOverlay, base: &Macros, target_weeks: u32) -> bool {
    let progression = overlay.macros.progression;
    if !progression.enabled || overlay.weeks_applied >= target_weeks {
        return false;
    }
    let factor = progression.weekly_factor();
    let mut current = compute_effective_macros(base, &overlay.macros);
    for _ in overlay.weeks_applied..target_weeks {
        current = step_week(&current, factor);
    }
    overlay.macros.calories = Some(current.calories);
    overlay.macros.protein = Some(current.protein);
    overlay.macros.carbs = Some(current.carbs);
    overlay.macros.fat = Some(current.fat);
    overlay.weeks_applied = target_weeks;
    true
}

/// Run the job for `today` over every overlay in the store.
pub async fn run_progression(store: &Arc<dyn Store>, today: NaiveDate) -> Result<ProgressionRun> {
    let mut run = ProgressionRun::default();

    for mut overlay in store.list_overlays().await? {
        if overlay.status != OverlayStatus::Active || !overlay.macros.progression.enabled {
            run.unchanged += 1;
            continue;
        }
        let Some(assignment) = store.get_assignment(overlay.assignment_id).await? else {
            run.unchanged += 1;
            continue;
        };
        if assignment.status != AssignmentStatus::Active {
            run.unchanged += 1;
            continue;
        }
        let Some(diet) = store
            .get_plan(overlay.base_plan_id)
            .await?
            .and_then(|p| p.details.as_diet().cloned())
        else {
            debug!(assignment_id = %overlay.assignment_id, "base diet plan missing, skipping");
            run.unchanged += 1;
            continue;
        };

        let weeks = assignment.date_range().weeks_in_effect(today);
        if advance_overlay(&mut overlay, &diet.macros, weeks) {
            overlay.updated_at = Utc::now();
            store
                .save_overlay(&overlay)
                .await
                .with_context(|| {
                    format!(
                        "failed to save progression for assignment {}",
                        overlay.assignment_id
                    )
                })?;
            info!(
                assignment_id = %overlay.assignment_id,
                weeks,
                calories = overlay.macros.calories.unwrap_or_default(),
                "progression applied"
            );
            run.advanced.push(overlay.assignment_id);
        } else {
            run.unchanged += 1;
        }
    }

    Ok(run)
}
