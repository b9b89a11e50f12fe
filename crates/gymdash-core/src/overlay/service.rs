//! Overlay service: load-or-create, edit, reset and read-only views.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use super::conflicts::{Conflict, check_conflicts};
use super::macros::{EffectiveMacros, compute_effective_macros};
use super::meals::resolve_day_meals;
use super::model::{CustomizationOverlay, MacroOverrides, MealOverride, Restrictions};
use super::progress::{ProgressionRun, run_progression};
use crate::catalog::{DietDetails, Meal, PlanTemplate};
use crate::error::ValidationError;
use crate::ledger::Assignment;
use crate::repository::Store;
use crate::schedule::{CyclePattern, DayKind, Weekday};
use crate::{OverlayStatus, PlanKind};

#[derive(Clone)]
pub struct OverlayService {
    store: Arc<dyn Store>,
}

impl OverlayService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Load the diet plan behind an assignment.
    async fn base_diet(&self, assignment_id: Uuid) -> Result<(Assignment, PlanTemplate, DietDetails)> {
        let assignment = self
            .store
            .get_assignment(assignment_id)
            .await?
            .ok_or(ValidationError::AssignmentNotFound(assignment_id))?;
        if assignment.plan_kind != PlanKind::Diet {
            return Err(ValidationError::NotDietAssignment(assignment_id).into());
        }
        let plan = self
            .store
            .get_plan(assignment.plan_id)
            .await?
            .ok_or(ValidationError::PlanNotFound(assignment.plan_id))?;
        let diet = plan
            .details
            .as_diet()
            .cloned()
            .ok_or(ValidationError::WrongPlanKind {
                id: plan.id,
                expected: PlanKind::Diet,
                actual: plan.kind(),
            })?;
        Ok((assignment, plan, diet))
    }

    /// The assignment's overlay, created with plan defaults on first use.
    pub async fn open(&self, assignment_id: Uuid) -> Result<CustomizationOverlay> {
        if let Some(existing) = self.store.get_overlay(assignment_id).await? {
            return Ok(existing);
        }
        let (assignment, plan, _) = self.base_diet(assignment_id).await?;
        let overlay = CustomizationOverlay::for_assignment(&assignment, &plan, Utc::now());
        self.store.save_overlay(&overlay).await?;
        info!(assignment_id = %assignment_id, "overlay created");
        Ok(overlay)
    }

    /// The saved overlay, or plan defaults when none exists yet. Never
    /// writes.
    pub async fn view(&self, assignment_id: Uuid) -> Result<CustomizationOverlay> {
        Ok(self.current(assignment_id).await?.0)
    }

    async fn current(&self, assignment_id: Uuid) -> Result<(CustomizationOverlay, DietDetails)> {
        let (assignment, plan, diet) = self.base_diet(assignment_id).await?;
        let overlay = match self.store.get_overlay(assignment_id).await? {
            Some(saved) => saved,
            None => CustomizationOverlay::for_assignment(&assignment, &plan, Utc::now()),
        };
        Ok((overlay, diet))
    }

    async fn edit<F>(&self, assignment_id: Uuid, f: F) -> Result<CustomizationOverlay>
    where
        F: FnOnce(&mut CustomizationOverlay),
    {
        let mut overlay = self.open(assignment_id).await?;
        f(&mut overlay);
        overlay.updated_at = Utc::now();
        self.store.save_overlay(&overlay).await?;
        Ok(overlay)
    }

    pub async fn set_day_kind(
        &self,
        assignment_id: Uuid,
        day: Weekday,
        kind: DayKind,
    ) -> Result<CustomizationOverlay> {
        let overlay = self
            .edit(assignment_id, |o| o.schedule.days.set(day, kind))
            .await?;
        info!(assignment_id = %assignment_id, %day, %kind, "day kind set");
        Ok(overlay)
    }

    pub async fn set_cycle(
        &self,
        assignment_id: Uuid,
        cycle: CyclePattern,
    ) -> Result<CustomizationOverlay> {
        self.edit(assignment_id, |o| o.schedule.cycle = cycle).await
    }

    /// Replace the macro overrides. Progression restarts from week zero
    /// when its settings change.
    pub async fn set_macros(
        &self,
        assignment_id: Uuid,
        macros: MacroOverrides,
    ) -> Result<CustomizationOverlay> {
        let overlay = self
            .edit(assignment_id, |o| {
                if o.macros.progression != macros.progression {
                    o.weeks_applied = 0;
                }
                o.macros = macros;
            })
            .await?;
        info!(
            assignment_id = %assignment_id,
            scale = macros.scale.get(),
            progression = macros.progression.enabled,
            "macro overrides set"
        );
        Ok(overlay)
    }

    pub async fn set_restrictions(
        &self,
        assignment_id: Uuid,
        restrictions: Restrictions,
    ) -> Result<CustomizationOverlay> {
        self.edit(assignment_id, |o| o.restrictions = restrictions)
            .await
    }

    pub async fn set_meal_override(
        &self,
        assignment_id: Uuid,
        meal_override: MealOverride,
    ) -> Result<CustomizationOverlay> {
        self.edit(assignment_id, |o| o.upsert_meal_override(meal_override))
            .await
    }

    pub async fn set_status(
        &self,
        assignment_id: Uuid,
        status: OverlayStatus,
    ) -> Result<CustomizationOverlay> {
        self.edit(assignment_id, |o| o.status = status).await
    }

    pub async fn set_notes(
        &self,
        assignment_id: Uuid,
        notes: Option<String>,
    ) -> Result<CustomizationOverlay> {
        self.edit(assignment_id, |o| o.notes = notes).await
    }

    /// Back to plan defaults: every day active, scale 100, no overrides,
    /// diet type from the plan.
    pub async fn reset(&self, assignment_id: Uuid) -> Result<CustomizationOverlay> {
        let (_, plan, _) = self.base_diet(assignment_id).await?;
        let overlay = self
            .edit(assignment_id, |o| o.reset(&plan, Utc::now()))
            .await?;
        info!(assignment_id = %assignment_id, "overlay reset");
        Ok(overlay)
    }

    pub async fn effective_macros(&self, assignment_id: Uuid) -> Result<EffectiveMacros> {
        let (overlay, diet) = self.current(assignment_id).await?;
        Ok(EffectiveMacros {
            base: diet.macros,
            effective: compute_effective_macros(&diet.macros, &overlay.macros),
        })
    }

    pub async fn conflicts(&self, assignment_id: Uuid) -> Result<Vec<Conflict>> {
        let (overlay, diet) = self.current(assignment_id).await?;
        Ok(check_conflicts(&diet, &overlay.restrictions))
    }

    pub async fn day_meals(&self, assignment_id: Uuid, day: Weekday) -> Result<Vec<Meal>> {
        let (overlay, diet) = self.current(assignment_id).await?;
        Ok(resolve_day_meals(&diet, &overlay, day))
    }

    pub async fn run_progression(&self, today: NaiveDate) -> Result<ProgressionRun> {
        run_progression(&self.store, today).await
    }
}
