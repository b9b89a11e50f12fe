//! sqlx adapter over the `gymdash-db` query functions.
//!
//! JSON columns are decoded into domain types here; a row that no longer
//! decodes is an error naming the row, not a silent default.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gymdash_db::models::{AssignmentRow, FoodRow, MemberRow, OverlayRow, PlanRow};
use gymdash_db::queries::{assignments, food, members, overlays, plans};

use super::{
    AssignmentRepository, FoodRepository, MemberRepository, OverlayRepository, PlanRepository,
};
use crate::PlanKind;
use crate::catalog::{
    Allergen, DietType, FoodCategory, FoodEntry, FoodQuery, PlanDetails, PlanTemplate,
};
use crate::ledger::{Assignment, NotifyChannels};
use crate::members::Member;
use crate::overlay::CustomizationOverlay;
use crate::schedule::WeekdaySet;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Row conversions
// ---------------------------------------------------------------------------

fn plan_from_row(row: PlanRow) -> Result<PlanTemplate> {
    let details: PlanDetails = serde_json::from_value(row.details)
        .with_context(|| format!("plan {} has unreadable details", row.id))?;
    if details.kind() != row.kind {
        anyhow::bail!(
            "plan {} is stored as {} but its details describe a {} plan",
            row.id,
            row.kind,
            details.kind()
        );
    }
    Ok(PlanTemplate {
        id: row.id,
        name: row.name,
        goal: row
            .goal
            .parse()
            .with_context(|| format!("plan {} has an unknown goal", row.id))?,
        trainer: row.trainer,
        details,
        default_active_days: WeekdaySet::from_names(&row.default_active_days)
            .with_context(|| format!("plan {} has an unknown default day", row.id))?,
        archived: row.archived,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn plan_to_new(plan: &PlanTemplate) -> Result<plans::NewPlan> {
    Ok(plans::NewPlan {
        id: plan.id,
        kind: plan.kind(),
        name: plan.name.clone(),
        goal: plan.goal.to_string(),
        trainer: plan.trainer.clone(),
        details: serde_json::to_value(&plan.details).context("failed to encode plan details")?,
        default_active_days: plan.default_active_days.to_names(),
    })
}

fn assignment_from_row(row: AssignmentRow) -> Result<Assignment> {
    Ok(Assignment {
        id: row.id,
        member_id: row.member_id,
        plan_id: row.plan_id,
        plan_kind: row.plan_kind,
        status: row.status,
        start_date: row.start_date,
        end_date: row.end_date,
        active_days: WeekdaySet::from_names(&row.active_days)
            .with_context(|| format!("assignment {} has an unknown active day", row.id))?,
        notify: NotifyChannels {
            email: row.notify_email,
            sms: row.notify_sms,
            whatsapp: row.notify_whatsapp,
            in_app: row.notify_in_app,
        },
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn member_from_row(row: MemberRow) -> Member {
    Member {
        id: row.id,
        name: row.name,
        email: row.email,
        phone: row.phone,
        photo: row.photo,
        status: row.status,
    }
}

fn overlay_from_row(row: OverlayRow) -> Result<CustomizationOverlay> {
    let id = row.assignment_id;
    Ok(CustomizationOverlay {
        id: row.id,
        assignment_id: row.assignment_id,
        member_id: row.member_id,
        base_plan_id: row.base_plan_id,
        schedule: serde_json::from_value(row.schedule)
            .with_context(|| format!("overlay for assignment {id} has an unreadable schedule"))?,
        macros: serde_json::from_value(row.macro_overrides)
            .with_context(|| format!("overlay for assignment {id} has unreadable macros"))?,
        restrictions: serde_json::from_value(row.restrictions).with_context(|| {
            format!("overlay for assignment {id} has unreadable restrictions")
        })?,
        meal_overrides: serde_json::from_value(row.meal_overrides).with_context(|| {
            format!("overlay for assignment {id} has unreadable meal overrides")
        })?,
        status: row.status,
        weeks_applied: u32::try_from(row.weeks_applied).unwrap_or(0),
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn overlay_to_record(o: &CustomizationOverlay) -> Result<overlays::OverlayRecord> {
    Ok(overlays::OverlayRecord {
        id: o.id,
        assignment_id: o.assignment_id,
        member_id: o.member_id,
        base_plan_id: o.base_plan_id,
        schedule: serde_json::to_value(o.schedule).context("failed to encode schedule")?,
        macro_overrides: serde_json::to_value(o.macros).context("failed to encode macros")?,
        restrictions: serde_json::to_value(&o.restrictions)
            .context("failed to encode restrictions")?,
        meal_overrides: serde_json::to_value(&o.meal_overrides)
            .context("failed to encode meal overrides")?,
        status: o.status,
        weeks_applied: i32::try_from(o.weeks_applied).context("weeks applied out of range")?,
        notes: o.notes.clone(),
    })
}

fn food_from_row(row: FoodRow) -> Result<FoodEntry> {
    let id = row.id;
    Ok(FoodEntry {
        id,
        name: row.name,
        category: row
            .category
            .parse::<FoodCategory>()
            .with_context(|| format!("food {id} has an unknown category"))?,
        serving_size: row.serving_size,
        calories: u32::try_from(row.calories)
            .with_context(|| format!("food {id} has negative calories"))?,
        protein: row.protein,
        carbs: row.carbs,
        fat: row.fat,
        fiber: row.fiber,
        diet_types: row
            .diet_types
            .iter()
            .map(|d| d.parse())
            .collect::<Result<BTreeSet<DietType>, _>>()
            .with_context(|| format!("food {id} has an unknown diet type"))?,
        allergens: row
            .allergens
            .iter()
            .map(|a| a.parse())
            .collect::<Result<BTreeSet<Allergen>, _>>()
            .with_context(|| format!("food {id} has an unknown allergen"))?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn food_to_new(f: &FoodEntry) -> Result<food::NewFood> {
    Ok(food::NewFood {
        id: f.id,
        name: f.name.clone(),
        category: f.category.to_string(),
        serving_size: f.serving_size.clone(),
        calories: i32::try_from(f.calories).context("calories out of range")?,
        protein: f.protein,
        carbs: f.carbs,
        fat: f.fat,
        fiber: f.fiber,
        diet_types: f.diet_types.iter().map(|d| d.to_string()).collect(),
        allergens: f.allergens.iter().map(|a| a.to_string()).collect(),
    })
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

#[async_trait]
impl PlanRepository for PgStore {
    async fn insert_plan(&self, plan: &PlanTemplate) -> Result<()> {
        let new = plan_to_new(plan)?;
        plans::insert_plan(&self.pool, &new).await?;
        Ok(())
    }

    async fn get_plan(&self, id: Uuid) -> Result<Option<PlanTemplate>> {
        plans::get_plan(&self.pool, id)
            .await?
            .map(plan_from_row)
            .transpose()
    }

    async fn list_plans(
        &self,
        kind: Option<PlanKind>,
        include_archived: bool,
    ) -> Result<Vec<PlanTemplate>> {
        plans::list_plans(&self.pool, kind, include_archived)
            .await?
            .into_iter()
            .map(plan_from_row)
            .collect()
    }

    async fn update_plan(&self, plan: &PlanTemplate) -> Result<()> {
        let new = plan_to_new(plan)?;
        plans::update_plan(&self.pool, &new).await?;
        Ok(())
    }

    async fn set_plan_archived(&self, id: Uuid, archived: bool) -> Result<()> {
        plans::set_plan_archived(&self.pool, id, archived).await
    }

    async fn delete_plan(&self, id: Uuid) -> Result<bool> {
        plans::delete_plan(&self.pool, id).await
    }
}

#[async_trait]
impl AssignmentRepository for PgStore {
    async fn insert_assignment(&self, a: &Assignment) -> Result<()> {
        let new = assignments::NewAssignment {
            id: a.id,
            member_id: a.member_id,
            plan_id: a.plan_id,
            plan_kind: a.plan_kind,
            start_date: a.start_date,
            end_date: a.end_date,
            active_days: a.active_days.to_names(),
            notify_email: a.notify.email,
            notify_sms: a.notify.sms,
            notify_whatsapp: a.notify.whatsapp,
            notify_in_app: a.notify.in_app,
            notes: a.notes.clone(),
        };
        assignments::insert_assignment(&self.pool, &new).await?;
        Ok(())
    }

    async fn get_assignment(&self, id: Uuid) -> Result<Option<Assignment>> {
        assignments::get_assignment(&self.pool, id)
            .await?
            .map(assignment_from_row)
            .transpose()
    }

    async fn list_assignments(&self, kind: PlanKind) -> Result<Vec<Assignment>> {
        assignments::list_assignments(&self.pool, kind)
            .await?
            .into_iter()
            .map(assignment_from_row)
            .collect()
    }

    async fn list_assignments_for_plan(&self, plan_id: Uuid) -> Result<Vec<Assignment>> {
        assignments::list_assignments_for_plan(&self.pool, plan_id)
            .await?
            .into_iter()
            .map(assignment_from_row)
            .collect()
    }

    async fn update_assignment(&self, a: &Assignment) -> Result<()> {
        let update = assignments::AssignmentUpdate {
            status: a.status,
            start_date: a.start_date,
            end_date: a.end_date,
            active_days: a.active_days.to_names(),
            notify_email: a.notify.email,
            notify_sms: a.notify.sms,
            notify_whatsapp: a.notify.whatsapp,
            notify_in_app: a.notify.in_app,
            notes: a.notes.clone(),
        };
        assignments::update_assignment(&self.pool, a.id, &update).await?;
        Ok(())
    }

    async fn delete_assignment(&self, id: Uuid) -> Result<bool> {
        // The overlay row goes with it through ON DELETE CASCADE.
        assignments::delete_assignment(&self.pool, id).await
    }
}

#[async_trait]
impl MemberRepository for PgStore {
    async fn insert_member(&self, m: &Member) -> Result<()> {
        let new = members::NewMember {
            id: m.id,
            name: m.name.clone(),
            email: m.email.clone(),
            phone: m.phone.clone(),
            photo: m.photo.clone(),
            status: m.status,
        };
        members::insert_member(&self.pool, &new).await?;
        Ok(())
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
        Ok(members::get_member(&self.pool, id)
            .await?
            .map(member_from_row))
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        Ok(members::list_members(&self.pool)
            .await?
            .into_iter()
            .map(member_from_row)
            .collect())
    }
}

#[async_trait]
impl OverlayRepository for PgStore {
    async fn save_overlay(&self, overlay: &CustomizationOverlay) -> Result<()> {
        let record = overlay_to_record(overlay)?;
        overlays::upsert_overlay(&self.pool, &record).await?;
        Ok(())
    }

    async fn get_overlay(&self, assignment_id: Uuid) -> Result<Option<CustomizationOverlay>> {
        overlays::get_overlay_for_assignment(&self.pool, assignment_id)
            .await?
            .map(overlay_from_row)
            .transpose()
    }

    async fn list_overlays(&self) -> Result<Vec<CustomizationOverlay>> {
        overlays::list_overlays(&self.pool)
            .await?
            .into_iter()
            .map(overlay_from_row)
            .collect()
    }

    async fn delete_overlay(&self, assignment_id: Uuid) -> Result<bool> {
        overlays::delete_overlay_for_assignment(&self.pool, assignment_id).await
    }
}

#[async_trait]
impl FoodRepository for PgStore {
    async fn insert_food(&self, f: &FoodEntry) -> Result<()> {
        food::insert_food(&self.pool, &food_to_new(f)?).await?;
        Ok(())
    }

    async fn get_food(&self, id: Uuid) -> Result<Option<FoodEntry>> {
        food::get_food(&self.pool, id)
            .await?
            .map(food_from_row)
            .transpose()
    }

    async fn update_food(&self, f: &FoodEntry) -> Result<()> {
        if food::update_food(&self.pool, &food_to_new(f)?).await?.is_none() {
            anyhow::bail!("food {} not found", f.id);
        }
        Ok(())
    }

    async fn delete_food(&self, id: Uuid) -> Result<bool> {
        food::delete_food(&self.pool, id).await
    }

    async fn search_foods(&self, query: &FoodQuery) -> Result<Vec<FoodEntry>> {
        let category = query.category.map(|c| c.as_str());
        let diet_type = query.diet_type.map(|d| d.as_str());
        let filter = food::FoodFilter {
            name: query.text(),
            category,
            diet_type,
        };
        food::search_foods(&self.pool, filter)
            .await?
            .into_iter()
            .map(food_from_row)
            .collect()
    }
}
