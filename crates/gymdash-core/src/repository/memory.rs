//! In-process store over `HashMap`s behind a tokio `RwLock`.

use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AssignmentRepository, FoodRepository, MemberRepository, OverlayRepository, PlanRepository,
};
use crate::PlanKind;
use crate::catalog::{FoodEntry, FoodQuery, PlanTemplate};
use crate::ledger::Assignment;
use crate::members::Member;
use crate::overlay::CustomizationOverlay;

#[derive(Default)]
struct Tables {
    plans: HashMap<Uuid, PlanTemplate>,
    /// Insertion order; listing walks it backwards for newest first.
    assignments: Vec<Assignment>,
    members: HashMap<Uuid, Member>,
    overlays: HashMap<Uuid, CustomizationOverlay>,
    foods: HashMap<Uuid, FoodEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanRepository for MemoryStore {
    async fn insert_plan(&self, plan: &PlanTemplate) -> Result<()> {
        let mut t = self.tables.write().await;
        if t.plans.contains_key(&plan.id) {
            bail!("plan {} already exists", plan.id);
        }
        t.plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn get_plan(&self, id: Uuid) -> Result<Option<PlanTemplate>> {
        Ok(self.tables.read().await.plans.get(&id).cloned())
    }

    async fn list_plans(
        &self,
        kind: Option<PlanKind>,
        include_archived: bool,
    ) -> Result<Vec<PlanTemplate>> {
        let t = self.tables.read().await;
        let mut plans: Vec<PlanTemplate> = t
            .plans
            .values()
            .filter(|p| kind.is_none_or(|k| p.kind() == k))
            .filter(|p| include_archived || !p.archived)
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(plans)
    }

    async fn update_plan(&self, plan: &PlanTemplate) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.plans.get_mut(&plan.id) {
            Some(slot) => {
                *slot = plan.clone();
                Ok(())
            }
            None => bail!("plan {} not found", plan.id),
        }
    }

    async fn set_plan_archived(&self, id: Uuid, archived: bool) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.plans.get_mut(&id) {
            Some(plan) => {
                plan.archived = archived;
                plan.updated_at = chrono::Utc::now();
                Ok(())
            }
            None => bail!("plan {id} not found"),
        }
    }

    async fn delete_plan(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.plans.remove(&id).is_some())
    }
}

#[async_trait]
impl AssignmentRepository for MemoryStore {
    async fn insert_assignment(&self, assignment: &Assignment) -> Result<()> {
        let mut t = self.tables.write().await;
        if t.assignments.iter().any(|a| a.id == assignment.id) {
            bail!("assignment {} already exists", assignment.id);
        }
        t.assignments.push(assignment.clone());
        Ok(())
    }

    async fn get_assignment(&self, id: Uuid) -> Result<Option<Assignment>> {
        let t = self.tables.read().await;
        Ok(t.assignments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_assignments(&self, kind: PlanKind) -> Result<Vec<Assignment>> {
        let t = self.tables.read().await;
        Ok(t.assignments
            .iter()
            .rev()
            .filter(|a| a.plan_kind == kind)
            .cloned()
            .collect())
    }

    async fn list_assignments_for_plan(&self, plan_id: Uuid) -> Result<Vec<Assignment>> {
        let t = self.tables.read().await;
        Ok(t.assignments
            .iter()
            .filter(|a| a.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn update_assignment(&self, assignment: &Assignment) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.assignments.iter_mut().find(|a| a.id == assignment.id) {
            Some(slot) => {
                *slot = assignment.clone();
                Ok(())
            }
            None => bail!("assignment {} not found", assignment.id),
        }
    }

    async fn delete_assignment(&self, id: Uuid) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.assignments.len();
        t.assignments.retain(|a| a.id != id);
        let removed = t.assignments.len() != before;
        if removed {
            t.overlays.remove(&id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        let mut t = self.tables.write().await;
        if t.members.contains_key(&member.id) {
            bail!("member {} already exists", member.id);
        }
        t.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
        Ok(self.tables.read().await.members.get(&id).cloned())
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        let t = self.tables.read().await;
        let mut members: Vec<Member> = t.members.values().cloned().collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }
}

#[async_trait]
impl OverlayRepository for MemoryStore {
    async fn save_overlay(&self, overlay: &CustomizationOverlay) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.assignments.iter().any(|a| a.id == overlay.assignment_id) {
            bail!("assignment {} not found", overlay.assignment_id);
        }
        t.overlays.insert(overlay.assignment_id, overlay.clone());
        Ok(())
    }

    async fn get_overlay(&self, assignment_id: Uuid) -> Result<Option<CustomizationOverlay>> {
        Ok(self.tables.read().await.overlays.get(&assignment_id).cloned())
    }

    async fn list_overlays(&self) -> Result<Vec<CustomizationOverlay>> {
        let t = self.tables.read().await;
        let mut overlays: Vec<CustomizationOverlay> = t.overlays.values().cloned().collect();
        overlays.sort_by_key(|o| o.created_at);
        Ok(overlays)
    }

    async fn delete_overlay(&self, assignment_id: Uuid) -> Result<bool> {
        Ok(self
            .tables
            .write()
            .await
            .overlays
            .remove(&assignment_id)
            .is_some())
    }
}

#[async_trait]
impl FoodRepository for MemoryStore {
    async fn insert_food(&self, food: &FoodEntry) -> Result<()> {
        let mut t = self.tables.write().await;
        if t.foods.contains_key(&food.id) {
            bail!("food {} already exists", food.id);
        }
        t.foods.insert(food.id, food.clone());
        Ok(())
    }

    async fn get_food(&self, id: Uuid) -> Result<Option<FoodEntry>> {
        Ok(self.tables.read().await.foods.get(&id).cloned())
    }

    async fn update_food(&self, food: &FoodEntry) -> Result<()> {
        let mut t = self.tables.write().await;
        match t.foods.get_mut(&food.id) {
            Some(slot) => {
                *slot = food.clone();
                Ok(())
            }
            None => bail!("food {} not found", food.id),
        }
    }

    async fn delete_food(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.foods.remove(&id).is_some())
    }

    async fn search_foods(&self, query: &FoodQuery) -> Result<Vec<FoodEntry>> {
        let t = self.tables.read().await;
        let mut foods: Vec<FoodEntry> = t
            .foods
            .values()
            .filter(|f| query.matches(f))
            .cloned()
            .collect();
        foods.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(foods)
    }
}
