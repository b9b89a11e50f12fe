//! Plan catalog service.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::model::{PlanTemplate, PlanWithMembers};
use super::parser::{PlanDraft, parse_plan_toml};
use crate::PlanKind;
use crate::error::ValidationError;
use crate::repository::Store;

#[derive(Clone)]
pub struct PlanCatalog {
    store: Arc<dyn Store>,
}

impl PlanCatalog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Parse a plan file and store the result.
    pub async fn create_from_toml(&self, content: &str) -> Result<PlanTemplate> {
        let draft = parse_plan_toml(content)?;
        self.create(draft).await
    }

    pub async fn create(&self, draft: PlanDraft) -> Result<PlanTemplate> {
        let plan = draft.into_template(Utc::now());
        self.store.insert_plan(&plan).await?;
        info!(plan_id = %plan.id, kind = %plan.kind(), name = %plan.name, "plan created");
        Ok(plan)
    }

    /// Fetch a plan, failing with [`ValidationError::PlanNotFound`].
    pub async fn get(&self, id: Uuid) -> Result<PlanTemplate> {
        self.store
            .get_plan(id)
            .await?
            .ok_or_else(|| ValidationError::PlanNotFound(id).into())
    }

    /// Distinct members holding any assignment for the plan, in assignment
    /// order.
    pub async fn member_ids(&self, plan_id: Uuid) -> Result<Vec<Uuid>> {
        let mut seen = BTreeSet::new();
        Ok(self
            .store
            .list_assignments_for_plan(plan_id)
            .await?
            .into_iter()
            .filter(|a| seen.insert(a.member_id))
            .map(|a| a.member_id)
            .collect())
    }

    pub async fn get_with_members(&self, id: Uuid) -> Result<PlanWithMembers> {
        let plan = self.get(id).await?;
        let member_ids = self.member_ids(id).await?;
        Ok(PlanWithMembers { plan, member_ids })
    }

    /// Plans of one kind with their derived member lists.
    pub async fn list(&self, kind: PlanKind, include_archived: bool) -> Result<Vec<PlanWithMembers>> {
        let plans = self.store.list_plans(Some(kind), include_archived).await?;

        let mut by_plan: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        // Oldest first so member order matches assignment order.
        for a in self.store.list_assignments(kind).await?.into_iter().rev() {
            let members = by_plan.entry(a.plan_id).or_default();
            if !members.contains(&a.member_id) {
                members.push(a.member_id);
            }
        }

        Ok(plans
            .into_iter()
            .map(|plan| {
                let member_ids = by_plan.remove(&plan.id).unwrap_or_default();
                PlanWithMembers { plan, member_ids }
            })
            .collect())
    }

    pub async fn set_archived(&self, id: Uuid, archived: bool) -> Result<()> {
        self.get(id).await?;
        self.store.set_plan_archived(id, archived).await?;
        info!(plan_id = %id, archived, "plan archive flag changed");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_plan(id).await? {
            return Err(ValidationError::PlanNotFound(id).into());
        }
        info!(plan_id = %id, "plan deleted");
        Ok(())
    }
}
