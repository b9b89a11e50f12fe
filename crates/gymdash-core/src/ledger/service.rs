//! Assignment ledger service.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::{
    Assignment, AssignmentFilter, AssignmentPatch, AssignmentStats, AssignmentView,
    NewAssignmentBatch, UNKNOWN,
};
use crate::bulk::report::{BulkReport, ItemOutcome};
use crate::error::{BulkItemError, ValidationError};
use crate::repository::Store;
use crate::{AssignmentStatus, PlanKind};

/// Writes running at once during a batch when nothing else is configured.
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Clone)]
pub struct AssignmentLedger {
    store: Arc<dyn Store>,
    concurrency: usize,
}

impl AssignmentLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Assign one plan to every member in the batch.
    ///
    /// Rule violations abort before anything is written. After that each
    /// member's row succeeds or fails on its own (an unknown member fails
    /// only its row), and rows not yet started when `cancel` fires are
    /// reported as cancelled.
    pub async fn create_batch(
        &self,
        batch: NewAssignmentBatch,
        cancel: &CancellationToken,
    ) -> Result<BulkReport> {
        let mut seen = HashSet::new();
        let member_ids: Vec<Uuid> = batch
            .member_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if member_ids.is_empty() {
            return Err(ValidationError::NoMembers.into());
        }
        if batch.active_days.is_empty() {
            return Err(ValidationError::NoActiveDays.into());
        }
        let plan = self
            .store
            .get_plan(batch.plan_id)
            .await?
            .ok_or(ValidationError::PlanNotFound(batch.plan_id))?;

        let mut warnings = Vec::new();
        if let Some(end) = batch.end_date.filter(|end| *end < batch.start_date) {
            warnings.push(format!(
                "end date {end} is before start date {}",
                batch.start_date
            ));
        }
        let holders: HashSet<Uuid> = self
            .store
            .list_assignments_for_plan(plan.id)
            .await?
            .into_iter()
            .map(|a| a.member_id)
            .collect();
        for id in member_ids.iter().filter(|id| holders.contains(id)) {
            warnings.push(format!("member {id} is already assigned to {:?}", plan.name));
        }
        for w in &warnings {
            warn!(plan_id = %plan.id, "{w}");
        }

        let now = Utc::now();
        let plan_kind = plan.kind();
        let outcomes: Vec<ItemOutcome> = stream::iter(member_ids)
            .map(|member_id| {
                let batch = &batch;
                async move {
                    if cancel.is_cancelled() {
                        return ItemOutcome {
                            subject: member_id,
                            result: Err(BulkItemError::Cancelled),
                        };
                    }
                    let result = match self.store.get_member(member_id).await {
                        Ok(Some(_)) => self.write_row(member_id, batch, plan_kind, now).await,
                        Ok(None) => {
                            warn!(member_id = %member_id, "skipping unknown member");
                            Err(ValidationError::MemberNotFound(member_id).into())
                        }
                        Err(e) => Err(BulkItemError::backend(&e)),
                    };
                    ItemOutcome {
                        subject: member_id,
                        result,
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = BulkReport { outcomes, warnings };
        info!(plan_id = %plan.id, summary = %report.summary(), "assignment batch finished");
        Ok(report)
    }

    async fn write_row(
        &self,
        member_id: Uuid,
        batch: &NewAssignmentBatch,
        plan_kind: PlanKind,
        now: DateTime<Utc>,
    ) -> Result<Uuid, BulkItemError> {
        let assignment = Assignment {
            id: Uuid::new_v4(),
            member_id,
            plan_id: batch.plan_id,
            plan_kind,
            status: AssignmentStatus::Active,
            start_date: batch.start_date,
            end_date: batch.end_date,
            active_days: batch.active_days,
            notify: batch.notify,
            notes: batch.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        match self.store.insert_assignment(&assignment).await {
            Ok(()) => {
                debug!(assignment_id = %assignment.id, member_id = %member_id, "assignment written");
                Ok(assignment.id)
            }
            Err(e) => {
                warn!(member_id = %member_id, error = %e, "assignment write failed");
                Err(BulkItemError::backend(&e))
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Assignment> {
        self.store
            .get_assignment(id)
            .await?
            .ok_or_else(|| ValidationError::AssignmentNotFound(id).into())
    }

    /// Apply a partial update. Any status may follow any other.
    pub async fn update(&self, id: Uuid, patch: AssignmentPatch) -> Result<Assignment> {
        if patch.active_days.is_some_and(|d| d.is_empty()) {
            return Err(ValidationError::NoActiveDays.into());
        }
        let mut assignment = self.get(id).await?;
        patch.apply_to(&mut assignment);
        assignment.updated_at = Utc::now();
        self.store.update_assignment(&assignment).await?;
        info!(assignment_id = %id, status = %assignment.status, "assignment updated");
        Ok(assignment)
    }

    /// Hard delete. The assignment's overlay goes with it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_assignment(id).await? {
            return Err(ValidationError::AssignmentNotFound(id).into());
        }
        info!(assignment_id = %id, "assignment deleted");
        Ok(())
    }

    /// Assignments of one kind joined with member and plan names, newest
    /// first.
    pub async fn list(&self, kind: PlanKind, filter: &AssignmentFilter) -> Result<Vec<AssignmentView>> {
        let assignments = self.store.list_assignments(kind).await?;
        let members: HashMap<Uuid, (String, String)> = self
            .store
            .list_members()
            .await?
            .into_iter()
            .map(|m| (m.id, (m.name, m.email)))
            .collect();
        let plans: HashMap<Uuid, String> = self
            .store
            .list_plans(Some(kind), true)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        Ok(assignments
            .into_iter()
            .map(|a| {
                let (member_name, member_email) = members
                    .get(&a.member_id)
                    .cloned()
                    .unwrap_or_else(|| (UNKNOWN.to_owned(), String::new()));
                let plan_name = plans
                    .get(&a.plan_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN.to_owned());
                AssignmentView {
                    assignment: a,
                    member_name,
                    member_email,
                    plan_name,
                }
            })
            .filter(|v| filter.matches(v))
            .collect())
    }

    pub async fn stats(&self, kind: PlanKind) -> Result<AssignmentStats> {
        let mut stats = AssignmentStats::default();
        for a in self.store.list_assignments(kind).await? {
            stats.total += 1;
            match a.status {
                AssignmentStatus::Active => stats.active += 1,
                AssignmentStatus::Completed => stats.completed += 1,
                AssignmentStatus::Cancelled => stats.cancelled += 1,
            }
        }
        Ok(stats)
    }
}
