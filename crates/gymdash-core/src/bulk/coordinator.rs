//! Fan-out of one action over many selected plans.
//!
//! Each plan is handled independently: one failure is recorded and the rest
//! carry on. Items not yet started when the cancellation token fires are
//! reported as cancelled.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::export::{CsvExport, plans_to_csv};
use super::report::{BulkReport, ItemOutcome};
use crate::PlanKind;
use crate::catalog::{PlanCatalog, PlanWithMembers};
use crate::error::{BulkItemError, ValidationError};
use crate::ledger::service::DEFAULT_CONCURRENCY;
use crate::ledger::{AssignmentLedger, NewAssignmentBatch, NotifyChannels};
use crate::repository::Store;
use crate::schedule::WeekdaySet;

/// Assignment settings shared by every selected plan.
#[derive(Debug, Clone)]
pub struct AssignRequest {
    pub member_ids: Vec<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub active_days: WeekdaySet,
    pub notify: NotifyChannels,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct BulkCoordinator {
    store: Arc<dyn Store>,
    catalog: PlanCatalog,
    ledger: AssignmentLedger,
    concurrency: usize,
}

fn item_error(err: &anyhow::Error) -> BulkItemError {
    match err.downcast_ref::<ValidationError>() {
        Some(v) => BulkItemError::Rejected(v.clone()),
        None => BulkItemError::backend(err),
    }
}

impl BulkCoordinator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            catalog: PlanCatalog::new(Arc::clone(&store)),
            ledger: AssignmentLedger::new(Arc::clone(&store)),
            store,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self.ledger = self.ledger.with_concurrency(self.concurrency);
        self
    }

    async fn for_each_plan<F, Fut>(
        &self,
        plan_ids: &[Uuid],
        cancel: &CancellationToken,
        op: F,
    ) -> BulkReport
    where
        F: Fn(Uuid) -> Fut,
        Fut: Future<Output = Result<Uuid>>,
    {
        let outcomes = stream::iter(plan_ids.iter().copied())
            .map(|plan_id| {
                let op = &op;
                async move {
                    let result = if cancel.is_cancelled() {
                        Err(BulkItemError::Cancelled)
                    } else {
                        op(plan_id).await.map_err(|e| {
                            warn!(plan_id = %plan_id, error = %e, "bulk item failed");
                            item_error(&e)
                        })
                    };
                    ItemOutcome {
                        subject: plan_id,
                        result,
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;
        BulkReport {
            outcomes,
            warnings: Vec::new(),
        }
    }

    /// Assign every selected plan to the same members. Outcomes are per
    /// member per plan, keyed by member id. Repeated member ids count once.
    pub async fn assign(
        &self,
        plan_ids: &[Uuid],
        request: &AssignRequest,
        cancel: &CancellationToken,
    ) -> Result<BulkReport> {
        let mut seen = HashSet::new();
        let member_ids: Vec<Uuid> = request
            .member_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if member_ids.is_empty() {
            return Err(ValidationError::NoMembers.into());
        }
        if request.active_days.is_empty() {
            return Err(ValidationError::NoActiveDays.into());
        }

        let mut report = BulkReport::default();
        for &plan_id in plan_ids {
            if cancel.is_cancelled() {
                report.outcomes.extend(member_ids.iter().map(|&m| ItemOutcome {
                    subject: m,
                    result: Err(BulkItemError::Cancelled),
                }));
                continue;
            }
            let batch = NewAssignmentBatch {
                member_ids: member_ids.clone(),
                plan_id,
                start_date: request.start_date,
                end_date: request.end_date,
                active_days: request.active_days,
                notify: request.notify,
                notes: request.notes.clone(),
            };
            match self.ledger.create_batch(batch, cancel).await {
                Ok(part) => report.merge(part),
                Err(e) => {
                    warn!(plan_id = %plan_id, error = %e, "plan skipped in bulk assign");
                    let err = item_error(&e);
                    report.outcomes.extend(member_ids.iter().map(|&m| ItemOutcome {
                        subject: m,
                        result: Err(err.clone()),
                    }));
                }
            }
        }
        info!(plans = plan_ids.len(), summary = %report.summary(), "bulk assign finished");
        Ok(report)
    }

    /// Copy each plan under a new id as `<name> (Copy)`.
    pub async fn duplicate(&self, plan_ids: &[Uuid], cancel: &CancellationToken) -> BulkReport {
        let report = self
            .for_each_plan(plan_ids, cancel, |id| async move {
                let original = self.catalog.get(id).await?;
                let copy = original.duplicate(Utc::now());
                self.store.insert_plan(&copy).await?;
                info!(from = %id, to = %copy.id, "plan duplicated");
                anyhow::Ok(copy.id)
            })
            .await;
        info!(summary = %report.summary(), "bulk duplicate finished");
        report
    }

    /// Set or clear the archived flag on each plan.
    pub async fn archive(
        &self,
        plan_ids: &[Uuid],
        archived: bool,
        cancel: &CancellationToken,
    ) -> BulkReport {
        let report = self
            .for_each_plan(plan_ids, cancel, |id| async move {
                self.catalog.set_archived(id, archived).await?;
                anyhow::Ok(id)
            })
            .await;
        info!(archived, summary = %report.summary(), "bulk archive finished");
        report
    }

    /// Hard delete each plan. Existing assignments keep their rows.
    pub async fn delete(&self, plan_ids: &[Uuid], cancel: &CancellationToken) -> BulkReport {
        let report = self
            .for_each_plan(plan_ids, cancel, |id| async move {
                self.catalog.delete(id).await?;
                anyhow::Ok(id)
            })
            .await;
        info!(summary = %report.summary(), "bulk delete finished");
        report
    }

    /// CSV of the selected plans of `kind`, in selection order. Unknown ids
    /// and plans of the other kind are left out.
    pub async fn export(&self, kind: PlanKind, plan_ids: &[Uuid], today: NaiveDate) -> Result<CsvExport> {
        let mut rows: Vec<PlanWithMembers> = Vec::with_capacity(plan_ids.len());
        for &id in plan_ids {
            let Some(plan) = self.store.get_plan(id).await? else {
                warn!(plan_id = %id, "export skipped unknown plan");
                continue;
            };
            let member_ids = self.catalog.member_ids(id).await?;
            rows.push(PlanWithMembers { plan, member_ids });
        }
        let export = plans_to_csv(kind, &rows, today)?;
        info!(kind = %kind, rows = export.rows, file = %export.file_name, "plans exported");
        Ok(export)
    }
}
