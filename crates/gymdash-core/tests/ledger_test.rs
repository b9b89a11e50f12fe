//! Assignment ledger behaviour against the in-memory store.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use gymdash_core::catalog::{FoodEntry, FoodQuery, PlanTemplate};
use gymdash_core::error::{BulkItemError, ValidationError};
use gymdash_core::ledger::{
    Assignment, AssignmentFilter, AssignmentLedger, AssignmentPatch, NewAssignmentBatch,
    NotifyChannels,
};
use gymdash_core::members::Member;
use gymdash_core::overlay::{CustomizationOverlay, OverlayService};
use gymdash_core::repository::{
    AssignmentRepository, FoodRepository, MemberRepository, MemoryStore, OverlayRepository,
    PlanRepository, Store,
};
use gymdash_core::schedule::{DayPreset, Weekday};
use gymdash_core::{AssignmentStatus, PlanKind};

use common::*;

fn batch(plan_id: Uuid, member_ids: Vec<Uuid>) -> NewAssignmentBatch {
    NewAssignmentBatch {
        member_ids,
        plan_id,
        start_date: date(2024, 1, 1),
        end_date: None,
        active_days: DayPreset::MonWedFri.days(),
        notify: NotifyChannels {
            email: true,
            ..Default::default()
        },
        notes: None,
    }
}

#[tokio::test]
async fn bulk_assign_creates_one_row_per_member() {
    let store = memory_store();
    let plan = add_plan(&store, diet_plan("Lean Bulk")).await;
    let a = add_member(&store, "Ana").await;
    let b = add_member(&store, "Ben").await;
    let c = add_member(&store, "Chloe").await;

    let ledger = AssignmentLedger::new(Arc::clone(&store));
    let report = ledger
        .create_batch(batch(plan.id, vec![a.id, b.id, c.id]), &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.is_complete_success());
    assert!(report.warnings.is_empty());

    let rows = store.list_assignments_for_plan(plan.id).await.unwrap();
    assert_eq!(rows.len(), 3);
    let members: HashSet<Uuid> = rows.iter().map(|r| r.member_id).collect();
    assert_eq!(members, HashSet::from([a.id, b.id, c.id]));
    for row in &rows {
        assert_eq!(row.plan_id, plan.id);
        assert_eq!(row.status, AssignmentStatus::Active);
        assert_eq!(row.start_date, date(2024, 1, 1));
        assert_eq!(row.end_date, None);
        assert_eq!(row.active_days, DayPreset::MonWedFri.days());
        assert_eq!(row.date_range().end_label(), "Ongoing");
    }
}

#[tokio::test]
async fn validation_errors_write_nothing() {
    let store = memory_store();
    let plan = add_plan(&store, diet_plan("Cut")).await;
    let m = add_member(&store, "Dee").await;
    let ledger = AssignmentLedger::new(Arc::clone(&store));
    let cancel = CancellationToken::new();

    let err = ledger
        .create_batch(batch(plan.id, vec![]), &cancel)
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::NoMembers)
    );
    assert_eq!(err.to_string(), "select at least one member");

    let mut no_days = batch(plan.id, vec![m.id]);
    no_days.active_days = Default::default();
    let err = ledger.create_batch(no_days, &cancel).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::NoActiveDays)
    );

    let ghost = Uuid::new_v4();
    let err = ledger
        .create_batch(batch(ghost, vec![m.id]), &cancel)
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::PlanNotFound(ghost))
    );

    assert!(store.list_assignments(PlanKind::Diet).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_member_is_rejected_per_row() {
    let store = memory_store();
    let plan = add_plan(&store, diet_plan("Cut")).await;
    let a = add_member(&store, "Ada").await;
    let b = add_member(&store, "Bo").await;
    let stranger = Uuid::new_v4();

    let report = AssignmentLedger::new(Arc::clone(&store))
        .create_batch(
            batch(plan.id, vec![a.id, stranger, b.id]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.summary(), "2 of 3 succeeded");
    let (subject, err) = report.failures().next().unwrap();
    assert_eq!(subject, stranger);
    assert_eq!(
        err,
        &BulkItemError::Rejected(ValidationError::MemberNotFound(stranger))
    );

    let holders: HashSet<Uuid> = store
        .list_assignments_for_plan(plan.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.member_id)
        .collect();
    assert_eq!(holders, HashSet::from([a.id, b.id]));
}

#[tokio::test]
async fn inverted_dates_and_repeat_members_are_warnings() {
    let store = memory_store();
    let plan = add_plan(&store, diet_plan("Cut")).await;
    let m = add_member(&store, "Eve").await;
    let ledger = AssignmentLedger::new(Arc::clone(&store));
    let cancel = CancellationToken::new();

    ledger
        .create_batch(batch(plan.id, vec![m.id]), &cancel)
        .await
        .unwrap();

    let mut again = batch(plan.id, vec![m.id, m.id]);
    again.end_date = Some(date(2023, 12, 1));
    let report = ledger.create_batch(again, &cancel).await.unwrap();

    // Duplicate ids in one request collapse to one row.
    assert_eq!(report.outcomes.len(), 1);
    assert!(report.is_complete_success());
    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings[0].contains("before start date"));
    assert!(report.warnings[1].contains("already assigned"));

    let rows = store.list_assignments_for_plan(plan.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.date_range().is_inverted()));
}

/// Store that refuses to write assignments for one member.
struct FlakyStore {
    inner: MemoryStore,
    refuse: Uuid,
}

#[async_trait]
impl PlanRepository for FlakyStore {
    async fn insert_plan(&self, plan: &PlanTemplate) -> Result<()> {
        self.inner.insert_plan(plan).await
    }
    async fn get_plan(&self, id: Uuid) -> Result<Option<PlanTemplate>> {
        self.inner.get_plan(id).await
    }
    async fn list_plans(&self, kind: Option<PlanKind>, archived: bool) -> Result<Vec<PlanTemplate>> {
        self.inner.list_plans(kind, archived).await
    }
    async fn update_plan(&self, plan: &PlanTemplate) -> Result<()> {
        self.inner.update_plan(plan).await
    }
    async fn set_plan_archived(&self, id: Uuid, archived: bool) -> Result<()> {
        self.inner.set_plan_archived(id, archived).await
    }
    async fn delete_plan(&self, id: Uuid) -> Result<bool> {
        self.inner.delete_plan(id).await
    }
}

#[async_trait]
impl AssignmentRepository for FlakyStore {
    async fn insert_assignment(&self, a: &Assignment) -> Result<()> {
        if a.member_id == self.refuse {
            anyhow::bail!("connection reset");
        }
        self.inner.insert_assignment(a).await
    }
    async fn get_assignment(&self, id: Uuid) -> Result<Option<Assignment>> {
        self.inner.get_assignment(id).await
    }
    async fn list_assignments(&self, kind: PlanKind) -> Result<Vec<Assignment>> {
        self.inner.list_assignments(kind).await
    }
    async fn list_assignments_for_plan(&self, plan_id: Uuid) -> Result<Vec<Assignment>> {
        self.inner.list_assignments_for_plan(plan_id).await
    }
    async fn update_assignment(&self, a: &Assignment) -> Result<()> {
        self.inner.update_assignment(a).await
    }
    async fn delete_assignment(&self, id: Uuid) -> Result<bool> {
        self.inner.delete_assignment(id).await
    }
}

#[async_trait]
impl MemberRepository for FlakyStore {
    async fn insert_member(&self, m: &Member) -> Result<()> {
        self.inner.insert_member(m).await
    }
    async fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
        self.inner.get_member(id).await
    }
    async fn list_members(&self) -> Result<Vec<Member>> {
        self.inner.list_members().await
    }
}

#[async_trait]
impl OverlayRepository for FlakyStore {
    async fn save_overlay(&self, o: &CustomizationOverlay) -> Result<()> {
        self.inner.save_overlay(o).await
    }
    async fn get_overlay(&self, id: Uuid) -> Result<Option<CustomizationOverlay>> {
        self.inner.get_overlay(id).await
    }
    async fn list_overlays(&self) -> Result<Vec<CustomizationOverlay>> {
        self.inner.list_overlays().await
    }
    async fn delete_overlay(&self, id: Uuid) -> Result<bool> {
        self.inner.delete_overlay(id).await
    }
}

#[async_trait]
impl FoodRepository for FlakyStore {
    async fn insert_food(&self, f: &FoodEntry) -> Result<()> {
        self.inner.insert_food(f).await
    }
    async fn get_food(&self, id: Uuid) -> Result<Option<FoodEntry>> {
        self.inner.get_food(id).await
    }
    async fn update_food(&self, f: &FoodEntry) -> Result<()> {
        self.inner.update_food(f).await
    }
    async fn delete_food(&self, id: Uuid) -> Result<bool> {
        self.inner.delete_food(id).await
    }
    async fn search_foods(&self, q: &FoodQuery) -> Result<Vec<FoodEntry>> {
        self.inner.search_foods(q).await
    }
}

#[tokio::test]
async fn one_failing_row_does_not_hide_the_others() {
    let refused = member("Flo");
    let refuse = refused.id;
    let store: Arc<dyn Store> = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        refuse,
    });
    store.insert_member(&refused).await.unwrap();
    let plan = add_plan(&store, diet_plan("Recomp")).await;
    let ok1 = add_member(&store, "Finn").await;
    let ok2 = add_member(&store, "Gia").await;

    let ledger = AssignmentLedger::new(Arc::clone(&store)).with_concurrency(2);
    let report = ledger
        .create_batch(
            batch(plan.id, vec![ok1.id, refuse, ok2.id]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let counts = report.counts();
    assert_eq!((counts.succeeded, counts.failed), (2, 1));
    assert_eq!(report.summary(), "2 of 3 succeeded");

    // Outcomes come back in request order.
    let subjects: Vec<Uuid> = report.outcomes.iter().map(|o| o.subject).collect();
    assert_eq!(subjects, vec![ok1.id, refuse, ok2.id]);
    let (failed_member, err) = report.failures().next().unwrap();
    assert_eq!(failed_member, refuse);
    assert!(matches!(err, BulkItemError::Backend(msg) if msg.contains("connection reset")));

    assert_eq!(store.list_assignments_for_plan(plan.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn cancelled_batch_writes_nothing() {
    let store = memory_store();
    let plan = add_plan(&store, diet_plan("Cut")).await;
    let a = add_member(&store, "Hal").await;
    let b = add_member(&store, "Ivy").await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = AssignmentLedger::new(Arc::clone(&store))
        .create_batch(batch(plan.id, vec![a.id, b.id]), &cancel)
        .await
        .unwrap();

    assert_eq!(report.counts().cancelled, 2);
    assert_eq!(report.summary(), "0 of 2 succeeded, 2 cancelled");
    assert!(store.list_assignments_for_plan(plan.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_allows_any_status_and_clears_end_date() {
    let store = memory_store();
    let plan = add_plan(&store, workout_plan("HIIT")).await;
    let m = add_member(&store, "Jon").await;
    let ledger = AssignmentLedger::new(Arc::clone(&store));

    let mut b = batch(plan.id, vec![m.id]);
    b.end_date = Some(date(2024, 2, 1));
    let report = ledger.create_batch(b, &CancellationToken::new()).await.unwrap();
    let id = report.succeeded().next().unwrap();

    let done = ledger
        .update(
            id,
            AssignmentPatch {
                status: Some(AssignmentStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(done.status, AssignmentStatus::Completed);

    let reopened = ledger
        .update(
            id,
            AssignmentPatch {
                status: Some(AssignmentStatus::Active),
                end_date: Some(None),
                active_days: Some(DayPreset::Weekends.days()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(reopened.status, AssignmentStatus::Active);
    assert_eq!(reopened.end_date, None);
    assert_eq!(reopened.schedule_label(), "Weekends");
    assert!(reopened.updated_at >= done.updated_at);

    let err = ledger
        .update(
            id,
            AssignmentPatch {
                active_days: Some(Default::default()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::NoActiveDays)
    );
}

#[tokio::test]
async fn deleting_an_assignment_removes_its_overlay() {
    let store = memory_store();
    let plan = add_plan(&store, diet_plan("Keto")).await;
    let m = add_member(&store, "Kai").await;
    let ledger = AssignmentLedger::new(Arc::clone(&store));
    let overlays = OverlayService::new(Arc::clone(&store));

    let report = ledger
        .create_batch(batch(plan.id, vec![m.id]), &CancellationToken::new())
        .await
        .unwrap();
    let id = report.succeeded().next().unwrap();
    overlays
        .set_day_kind(id, Weekday::Sunday, gymdash_core::schedule::DayKind::Cheat)
        .await
        .unwrap();
    assert!(store.get_overlay(id).await.unwrap().is_some());

    ledger.delete(id).await.unwrap();
    assert!(store.get_assignment(id).await.unwrap().is_none());
    assert!(store.get_overlay(id).await.unwrap().is_none());

    let err = ledger.delete(id).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::AssignmentNotFound(id))
    );
}

#[tokio::test]
async fn list_joins_names_filters_and_counts() {
    let store = memory_store();
    let plan = add_plan(&store, diet_plan("Summer Shred")).await;
    let other = add_plan(&store, diet_plan("Winter Bulk")).await;
    let ana = add_member(&store, "Ana Diaz").await;
    let ben = add_member(&store, "Ben Okafor").await;
    let ledger = AssignmentLedger::new(Arc::clone(&store));
    let cancel = CancellationToken::new();

    let first = ledger
        .create_batch(batch(plan.id, vec![ana.id]), &cancel)
        .await
        .unwrap();
    let r = ledger
        .create_batch(batch(other.id, vec![ben.id]), &cancel)
        .await
        .unwrap();
    ledger
        .update(
            r.succeeded().next().unwrap(),
            AssignmentPatch {
                status: Some(AssignmentStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // Row whose member has left the directory.
    let orphan = Assignment {
        id: Uuid::new_v4(),
        member_id: Uuid::new_v4(),
        created_at: chrono::Utc::now(),
        ..ledger.get(first.succeeded().next().unwrap()).await.unwrap()
    };
    store.insert_assignment(&orphan).await.unwrap();
    store.delete_plan(other.id).await.unwrap();

    let all = ledger
        .list(PlanKind::Diet, &AssignmentFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].member_name, "Unknown");
    assert_eq!(all[1].plan_name, "Unknown");
    assert_eq!(all[2].member_name, "Ana Diaz");

    let search = AssignmentFilter {
        status: None,
        search: "SHRED".into(),
    };
    assert_eq!(ledger.list(PlanKind::Diet, &search).await.unwrap().len(), 2);

    let by_email = AssignmentFilter {
        status: Some(AssignmentStatus::Active),
        search: "ana.diaz@".into(),
    };
    assert_eq!(ledger.list(PlanKind::Diet, &by_email).await.unwrap().len(), 1);

    let stats = ledger.stats(PlanKind::Diet).await.unwrap();
    assert_eq!(
        (stats.total, stats.active, stats.completed, stats.cancelled),
        (3, 2, 0, 1)
    );
    assert_eq!(ledger.stats(PlanKind::Workout).await.unwrap().total, 0);
}
