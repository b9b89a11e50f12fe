//! Storage ports.
//!
//! Services depend on `dyn Store`, the union of the repository traits.
//! [`MemoryStore`] backs tests and demos; [`PgStore`] is the sqlx adapter.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::PlanKind;
use crate::catalog::{FoodEntry, FoodQuery, PlanTemplate};
use crate::ledger::Assignment;
use crate::members::Member;
use crate::overlay::CustomizationOverlay;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn insert_plan(&self, plan: &PlanTemplate) -> Result<()>;

    async fn get_plan(&self, id: Uuid) -> Result<Option<PlanTemplate>>;

    /// Plans ordered by name. Archived plans only when asked for.
    async fn list_plans(
        &self,
        kind: Option<PlanKind>,
        include_archived: bool,
    ) -> Result<Vec<PlanTemplate>>;

    async fn update_plan(&self, plan: &PlanTemplate) -> Result<()>;

    async fn set_plan_archived(&self, id: Uuid, archived: bool) -> Result<()>;

    /// Returns `false` if there was nothing to delete. Assignments that
    /// reference the plan stay.
    async fn delete_plan(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn insert_assignment(&self, assignment: &Assignment) -> Result<()>;

    async fn get_assignment(&self, id: Uuid) -> Result<Option<Assignment>>;

    /// Assignments of one plan kind, newest first.
    async fn list_assignments(&self, kind: PlanKind) -> Result<Vec<Assignment>>;

    async fn list_assignments_for_plan(&self, plan_id: Uuid) -> Result<Vec<Assignment>>;

    async fn update_assignment(&self, assignment: &Assignment) -> Result<()>;

    /// Removes the assignment and its overlay. Returns `false` if there was
    /// nothing to delete.
    async fn delete_assignment(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn insert_member(&self, member: &Member) -> Result<()>;

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>>;

    /// All members ordered by name.
    async fn list_members(&self) -> Result<Vec<Member>>;
}

#[async_trait]
pub trait OverlayRepository: Send + Sync {
    /// Insert, or replace the overlay already attached to the same
    /// assignment.
    async fn save_overlay(&self, overlay: &CustomizationOverlay) -> Result<()>;

    async fn get_overlay(&self, assignment_id: Uuid) -> Result<Option<CustomizationOverlay>>;

    async fn list_overlays(&self) -> Result<Vec<CustomizationOverlay>>;

    async fn delete_overlay(&self, assignment_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait FoodRepository: Send + Sync {
    async fn insert_food(&self, food: &FoodEntry) -> Result<()>;

    async fn get_food(&self, id: Uuid) -> Result<Option<FoodEntry>>;

    async fn update_food(&self, food: &FoodEntry) -> Result<()>;

    async fn delete_food(&self, id: Uuid) -> Result<bool>;

    /// Items matching `query`, ordered by name.
    async fn search_foods(&self, query: &FoodQuery) -> Result<Vec<FoodEntry>>;
}

/// Everything the services need from storage.
pub trait Store:
    PlanRepository + AssignmentRepository + MemberRepository + OverlayRepository + FoodRepository
{
}

impl<T> Store for T where
    T: PlanRepository
        + AssignmentRepository
        + MemberRepository
        + OverlayRepository
        + FoodRepository
{
}

// Services hold `Arc<dyn Store>`.
const _: () = {
    fn _assert_object_safe(_: &dyn Store) {}
};
