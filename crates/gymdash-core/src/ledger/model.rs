use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::{DateRange, WeekdaySet, describe_active_days};
use crate::{AssignmentStatus, PlanKind};

/// Which channels the member should be notified on. Only the intent is
/// recorded; nothing is sent from here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyChannels {
    pub email: bool,
    pub sms: bool,
    pub whatsapp: bool,
    pub in_app: bool,
}

impl NotifyChannels {
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.email, "email"),
            (self.sms, "sms"),
            (self.whatsapp, "whatsapp"),
            (self.in_app, "in_app"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
    }
}

/// One member's enrolment in one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub plan_id: Uuid,
    pub plan_kind: PlanKind,
    pub status: AssignmentStatus,
    pub start_date: NaiveDate,
    /// `None` reads as "Ongoing".
    pub end_date: Option<NaiveDate>,
    pub active_days: WeekdaySet,
    pub notify: NotifyChannels,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn schedule_label(&self) -> String {
        describe_active_days(self.active_days)
    }
}

/// Input for assigning one plan to a set of members.
#[derive(Debug, Clone)]
pub struct NewAssignmentBatch {
    pub member_ids: Vec<Uuid>,
    pub plan_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub active_days: WeekdaySet,
    pub notify: NotifyChannels,
    pub notes: Option<String>,
}

/// Partial update. `None` leaves a field alone; the nested options on
/// `end_date` and `notes` distinguish "clear" from "keep".
#[derive(Debug, Clone, Default)]
pub struct AssignmentPatch {
    pub status: Option<AssignmentStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub active_days: Option<WeekdaySet>,
    pub notify: Option<NotifyChannels>,
    pub notes: Option<Option<String>>,
}

impl AssignmentPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.active_days.is_none()
            && self.notify.is_none()
            && self.notes.is_none()
    }

    pub(crate) fn apply_to(self, a: &mut Assignment) {
        if let Some(status) = self.status {
            a.status = status;
        }
        if let Some(start) = self.start_date {
            a.start_date = start;
        }
        if let Some(end) = self.end_date {
            a.end_date = end;
        }
        if let Some(days) = self.active_days {
            a.active_days = days;
        }
        if let Some(notify) = self.notify {
            a.notify = notify;
        }
        if let Some(notes) = self.notes {
            a.notes = notes;
        }
    }
}

/// An assignment joined with the names shown next to it. Missing members
/// or plans show as `Unknown`.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub member_name: String,
    pub member_email: String,
    pub plan_name: String,
}

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
}

/// Status and free-text filter for the assignment list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentFilter {
    pub status: Option<AssignmentStatus>,
    #[serde(default)]
    pub search: String,
}

impl AssignmentFilter {
    pub fn matches(&self, view: &AssignmentView) -> bool {
        if self.status.is_some_and(|s| s != view.assignment.status) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || view.member_name.to_lowercase().contains(&needle)
            || view.member_email.to_lowercase().contains(&needle)
            || view.plan_name.to_lowercase().contains(&needle)
    }
}
