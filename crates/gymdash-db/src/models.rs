use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Error returned when a stored or user-supplied string does not name a
/// variant of one of the enums below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl EnumParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------

/// Which catalog a plan template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Diet,
    Workout,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Diet => "diet",
            Self::Workout => "workout",
        };
        f.write_str(s)
    }
}

impl FromStr for PlanKind {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diet" => Ok(Self::Diet),
            "workout" => Ok(Self::Workout),
            other => Err(EnumParseError::new("plan kind", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Lifecycle status of an assignment.
///
/// Every assignment starts `active`. Status only changes by explicit update
/// and any variant may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for AssignmentStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EnumParseError::new("assignment status", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Membership status as reported by the member directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Expired,
    Trial,
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Trial => "trial",
        };
        f.write_str(s)
    }
}

impl FromStr for MembershipStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "trial" => Ok(Self::Trial),
            other => Err(EnumParseError::new("membership status", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Status of a per-member customization overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OverlayStatus {
    Active,
    Paused,
    Completed,
}

impl fmt::Display for OverlayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

impl FromStr for OverlayStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            other => Err(EnumParseError::new("overlay status", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row in the `members` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub photo: Option<String>,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
}

/// A row in the `plans` table.
///
/// `details` holds the kind-specific body (macros and meals for diets,
/// exercises for workouts) as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanRow {
    pub id: Uuid,
    pub kind: PlanKind,
    pub name: String,
    pub goal: String,
    pub trainer: Option<String>,
    pub details: serde_json::Value,
    pub default_active_days: Vec<String>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row in the `assignments` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssignmentRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub plan_id: Uuid,
    pub plan_kind: PlanKind,
    pub status: AssignmentStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub active_days: Vec<String>,
    pub notify_email: bool,
    pub notify_sms: bool,
    pub notify_whatsapp: bool,
    pub notify_in_app: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row in the `overlays` table. The JSON columns are decoded by the
/// domain layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OverlayRow {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub member_id: Uuid,
    pub base_plan_id: Uuid,
    pub schedule: serde_json::Value,
    pub macro_overrides: serde_json::Value,
    pub restrictions: serde_json::Value,
    pub meal_overrides: serde_json::Value,
    pub status: OverlayStatus,
    pub weeks_applied: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row in the `food_catalog` table. `category`, `diet_types` and
/// `allergens` hold the kebab-case names the domain layer parses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub serving_size: String,
    pub calories: i32,
    pub protein: f32,
    pub carbs: f32,
    pub fat: f32,
    pub fiber: Option<f32>,
    pub diet_types: Vec<String>,
    pub allergens: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_status_parses_and_displays() {
        for status in [
            AssignmentStatus::Active,
            AssignmentStatus::Completed,
            AssignmentStatus::Cancelled,
        ] {
            let parsed: AssignmentStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "paused".parse::<AssignmentStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid assignment status: \"paused\"");
    }

    #[test]
    fn overlay_status_accepts_paused() {
        assert_eq!("paused".parse::<OverlayStatus>().unwrap(), OverlayStatus::Paused);
    }

    #[test]
    fn plan_kind_serde_is_snake_case() {
        let json = serde_json::to_string(&PlanKind::Workout).unwrap();
        assert_eq!(json, "\"workout\"");
    }
}
