use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::OverlayStatus;
use crate::catalog::model::{
    Allergen, DietType, FoodItem, MealTime, PlanTemplate, UnknownVariant, labelled_enum,
};
use crate::error::ValidationError;
use crate::ledger::Assignment;
use crate::schedule::{OverlaySchedule, Weekday};

/// Percentage applied to every base macro, 50 to 150 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ScalePercentage(u16);

impl ScalePercentage {
    pub const MIN: u16 = 50;
    pub const MAX: u16 = 150;

    pub fn new(percent: u16) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(ValidationError::ScaleOutOfRange(percent))
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn factor(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for ScalePercentage {
    fn default() -> Self {
        Self(100)
    }
}

impl TryFrom<u16> for ScalePercentage {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScalePercentage> for u16 {
    fn from(s: ScalePercentage) -> Self {
        s.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    #[default]
    Decrease,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        })
    }
}

impl FromStr for Direction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increase" => Ok(Self::Increase),
            "decrease" => Ok(Self::Decrease),
            other => Err(UnknownVariant {
                kind: "direction",
                value: other.to_owned(),
            }),
        }
    }
}

/// Weekly compounding change to the macro targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub enabled: bool,
    pub direction: Direction,
    pub percent_per_week: u8,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            enabled: false,
            direction: Direction::Decrease,
            percent_per_week: 5,
        }
    }
}

impl Progression {
    pub fn new(direction: Direction, percent_per_week: u8) -> Result<Self, ValidationError> {
        if !(1..=50).contains(&percent_per_week) {
            return Err(ValidationError::ProgressionOutOfRange(percent_per_week));
        }
        Ok(Self {
            enabled: true,
            direction,
            percent_per_week,
        })
    }

    /// Multiplier for one week of change.
    pub fn weekly_factor(&self) -> f64 {
        let step = f64::from(self.percent_per_week) / 100.0;
        match self.direction {
            Direction::Increase => 1.0 + step,
            Direction::Decrease => 1.0 - step,
        }
    }
}

/// Member-specific macro adjustments. An absolute target beats the scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroOverrides {
    pub calories: Option<u32>,
    pub protein: Option<u32>,
    pub carbs: Option<u32>,
    pub fat: Option<u32>,
    #[serde(default)]
    pub scale: ScalePercentage,
    #[serde(default)]
    pub progression: Progression,
}

// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MedicalTag {
    DiabeticSafe,
    LowSodium,
    HeartHealthy,
    KidneyFriendly,
    LowCholesterol,
}

labelled_enum!(MedicalTag, "medical tag", {
    DiabeticSafe => "diabetic-safe",
    LowSodium => "low-sodium",
    HeartHealthy => "heart-healthy",
    KidneyFriendly => "kidney-friendly",
    LowCholesterol => "low-cholesterol",
});

/// Dietary restrictions. Advisory only: they never edit the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restrictions {
    pub diet_type: Option<DietType>,
    #[serde(default)]
    pub allergies: BTreeSet<Allergen>,
    #[serde(default)]
    pub medical_tags: BTreeSet<MedicalTag>,
    #[serde(default)]
    pub excluded_ingredients: Vec<String>,
}

/// Replaces, adds or removes one meal on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealOverride {
    pub day: Weekday,
    pub meal: MealTime,
    #[serde(default)]
    pub items: Vec<FoodItem>,
    #[serde(default)]
    pub removed: bool,
}

// ---------------------------------------------------------------------------

/// Per-member customization of a diet assignment. Keyed by the assignment;
/// the base plan is only ever read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomizationOverlay {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub member_id: Uuid,
    pub base_plan_id: Uuid,
    pub schedule: OverlaySchedule,
    pub macros: MacroOverrides,
    pub restrictions: Restrictions,
    pub meal_overrides: Vec<MealOverride>,
    pub status: OverlayStatus,
    /// Progression weeks already folded into the macro targets.
    pub weeks_applied: u32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomizationOverlay {
    /// Untouched overlay for a diet assignment.
    pub fn for_assignment(assignment: &Assignment, plan: &PlanTemplate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            assignment_id: assignment.id,
            member_id: assignment.member_id,
            base_plan_id: assignment.plan_id,
            schedule: OverlaySchedule::default(),
            macros: MacroOverrides::default(),
            restrictions: base_restrictions(plan),
            meal_overrides: Vec::new(),
            status: OverlayStatus::Active,
            weeks_applied: 0,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Put schedule, macros and restrictions back to the plan's defaults.
    /// Meal overrides and notes are kept.
    pub fn reset(&mut self, plan: &PlanTemplate, now: DateTime<Utc>) {
        self.schedule = OverlaySchedule::default();
        self.macros = MacroOverrides::default();
        self.restrictions = base_restrictions(plan);
        self.weeks_applied = 0;
        self.updated_at = now;
    }

    /// Insert or replace the override for `(day, meal)`.
    pub fn upsert_meal_override(&mut self, ov: MealOverride) {
        match self
            .meal_overrides
            .iter_mut()
            .find(|m| m.day == ov.day && m.meal == ov.meal)
        {
            Some(existing) => *existing = ov,
            None => self.meal_overrides.push(ov),
        }
    }
}

fn base_restrictions(plan: &PlanTemplate) -> Restrictions {
    Restrictions {
        diet_type: plan.details.as_diet().map(|d| d.diet_type),
        ..Restrictions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_bounded() {
        assert!(ScalePercentage::new(49).is_err());
        assert_eq!(ScalePercentage::new(150).unwrap().get(), 150);
        assert!(serde_json::from_str::<ScalePercentage>("151").is_err());
        assert_eq!(ScalePercentage::default().factor(), 1.0);
    }

    #[test]
    fn progression_defaults_match_new_overlays() {
        let p = Progression::default();
        assert!(!p.enabled);
        assert_eq!(p.percent_per_week, 5);
        assert_eq!(p.direction, Direction::Decrease);
        assert!(Progression::new(Direction::Increase, 0).is_err());
    }

    #[test]
    fn macro_overrides_missing_fields_use_defaults() {
        let o: MacroOverrides = serde_json::from_str(r#"{"calories": 1800}"#).unwrap();
        assert_eq!(o.calories, Some(1800));
        assert_eq!(o.scale.get(), 100);
        assert!(!o.progression.enabled);
    }
}
