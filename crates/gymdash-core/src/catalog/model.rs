//! Plan template types.
//!
//! A [`PlanTemplate`] is shared by every member assigned to it and is never
//! modified through an assignment. Its member list is not stored: it is
//! whatever the ledger holds for the plan id.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PlanKind;
use crate::schedule::WeekdaySet;

/// Error for the string-keyed catalog enums below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `Display`, `FromStr` and an `ALL` list for a
/// fieldless enum with kebab-case wire names.
macro_rules! labelled_enum {
    ($name:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $what,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

pub(crate) use labelled_enum;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    WeightLoss,
    MuscleGain,
    Maintenance,
    FatLoss,
    GeneralFitness,
}

labelled_enum!(Goal, "goal", {
    WeightLoss => "weight-loss",
    MuscleGain => "muscle-gain",
    Maintenance => "maintenance",
    FatLoss => "fat-loss",
    GeneralFitness => "general-fitness",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietType {
    Vegetarian,
    NonVegetarian,
    Vegan,
    Keto,
    Diabetic,
    GlutenFree,
}

labelled_enum!(DietType, "diet type", {
    Vegetarian => "vegetarian",
    NonVegetarian => "non-vegetarian",
    Vegan => "vegan",
    Keto => "keto",
    Diabetic => "diabetic",
    GlutenFree => "gluten-free",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Allergen {
    Nuts,
    Dairy,
    Gluten,
    Soy,
    Eggs,
    Shellfish,
    Fish,
}

labelled_enum!(Allergen, "allergen", {
    Nuts => "nuts",
    Dairy => "dairy",
    Gluten => "gluten",
    Soy => "soy",
    Eggs => "eggs",
    Shellfish => "shellfish",
    Fish => "fish",
});

/// Meal slots in the order they are eaten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MealTime {
    Breakfast,
    PreWorkout,
    Lunch,
    Snacks,
    PostWorkout,
    Dinner,
}

labelled_enum!(MealTime, "meal time", {
    Breakfast => "breakfast",
    PreWorkout => "pre-workout",
    Lunch => "lunch",
    Snacks => "snacks",
    PostWorkout => "post-workout",
    Dinner => "dinner",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

labelled_enum!(Difficulty, "difficulty", {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

// ---------------------------------------------------------------------------
// Plan bodies
// ---------------------------------------------------------------------------

/// Daily macro targets. Calories in kcal, the rest in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub quantity: String,
    pub calories: u32,
    #[serde(default)]
    pub protein: f32,
    #[serde(default)]
    pub carbs: f32,
    #[serde(default)]
    pub fat: f32,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub allergens: BTreeSet<Allergen>,
    /// Diets this item fits. Empty means untagged.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub diet_types: BTreeSet<DietType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub time: MealTime,
    pub items: Vec<FoodItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietDetails {
    pub diet_type: DietType,
    pub target_calories: u32,
    pub macros: Macros,
    #[serde(default)]
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub rest_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDetails {
    pub body_part: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    #[serde(default)]
    pub exercises: Vec<ExerciseSet>,
}

/// Kind-specific body of a plan. Stored as the `details` JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanDetails {
    Diet(DietDetails),
    Workout(WorkoutDetails),
}

impl PlanDetails {
    pub fn kind(&self) -> PlanKind {
        match self {
            Self::Diet(_) => PlanKind::Diet,
            Self::Workout(_) => PlanKind::Workout,
        }
    }

    pub fn as_diet(&self) -> Option<&DietDetails> {
        match self {
            Self::Diet(d) => Some(d),
            Self::Workout(_) => None,
        }
    }

    pub fn as_workout(&self) -> Option<&WorkoutDetails> {
        match self {
            Self::Workout(w) => Some(w),
            Self::Diet(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTemplate {
    pub id: Uuid,
    pub name: String,
    pub goal: Goal,
    pub trainer: Option<String>,
    pub details: PlanDetails,
    /// Suggested days for new assignments of this plan.
    pub default_active_days: WeekdaySet,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanTemplate {
    pub fn kind(&self) -> PlanKind {
        self.details.kind()
    }

    /// A fresh copy under a new id, named `<name> (Copy)`. The copy has no
    /// assignments of its own and is never archived.
    pub fn duplicate(&self, now: DateTime<Utc>) -> PlanTemplate {
        PlanTemplate {
            id: Uuid::new_v4(),
            name: format!("{} (Copy)", self.name),
            archived: false,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}

/// A plan together with the members currently assigned to it.
#[derive(Debug, Clone, Serialize)]
pub struct PlanWithMembers {
    pub plan: PlanTemplate,
    pub member_ids: Vec<Uuid>,
}
