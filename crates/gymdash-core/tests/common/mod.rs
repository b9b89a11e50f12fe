#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use gymdash_core::MembershipStatus;
use gymdash_core::catalog::{
    DietDetails, DietType, Difficulty, ExerciseSet, FoodCategory, FoodDraft, FoodItem, Goal,
    Macros, Meal, MealTime, PlanDetails, PlanTemplate, WorkoutDetails,
};
use gymdash_core::members::Member;
use gymdash_core::repository::{MemoryStore, Store};
use gymdash_core::schedule::WeekdaySet;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn memory_store() -> Arc<dyn Store> {
    Arc::new(MemoryStore::new())
}

pub fn member(name: &str) -> Member {
    Member {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        phone: "555-0100".to_owned(),
        photo: None,
        status: MembershipStatus::Active,
    }
}

pub async fn add_member(store: &Arc<dyn Store>, name: &str) -> Member {
    let member = member(name);
    store.insert_member(&member).await.unwrap();
    member
}

pub fn diet_plan(name: &str) -> PlanTemplate {
    let now = Utc::now();
    PlanTemplate {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        goal: Goal::MuscleGain,
        trainer: Some("Priya".to_owned()),
        details: PlanDetails::Diet(DietDetails {
            diet_type: DietType::NonVegetarian,
            target_calories: 2000,
            macros: Macros {
                calories: 2000,
                protein: 150,
                carbs: 200,
                fat: 70,
            },
            meals: vec![Meal {
                time: MealTime::Breakfast,
                items: vec![FoodItem {
                    name: "Almond Oats".to_owned(),
                    quantity: "1 bowl".to_owned(),
                    calories: 350,
                    protein: 12.0,
                    carbs: 50.0,
                    fat: 10.0,
                    allergens: [gymdash_core::catalog::Allergen::Nuts].into_iter().collect(),
                    diet_types: Default::default(),
                }],
            }],
        }),
        default_active_days: WeekdaySet::ALL,
        archived: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn workout_plan(name: &str) -> PlanTemplate {
    let now = Utc::now();
    PlanTemplate {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        goal: Goal::GeneralFitness,
        trainer: None,
        details: PlanDetails::Workout(WorkoutDetails {
            body_part: "Full Body".to_owned(),
            difficulty: Difficulty::Beginner,
            duration_minutes: 40,
            exercises: vec![ExerciseSet {
                name: "Burpee".to_owned(),
                sets: 3,
                reps: 12,
                rest_seconds: 60,
            }],
        }),
        default_active_days: WeekdaySet::ALL,
        archived: false,
        created_at: now,
        updated_at: now,
    }
}

pub async fn add_plan(store: &Arc<dyn Store>, plan: PlanTemplate) -> PlanTemplate {
    store.insert_plan(&plan).await.unwrap();
    plan
}

pub fn food_draft(name: &str, category: FoodCategory, diets: &[DietType]) -> FoodDraft {
    FoodDraft {
        name: name.to_owned(),
        category,
        serving_size: "100 g".to_owned(),
        calories: 120,
        protein: 8.0,
        carbs: 15.0,
        fat: 3.0,
        fiber: Some(2.0),
        diet_types: diets.iter().copied().collect(),
        allergens: Default::default(),
    }
}
