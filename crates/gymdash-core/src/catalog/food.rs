//! Food catalog: reusable items trainers pick from when building meals.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::model::{Allergen, DietType, FoodItem, UnknownVariant, labelled_enum};
use crate::error::ValidationError;
use crate::repository::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoodCategory {
    Protein,
    Carbs,
    Vegetables,
    Fruits,
    Dairy,
    Fats,
    Beverages,
    Snacks,
}

labelled_enum!(FoodCategory, "food category", {
    Protein => "protein",
    Carbs => "carbs",
    Vegetables => "vegetables",
    Fruits => "fruits",
    Dairy => "dairy",
    Fats => "fats",
    Beverages => "beverages",
    Snacks => "snacks",
});

/// Serving used when a draft leaves it blank.
pub const DEFAULT_SERVING: &str = "1 serving";

/// One catalog item. Nutrition is per `serving_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub name: String,
    pub category: FoodCategory,
    pub serving_size: String,
    pub calories: u32,
    pub protein: f32,
    pub carbs: f32,
    pub fat: f32,
    pub fiber: Option<f32>,
    pub diet_types: BTreeSet<DietType>,
    pub allergens: BTreeSet<Allergen>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodEntry {
    /// A meal item built from this entry. `quantity` defaults to the
    /// catalog serving.
    pub fn to_item(&self, quantity: Option<&str>) -> FoodItem {
        FoodItem {
            name: self.name.clone(),
            quantity: quantity.unwrap_or(&self.serving_size).to_owned(),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            allergens: self.allergens.clone(),
            diet_types: self.diet_types.clone(),
        }
    }
}

/// Fields supplied when adding or editing an item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FoodDraft {
    pub name: String,
    pub category: FoodCategory,
    #[serde(default)]
    pub serving_size: String,
    pub calories: u32,
    #[serde(default)]
    pub protein: f32,
    #[serde(default)]
    pub carbs: f32,
    #[serde(default)]
    pub fat: f32,
    #[serde(default)]
    pub fiber: Option<f32>,
    #[serde(default)]
    pub diet_types: BTreeSet<DietType>,
    #[serde(default)]
    pub allergens: BTreeSet<Allergen>,
}

impl FoodDraft {
    fn into_entry(self, id: Uuid, created_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<FoodEntry> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankFoodName.into());
        }
        let serving = self.serving_size.trim();
        Ok(FoodEntry {
            id,
            name: name.to_owned(),
            category: self.category,
            serving_size: if serving.is_empty() {
                DEFAULT_SERVING.to_owned()
            } else {
                serving.to_owned()
            },
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
            diet_types: self.diet_types,
            allergens: self.allergens,
            created_at,
            updated_at: now,
        })
    }
}

/// Catalog search. Every set field must match; an empty query matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoodQuery {
    /// Case-insensitive substring of the name.
    pub text: Option<String>,
    pub category: Option<FoodCategory>,
    /// Only items explicitly tagged with this diet.
    pub diet_type: Option<DietType>,
}

impl FoodQuery {
    /// `None` for blank text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn matches(&self, food: &FoodEntry) -> bool {
        let text_ok = self
            .text()
            .is_none_or(|t| food.name.to_lowercase().contains(&t.to_lowercase()));
        text_ok
            && self.category.is_none_or(|c| food.category == c)
            && self.diet_type.is_none_or(|d| food.diet_types.contains(&d))
    }
}

#[derive(Clone)]
pub struct FoodCatalog {
    store: Arc<dyn Store>,
}

impl FoodCatalog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: FoodDraft) -> Result<FoodEntry> {
        let now = Utc::now();
        let food = draft.into_entry(Uuid::new_v4(), now, now)?;
        self.store.insert_food(&food).await?;
        info!(food_id = %food.id, name = %food.name, category = %food.category, "food added");
        Ok(food)
    }

    pub async fn get(&self, id: Uuid) -> Result<FoodEntry> {
        self.store
            .get_food(id)
            .await?
            .ok_or_else(|| ValidationError::FoodNotFound(id).into())
    }

    /// Replace an item's fields. The id and creation time are kept.
    pub async fn update(&self, id: Uuid, draft: FoodDraft) -> Result<FoodEntry> {
        let existing = self.get(id).await?;
        let food = draft.into_entry(id, existing.created_at, Utc::now())?;
        self.store.update_food(&food).await?;
        info!(food_id = %id, "food updated");
        Ok(food)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_food(id).await? {
            return Err(ValidationError::FoodNotFound(id).into());
        }
        info!(food_id = %id, "food deleted");
        Ok(())
    }

    /// Matching items ordered by name.
    pub async fn search(&self, query: &FoodQuery) -> Result<Vec<FoodEntry>> {
        self.store.search_foods(query).await
    }
}
