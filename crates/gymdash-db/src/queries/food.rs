//! Database query functions for the `food_catalog` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::FoodRow;

/// Parameters for inserting or replacing a food item.
#[derive(Debug, Clone)]
pub struct NewFood {
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
}

/// Search filters. `None` leaves that column unconstrained.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoodFilter<'a> {
    /// Case-insensitive substring of the name.
    pub name: Option<&'a str>,
    pub category: Option<&'a str>,
    /// Only items tagged with this diet type.
    pub diet_type: Option<&'a str>,
}

/// `%text%` with LIKE metacharacters escaped.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn insert_food(pool: &PgPool, new: &NewFood) -> Result<FoodRow> {
    let food = sqlx::query_as::<_, FoodRow>(
        "INSERT INTO food_catalog \
             (id, name, category, serving_size, calories, protein, carbs, fat, fiber, \
              diet_types, allergens) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING *",
    )
    .bind(new.id)
    .bind(&new.name)
    .bind(&new.category)
    .bind(&new.serving_size)
    .bind(new.calories)
    .bind(new.protein)
    .bind(new.carbs)
    .bind(new.fat)
    .bind(new.fiber)
    .bind(&new.diet_types)
    .bind(&new.allergens)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert food {:?}", new.name))?;

    Ok(food)
}

pub async fn get_food(pool: &PgPool, id: Uuid) -> Result<Option<FoodRow>> {
    let food = sqlx::query_as::<_, FoodRow>("SELECT * FROM food_catalog WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch food")?;

    Ok(food)
}

/// Replace every editable column. Returns `None` when the id is unknown.
pub async fn update_food(pool: &PgPool, food: &NewFood) -> Result<Option<FoodRow>> {
    let row = sqlx::query_as::<_, FoodRow>(
        "UPDATE food_catalog \
         SET name = $2, category = $3, serving_size = $4, calories = $5, protein = $6, \
             carbs = $7, fat = $8, fiber = $9, diet_types = $10, allergens = $11, \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(food.id)
    .bind(&food.name)
    .bind(&food.category)
    .bind(&food.serving_size)
    .bind(food.calories)
    .bind(food.protein)
    .bind(food.carbs)
    .bind(food.fat)
    .bind(food.fiber)
    .bind(&food.diet_types)
    .bind(&food.allergens)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update food {}", food.id))?;

    Ok(row)
}

/// Returns `false` when no row matched.
pub async fn delete_food(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM food_catalog WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete food {id}"))?;

    Ok(result.rows_affected() > 0)
}

/// Items matching every filter, ordered by name.
pub async fn search_foods(pool: &PgPool, filter: FoodFilter<'_>) -> Result<Vec<FoodRow>> {
    let foods = sqlx::query_as::<_, FoodRow>(
        "SELECT * FROM food_catalog \
         WHERE ($1::text IS NULL OR name ILIKE $1) \
           AND ($2::text IS NULL OR category = $2) \
           AND ($3::text IS NULL OR $3 = ANY(diet_types)) \
         ORDER BY name ASC, created_at ASC",
    )
    .bind(filter.name.map(contains_pattern))
    .bind(filter.category)
    .bind(filter.diet_type)
    .fetch_all(pool)
    .await
    .context("failed to search food catalog")?;

    Ok(foods)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("oat"), "%oat%");
        assert_eq!(contains_pattern("100%_whey"), "%100\\%\\_whey%");
    }
}
