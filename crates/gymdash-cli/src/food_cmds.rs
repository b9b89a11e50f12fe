//! CLI handlers for `gymdash food` subcommands.

use std::sync::Arc;

use anyhow::Result;

use gymdash_core::catalog::{FoodCatalog, FoodDraft, FoodEntry, FoodQuery};
use gymdash_core::repository::Store;

use crate::FoodCommands;

pub async fn run_food_command(command: FoodCommands, store: Arc<dyn Store>) -> Result<()> {
    let catalog = FoodCatalog::new(store);

    match command {
        FoodCommands::Add {
            name,
            category,
            serving,
            calories,
            protein,
            carbs,
            fat,
            fiber,
            diet_types,
            allergens,
        } => {
            let food = catalog
                .create(FoodDraft {
                    name,
                    category,
                    serving_size: serving,
                    calories,
                    protein,
                    carbs,
                    fat,
                    fiber,
                    diet_types: diet_types.into_iter().collect(),
                    allergens: allergens.into_iter().collect(),
                })
                .await?;
            println!("Food ID: {}", food.id);
            println!(
                "  {} ({}, {} kcal per {})",
                food.name, food.category, food.calories, food.serving_size
            );
            Ok(())
        }
        FoodCommands::Search {
            text,
            category,
            diet_type,
        } => {
            let query = FoodQuery {
                text: Some(text),
                category,
                diet_type,
            };
            print_foods(&catalog.search(&query).await?);
            Ok(())
        }
        FoodCommands::Delete { id } => {
            catalog.delete(id).await?;
            println!("Food {id} deleted.");
            Ok(())
        }
    }
}

fn print_foods(foods: &[FoodEntry]) {
    if foods.is_empty() {
        println!("No food items found.");
        return;
    }
    let name_w = foods.iter().map(|f| f.name.len()).max().unwrap_or(4).max(4);
    println!(
        "{:<36}  {:<name_w$}  {:<10}  {:>5}  {:>6}  {:>6}  {:>6}  SERVING",
        "ID", "NAME", "CATEGORY", "KCAL", "P", "C", "F"
    );
    for f in foods {
        println!(
            "{:<36}  {:<name_w$}  {:<10}  {:>5}  {:>6.1}  {:>6.1}  {:>6.1}  {}",
            f.id,
            f.name,
            f.category.as_str(),
            f.calories,
            f.protein,
            f.carbs,
            f.fat,
            f.serving_size
        );
    }
}
