//! Food catalog through the service.

mod common;

use std::sync::Arc;

use gymdash_core::catalog::{Allergen, DietType, FoodCatalog, FoodCategory, FoodQuery, MealTime};
use gymdash_core::error::ValidationError;
use gymdash_core::ledger::{AssignmentLedger, NewAssignmentBatch, NotifyChannels};
use gymdash_core::overlay::{MealOverride, OverlayService};
use gymdash_core::schedule::{Weekday, WeekdaySet};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use common::*;

fn names(foods: &[gymdash_core::catalog::FoodEntry]) -> Vec<&str> {
    foods.iter().map(|f| f.name.as_str()).collect()
}

#[tokio::test]
async fn search_filters_by_text_category_and_diet() {
    let store = memory_store();
    let catalog = FoodCatalog::new(Arc::clone(&store));
    for draft in [
        food_draft("Tofu", FoodCategory::Protein, &[DietType::Vegan, DietType::Vegetarian]),
        food_draft("Grilled Chicken", FoodCategory::Protein, &[DietType::NonVegetarian]),
        food_draft("Greek Yogurt", FoodCategory::Dairy, &[DietType::Vegetarian]),
        food_draft("Brown Rice", FoodCategory::Carbs, &[]),
    ] {
        catalog.create(draft).await.unwrap();
    }

    let all = catalog.search(&FoodQuery::default()).await.unwrap();
    assert_eq!(
        names(&all),
        vec!["Brown Rice", "Greek Yogurt", "Grilled Chicken", "Tofu"]
    );

    let gr = FoodQuery {
        text: Some("gr".into()),
        ..Default::default()
    };
    assert_eq!(
        names(&catalog.search(&gr).await.unwrap()),
        vec!["Greek Yogurt", "Grilled Chicken"]
    );

    let veg_protein = FoodQuery {
        category: Some(FoodCategory::Protein),
        diet_type: Some(DietType::Vegetarian),
        ..Default::default()
    };
    assert_eq!(names(&catalog.search(&veg_protein).await.unwrap()), vec!["Tofu"]);
}

#[tokio::test]
async fn update_keeps_identity_and_delete_reports_missing() {
    let store = memory_store();
    let catalog = FoodCatalog::new(Arc::clone(&store));
    let oats = catalog
        .create(food_draft("Oats", FoodCategory::Carbs, &[]))
        .await
        .unwrap();

    let mut edit = food_draft("Rolled Oats", FoodCategory::Carbs, &[DietType::Vegan]);
    edit.allergens.insert(Allergen::Gluten);
    let updated = catalog.update(oats.id, edit).await.unwrap();
    assert_eq!(updated.id, oats.id);
    assert_eq!(updated.created_at, oats.created_at);
    assert_eq!(catalog.get(oats.id).await.unwrap().name, "Rolled Oats");

    let blank = catalog
        .update(oats.id, food_draft(" ", FoodCategory::Carbs, &[]))
        .await
        .unwrap_err();
    assert_eq!(
        blank.downcast_ref::<ValidationError>(),
        Some(&ValidationError::BlankFoodName)
    );

    catalog.delete(oats.id).await.unwrap();
    let err = catalog.delete(oats.id).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::FoodNotFound(oats.id))
    );
    let stranger = Uuid::new_v4();
    let err = catalog
        .update(stranger, food_draft("Ghost", FoodCategory::Snacks, &[]))
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::FoodNotFound(stranger))
    );
}

#[tokio::test]
async fn catalog_item_can_replace_a_meal() {
    let store = memory_store();
    let plan = add_plan(&store, diet_plan("Cut")).await;
    let member = add_member(&store, "Tess").await;
    let report = AssignmentLedger::new(Arc::clone(&store))
        .create_batch(
            NewAssignmentBatch {
                member_ids: vec![member.id],
                plan_id: plan.id,
                start_date: date(2024, 1, 1),
                end_date: None,
                active_days: WeekdaySet::ALL,
                notify: NotifyChannels::default(),
                notes: None,
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let id = report.succeeded().next().unwrap();

    let yogurt = FoodCatalog::new(Arc::clone(&store))
        .create(food_draft("Greek Yogurt", FoodCategory::Dairy, &[DietType::Vegetarian]))
        .await
        .unwrap();

    let overlays = OverlayService::new(Arc::clone(&store));
    overlays
        .set_meal_override(
            id,
            MealOverride {
                day: Weekday::Wednesday,
                meal: MealTime::Breakfast,
                items: vec![yogurt.to_item(Some("250 g"))],
                removed: false,
            },
        )
        .await
        .unwrap();

    let wednesday = overlays.day_meals(id, Weekday::Wednesday).await.unwrap();
    assert_eq!(wednesday[0].items[0].name, "Greek Yogurt");
    assert_eq!(wednesday[0].items[0].quantity, "250 g");
    assert_eq!(wednesday[0].items[0].calories, 120);
}
