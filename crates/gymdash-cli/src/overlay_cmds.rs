//! CLI handlers for `gymdash overlay` subcommands.

use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use gymdash_core::overlay::{
    Conflict, ConflictReason, CustomizationOverlay, MacroOverrides, OverlayService, Progression,
    Restrictions, ScalePercentage,
};
use gymdash_core::repository::Store;
use gymdash_core::schedule::{CyclePattern, DayKind, Weekday};

use crate::OverlayCommands;

pub async fn run_overlay_command(command: OverlayCommands, store: Arc<dyn Store>) -> Result<()> {
    let service = OverlayService::new(store);

    match command {
        OverlayCommands::Show { assignment_id } => cmd_show(&service, assignment_id).await,
        OverlayCommands::SetDay {
            assignment_id,
            day,
            kind,
        } => {
            let overlay = service.set_day_kind(assignment_id, day, kind).await?;
            print_schedule(&overlay);
            Ok(())
        }
        OverlayCommands::Cycle {
            assignment_id,
            biweekly,
            days,
        } => {
            let cycle = match (biweekly, days) {
                (true, _) => CyclePattern::BiWeekly,
                (false, Some(n)) => CyclePattern::custom(n)?,
                (false, None) => CyclePattern::Weekly,
            };
            service.set_cycle(assignment_id, cycle).await?;
            println!("Cycle set to {} days.", cycle.length_days());
            Ok(())
        }
        OverlayCommands::Macros {
            assignment_id,
            calories,
            protein,
            carbs,
            fat,
            scale,
            progression,
            percent_per_week,
            no_progression,
            clear,
        } => {
            let current = service.view(assignment_id).await?;
            let mut macros = if clear {
                MacroOverrides::default()
            } else {
                current.macros
            };
            if calories.is_some() {
                macros.calories = calories;
            }
            if protein.is_some() {
                macros.protein = protein;
            }
            if carbs.is_some() {
                macros.carbs = carbs;
            }
            if fat.is_some() {
                macros.fat = fat;
            }
            if let Some(s) = scale {
                macros.scale = ScalePercentage::new(s)?;
            }
            if let Some(direction) = progression {
                macros.progression = Progression::new(direction, percent_per_week)?;
            }
            if no_progression {
                macros.progression.enabled = false;
            }

            service.set_macros(assignment_id, macros).await?;
            print_macros(&service, assignment_id).await
        }
        OverlayCommands::Restrict {
            assignment_id,
            diet_type,
            allergies,
            medical,
            exclude,
        } => {
            let restrictions = Restrictions {
                diet_type,
                allergies: allergies.into_iter().collect(),
                medical_tags: medical.into_iter().collect(),
                excluded_ingredients: exclude
                    .into_iter()
                    .map(|s| s.trim().to_owned())
                    .filter(|s| !s.is_empty())
                    .collect(),
            };
            service.set_restrictions(assignment_id, restrictions).await?;
            println!("Restrictions saved.");
            print_conflicts(&service.conflicts(assignment_id).await?);
            Ok(())
        }
        OverlayCommands::Status {
            assignment_id,
            status,
        } => {
            service.set_status(assignment_id, status).await?;
            println!("Customization for {assignment_id} is now {status}.");
            Ok(())
        }
        OverlayCommands::Reset { assignment_id } => {
            let overlay = service.reset(assignment_id).await?;
            println!("Customization reset to plan defaults.");
            print_schedule(&overlay);
            Ok(())
        }
        OverlayCommands::Conflicts { assignment_id } => {
            print_conflicts(&service.conflicts(assignment_id).await?);
            Ok(())
        }
        OverlayCommands::Meals { assignment_id, day } => {
            let overlay = service.view(assignment_id).await?;
            let kind = overlay.schedule.days.kind_of(day);
            let meals = service.day_meals(assignment_id, day).await?;
            println!("{day} ({kind} day)");
            if meals.is_empty() {
                println!("  no meals");
            }
            for meal in &meals {
                let kcal: u32 = meal.items.iter().map(|i| i.calories).sum();
                println!("  {} ({kcal} kcal)", meal.time);
                for item in &meal.items {
                    println!("    - {} ({})", item.name, item.quantity);
                }
            }
            Ok(())
        }
    }
}

async fn cmd_show(service: &OverlayService, assignment_id: Uuid) -> Result<()> {
    let overlay = service.view(assignment_id).await?;

    println!("Customization for assignment {}", overlay.assignment_id);
    println!("  Member:   {}", overlay.member_id);
    println!("  Plan:     {}", overlay.base_plan_id);
    println!("  Status:   {}", overlay.status);
    if let Some(notes) = &overlay.notes {
        println!("  Notes:    {notes}");
    }
    println!();
    print_schedule(&overlay);
    println!();
    print_macros(service, assignment_id).await?;

    let r = &overlay.restrictions;
    println!();
    println!("Restrictions:");
    println!(
        "  Diet type:  {}",
        r.diet_type.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
    );
    println!("  Allergies:  {}", join_or_dash(r.allergies.iter()));
    println!("  Medical:    {}", join_or_dash(r.medical_tags.iter()));
    println!("  Excluded:   {}", join_or_dash(r.excluded_ingredients.iter()));

    if !overlay.meal_overrides.is_empty() {
        println!();
        println!("Meal overrides:");
        for ov in &overlay.meal_overrides {
            if ov.removed {
                println!("  {} {}: removed", ov.day.short_label(), ov.meal);
            } else {
                println!("  {} {}: {} items", ov.day.short_label(), ov.meal, ov.items.len());
            }
        }
    }
    Ok(())
}

fn join_or_dash<T: ToString>(items: impl Iterator<Item = T>) -> String {
    let parts: Vec<String> = items.map(|t| t.to_string()).collect();
    if parts.is_empty() {
        "-".to_owned()
    } else {
        parts.join(", ")
    }
}

fn print_schedule(overlay: &CustomizationOverlay) {
    let days = &overlay.schedule.days;
    println!(
        "Schedule ({}-day cycle):",
        overlay.schedule.cycle.length_days()
    );
    for day in Weekday::DISPLAY_ORDER {
        let marker = match days.kind_of(day) {
            DayKind::Active => "active",
            DayKind::Rest => "rest",
            DayKind::Cheat => "cheat",
        };
        println!("  {:<4} {marker}", day.short_label());
    }
}

async fn print_macros(service: &OverlayService, assignment_id: Uuid) -> Result<()> {
    let m = service.effective_macros(assignment_id).await?;
    let overlay = service.view(assignment_id).await?;
    let p = overlay.macros.progression;

    println!("Macros (scale {}%):", overlay.macros.scale.get());
    println!("  {:<9} {:>6}  {:>9}", "", "PLAN", "MEMBER");
    for (label, base, eff) in [
        ("calories", m.base.calories, m.effective.calories),
        ("protein", m.base.protein, m.effective.protein),
        ("carbs", m.base.carbs, m.effective.carbs),
        ("fat", m.base.fat, m.effective.fat),
    ] {
        println!("  {label:<9} {base:>6}  {eff:>9}");
    }
    if p.enabled {
        println!(
            "  progression: {} {}% per week, {} weeks applied",
            p.direction, p.percent_per_week, overlay.weeks_applied
        );
    }
    Ok(())
}

fn print_conflicts(conflicts: &[Conflict]) {
    if conflicts.is_empty() {
        println!("No conflicts with the plan's meals.");
        return;
    }
    println!("Conflicts ({}):", conflicts.len());
    for c in conflicts {
        let why = match &c.reason {
            ConflictReason::Allergen { allergen } => format!("contains {allergen}"),
            ConflictReason::ExcludedIngredient { ingredient } => {
                format!("excluded ingredient {ingredient:?}")
            }
            ConflictReason::DietType { diet_type } => format!("not {diet_type}"),
        };
        println!("  {} / {}: {why}", c.meal, c.item);
    }
}

