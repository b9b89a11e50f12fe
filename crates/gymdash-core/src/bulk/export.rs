//! CSV export of plan rows.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::PlanKind;
use crate::catalog::{PlanDetails, PlanWithMembers};

pub const DIET_HEADER: [&str; 8] = [
    "Name",
    "Category",
    "Trainer",
    "Target Calories",
    "Protein",
    "Carbs",
    "Fat",
    "Members",
];

pub const WORKOUT_HEADER: [&str; 7] = [
    "Name",
    "Body Part",
    "Difficulty",
    "Duration",
    "Trainer",
    "Exercises",
    "Members Assigned",
];

#[derive(Debug, Clone, Serialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
    pub rows: usize,
}

/// `diet-plans-2024-05-01.csv` or `workouts-2024-05-01.csv`.
pub fn export_file_name(kind: PlanKind, date: NaiveDate) -> String {
    let entity = match kind {
        PlanKind::Diet => "diet-plans",
        PlanKind::Workout => "workouts",
    };
    format!("{entity}-{}.csv", date.format("%Y-%m-%d"))
}

fn row(entry: &PlanWithMembers) -> Vec<String> {
    let plan = &entry.plan;
    let trainer = plan.trainer.clone().unwrap_or_default();
    let members = entry.member_ids.len().to_string();
    match &plan.details {
        PlanDetails::Diet(d) => vec![
            plan.name.clone(),
            plan.goal.to_string(),
            trainer,
            d.target_calories.to_string(),
            d.macros.protein.to_string(),
            d.macros.carbs.to_string(),
            d.macros.fat.to_string(),
            members,
        ],
        PlanDetails::Workout(w) => vec![
            plan.name.clone(),
            w.body_part.clone(),
            w.difficulty.to_string(),
            format!("{} min", w.duration_minutes),
            trainer,
            w.exercises.len().to_string(),
            members,
        ],
    }
}

/// Render plans of `kind` as CSV. Plans of the other kind are skipped.
/// Fields are quoted only where needed.
pub fn plans_to_csv(kind: PlanKind, plans: &[PlanWithMembers], date: NaiveDate) -> Result<CsvExport> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);

    match kind {
        PlanKind::Diet => wtr.write_record(DIET_HEADER),
        PlanKind::Workout => wtr.write_record(WORKOUT_HEADER),
    }
    .context("failed to write CSV header")?;

    let mut rows = 0;
    for entry in plans.iter().filter(|p| p.plan.kind() == kind) {
        wtr.write_record(row(entry))
            .with_context(|| format!("failed to write CSV row for plan {}", entry.plan.id))?;
        rows += 1;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    let content = String::from_utf8(bytes).context("CSV output is not UTF-8")?;

    Ok(CsvExport {
        file_name: export_file_name(kind, date),
        content,
        rows,
    })
}
