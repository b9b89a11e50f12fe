//! CLI handlers for `gymdash plan` subcommands.
//!
//! - `gymdash plan create <file>`   create a plan from a TOML file
//! - `gymdash plan show [plan-id]`  show one plan or list plans
//! - `gymdash plan duplicate|archive|delete <ids..>`  bulk plan operations
//! - `gymdash plan export --kind <kind> [ids..]`       CSV export

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use gymdash_core::PlanKind;
use gymdash_core::bulk::{BulkCoordinator, BulkReport};
use gymdash_core::catalog::{PlanCatalog, PlanDetails, PlanWithMembers};
use gymdash_core::repository::Store;
use gymdash_core::schedule::describe_active_days;

use crate::PlanCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

pub async fn run_plan_command(
    command: PlanCommands,
    store: Arc<dyn Store>,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Result<()> {
    let catalog = PlanCatalog::new(Arc::clone(&store));
    let bulk = BulkCoordinator::new(store).with_concurrency(concurrency);

    match command {
        PlanCommands::Create { file } => cmd_create(&catalog, &file).await,
        PlanCommands::Show {
            plan_id,
            kind,
            archived,
        } => match plan_id {
            Some(id) => cmd_show_one(&catalog, id).await,
            None => cmd_show_all(&catalog, kind, archived).await,
        },
        PlanCommands::Duplicate { plan_ids } => {
            let report = bulk.duplicate(&plan_ids, cancel).await;
            print_bulk_report("Duplicated", &report);
            Ok(())
        }
        PlanCommands::Archive { plan_ids, restore } => {
            let report = bulk.archive(&plan_ids, !restore, cancel).await;
            print_bulk_report(if restore { "Restored" } else { "Archived" }, &report);
            Ok(())
        }
        PlanCommands::Delete { plan_ids } => {
            let report = bulk.delete(&plan_ids, cancel).await;
            print_bulk_report("Deleted", &report);
            Ok(())
        }
        PlanCommands::Export {
            kind,
            plan_ids,
            output,
            stdout,
        } => cmd_export(&catalog, &bulk, kind, plan_ids, output, stdout).await,
    }
}

/// Print a one-line summary followed by each failure and warning.
pub fn print_bulk_report(verb: &str, report: &BulkReport) {
    println!("{verb}: {}", report.summary());
    for (subject, err) in report.failures() {
        println!("  ! {subject}: {err}");
    }
    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &report.warnings {
            println!("  - {w}");
        }
    }
}

// -----------------------------------------------------------------------
// gymdash plan create <file>
// -----------------------------------------------------------------------

async fn cmd_create(catalog: &PlanCatalog, file_path: &str) -> Result<()> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read plan file: {file_path}"))?;

    let plan = catalog
        .create_from_toml(&content)
        .await
        .with_context(|| format!("failed to create plan from {file_path}"))?;

    println!("Plan created successfully.");
    println!();
    println!("  Plan ID:  {}", plan.id);
    println!("  Name:     {}", plan.name);
    println!("  Kind:     {}", plan.kind());
    println!("  Goal:     {}", plan.goal);
    println!("  Days:     {}", describe_active_days(plan.default_active_days));
    match &plan.details {
        PlanDetails::Diet(d) => println!("  Meals:    {}", d.meals.len()),
        PlanDetails::Workout(w) => println!("  Exercises: {}", w.exercises.len()),
    }

    Ok(())
}

// -----------------------------------------------------------------------
// gymdash plan show (list)
// -----------------------------------------------------------------------

async fn cmd_show_all(catalog: &PlanCatalog, kind: Option<PlanKind>, archived: bool) -> Result<()> {
    let kinds = match kind {
        Some(k) => vec![k],
        None => vec![PlanKind::Diet, PlanKind::Workout],
    };
    let mut plans: Vec<PlanWithMembers> = Vec::new();
    for k in kinds {
        plans.extend(catalog.list(k, archived).await?);
    }

    if plans.is_empty() {
        println!("No plans found. Use `gymdash plan create <file>` to create one.");
        return Ok(());
    }

    let id_w = 36;
    let name_w = plans
        .iter()
        .map(|p| p.plan.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let kind_w = 7;
    let goal_w = 15;

    println!(
        "{:<id_w$}  {:<name_w$}  {:<kind_w$}  {:<goal_w$}  {:>7}  DAYS",
        "ID", "NAME", "KIND", "GOAL", "MEMBERS",
    );
    for entry in &plans {
        let plan = &entry.plan;
        let name = if plan.archived {
            format!("{} [archived]", plan.name)
        } else {
            plan.name.clone()
        };
        println!(
            "{:<id_w$}  {:<name_w$}  {:<kind_w$}  {:<goal_w$}  {:>7}  {}",
            plan.id,
            name,
            plan.kind(),
            plan.goal,
            entry.member_ids.len(),
            describe_active_days(plan.default_active_days),
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// gymdash plan show <plan-id>
// -----------------------------------------------------------------------

async fn cmd_show_one(catalog: &PlanCatalog, id: Uuid) -> Result<()> {
    let PlanWithMembers { plan, member_ids } = catalog.get_with_members(id).await?;

    println!("Plan: {}", plan.name);
    println!("  ID:        {}", plan.id);
    println!("  Kind:      {}", plan.kind());
    println!("  Goal:      {}", plan.goal);
    println!("  Trainer:   {}", plan.trainer.as_deref().unwrap_or("-"));
    println!("  Days:      {}", describe_active_days(plan.default_active_days));
    println!("  Archived:  {}", plan.archived);
    println!("  Created:   {}", plan.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Updated:   {}", plan.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));

    match &plan.details {
        PlanDetails::Diet(d) => {
            println!("  Diet type: {}", d.diet_type);
            println!("  Target:    {} kcal", d.target_calories);
            println!(
                "  Macros:    {} kcal, {}g protein, {}g carbs, {}g fat",
                d.macros.calories, d.macros.protein, d.macros.carbs, d.macros.fat
            );
            println!();
            println!("Meals ({}):", d.meals.len());
            for meal in &d.meals {
                println!("  {}", meal.time);
                for item in &meal.items {
                    println!(
                        "    - {} ({}) {} kcal",
                        item.name, item.quantity, item.calories
                    );
                }
            }
        }
        PlanDetails::Workout(w) => {
            println!("  Body part: {}", w.body_part);
            println!("  Level:     {}", w.difficulty);
            println!("  Duration:  {} min", w.duration_minutes);
            println!();
            println!("Exercises ({}):", w.exercises.len());
            for ex in &w.exercises {
                println!(
                    "  - {}: {} x {} (rest {}s)",
                    ex.name, ex.sets, ex.reps, ex.rest_seconds
                );
            }
        }
    }

    println!();
    println!("Members assigned: {}", member_ids.len());
    for m in &member_ids {
        println!("  {m}");
    }

    Ok(())
}

// -----------------------------------------------------------------------
// gymdash plan export
// -----------------------------------------------------------------------

async fn cmd_export(
    catalog: &PlanCatalog,
    bulk: &BulkCoordinator,
    kind: PlanKind,
    plan_ids: Vec<Uuid>,
    output: Option<String>,
    stdout: bool,
) -> Result<()> {
    let plan_ids = if plan_ids.is_empty() {
        catalog
            .list(kind, false)
            .await?
            .into_iter()
            .map(|p| p.plan.id)
            .collect()
    } else {
        plan_ids
    };

    let today = chrono::Local::now().date_naive();
    let export = bulk.export(kind, &plan_ids, today).await?;

    if stdout {
        std::io::stdout()
            .lock()
            .write_all(export.content.as_bytes())
            .context("failed to write CSV to stdout")?;
        return Ok(());
    }

    let path = output.unwrap_or_else(|| export.file_name.clone());
    std::fs::write(&path, &export.content)
        .with_context(|| format!("cannot write output file: {path}"))?;
    println!("Exported {} rows to {path}", export.rows);

    Ok(())
}
