//! CLI handlers for `gymdash assign` and `gymdash assignment` subcommands.

use std::sync::Arc;

use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use gymdash_core::bulk::{AssignRequest, BulkCoordinator};
use gymdash_core::catalog::PlanCatalog;
use gymdash_core::ledger::{AssignmentFilter, AssignmentLedger, AssignmentPatch, AssignmentView};
use gymdash_core::repository::Store;

use crate::plan_cmds::print_bulk_report;
use crate::{AssignArgs, AssignmentCommands, chosen_days, notify_channels};

// -----------------------------------------------------------------------
// gymdash assign
// -----------------------------------------------------------------------

/// Assign every listed plan to every listed member.
///
/// Without `--preset` or `--days` a single plan's default days are used.
pub async fn run_assign(
    args: AssignArgs,
    store: Arc<dyn Store>,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Result<()> {
    let active_days = match chosen_days(args.preset, &args.days) {
        Some(days) => days,
        None => match args.plan_ids.as_slice() {
            [only] => {
                PlanCatalog::new(Arc::clone(&store))
                    .get(*only)
                    .await?
                    .default_active_days
            }
            _ => bail!("pass --preset or --days when assigning several plans"),
        },
    };

    let request = AssignRequest {
        member_ids: args.members,
        start_date: args
            .start
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        end_date: args.end,
        active_days,
        notify: notify_channels(&args.notify),
        notes: args.notes,
    };

    let report = BulkCoordinator::new(store)
        .with_concurrency(concurrency)
        .assign(&args.plan_ids, &request, cancel)
        .await?;

    print_bulk_report("Assigned", &report);
    for id in report.succeeded() {
        println!("  + {id}");
    }
    Ok(())
}

// -----------------------------------------------------------------------
// gymdash assignment ...
// -----------------------------------------------------------------------

pub async fn run_assignment_command(command: AssignmentCommands, store: Arc<dyn Store>) -> Result<()> {
    let ledger = AssignmentLedger::new(store);

    match command {
        AssignmentCommands::List {
            kind,
            status,
            search,
        } => {
            let views = ledger.list(kind, &AssignmentFilter { status, search }).await?;
            print_table(&views);
            Ok(())
        }
        AssignmentCommands::Show { assignment_id } => cmd_show(&ledger, assignment_id).await,
        AssignmentCommands::Update {
            assignment_id,
            status,
            start,
            end,
            ongoing,
            preset,
            days,
            notify,
            notes,
            clear_notes,
        } => {
            let patch = AssignmentPatch {
                status,
                start_date: start,
                end_date: if ongoing { Some(None) } else { end.map(Some) },
                active_days: chosen_days(preset, &days),
                notify: notify.as_deref().map(notify_channels),
                notes: if clear_notes { Some(None) } else { notes.map(Some) },
            };
            if patch.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            let updated = ledger.update(assignment_id, patch).await?;
            println!(
                "Assignment {} updated: {} {} to {} on {}",
                updated.id,
                updated.status,
                updated.start_date,
                updated.date_range().end_label(),
                updated.schedule_label()
            );
            Ok(())
        }
        AssignmentCommands::Delete { assignment_id } => {
            ledger.delete(assignment_id).await?;
            println!("Assignment {assignment_id} deleted.");
            Ok(())
        }
        AssignmentCommands::Stats { kind } => {
            let stats = ledger.stats(kind).await?;
            println!("{kind} assignments");
            println!("  Total:      {}", stats.total);
            println!("  Active:     {}", stats.active);
            println!("  Completed:  {}", stats.completed);
            println!("  Cancelled:  {}", stats.cancelled);
            Ok(())
        }
    }
}

fn print_table(views: &[AssignmentView]) {
    if views.is_empty() {
        println!("No assignments found.");
        return;
    }

    let member_w = views.iter().map(|v| v.member_name.len()).max().unwrap_or(6).max(6);
    let plan_w = views.iter().map(|v| v.plan_name.len()).max().unwrap_or(4).max(4);

    println!(
        "{:<36}  {:<member_w$}  {:<plan_w$}  {:<9}  {:<10}  {:<10}  DAYS",
        "ID", "MEMBER", "PLAN", "STATUS", "START", "END",
    );
    for v in views {
        let a = &v.assignment;
        println!(
            "{:<36}  {:<member_w$}  {:<plan_w$}  {:<9}  {:<10}  {:<10}  {}",
            a.id,
            v.member_name,
            v.plan_name,
            a.status.to_string(),
            a.start_date.to_string(),
            a.date_range().end_label(),
            a.schedule_label(),
        );
    }
}

async fn cmd_show(ledger: &AssignmentLedger, id: Uuid) -> Result<()> {
    let a = ledger.get(id).await?;
    let notify = a.notify.labels();

    println!("Assignment {}", a.id);
    println!("  Member:   {}", a.member_id);
    println!("  Plan:     {} ({})", a.plan_id, a.plan_kind);
    println!("  Status:   {}", a.status);
    println!("  Dates:    {} to {}", a.start_date, a.date_range().end_label());
    println!("  Days:     {}", a.schedule_label());
    println!(
        "  Notify:   {}",
        if notify.is_empty() {
            "none".to_owned()
        } else {
            notify.join(", ")
        }
    );
    if let Some(notes) = &a.notes {
        println!("  Notes:    {notes}");
    }
    if a.date_range().is_inverted() {
        println!();
        println!("Warning: end date is before start date.");
    }
    Ok(())
}
