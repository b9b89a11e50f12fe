mod assignment_cmds;
mod config;
mod exercise_cmd;
mod food_cmds;
mod member_cmds;
mod overlay_cmds;
mod plan_cmds;
mod progress_cmd;
mod serve_cmd;

use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use gymdash_core::catalog::{Allergen, DietType, Difficulty, FoodCategory};
use gymdash_core::ledger::NotifyChannels;
use gymdash_core::ledger::service::DEFAULT_CONCURRENCY;
use gymdash_core::overlay::{Direction, MedicalTag};
use gymdash_core::repository::{PgStore, Store};
use gymdash_core::schedule::{DayKind, DayPreset, Weekday, WeekdaySet};
use gymdash_core::{AssignmentStatus, MembershipStatus, OverlayStatus, PlanKind};
use gymdash_db::config::DbConfig;
use gymdash_db::pool;

use config::GymdashConfig;

#[derive(Parser)]
#[command(
    name = "gymdash",
    about = "Gym back office: plans, assignments and member customization"
)]
struct Cli {
    /// Database URL (overrides GYMDASH_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a gymdash config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Writes in flight at once during bulk operations
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create and migrate the gymdash database
    DbInit,
    /// Diet and workout plan templates
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Member directory
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },
    /// Assign one or more plans to members
    Assign(AssignArgs),
    /// Inspect and edit existing assignments
    Assignment {
        #[command(subcommand)]
        command: AssignmentCommands,
    },
    /// Per-member customization of a diet assignment
    Overlay {
        #[command(subcommand)]
        command: OverlayCommands,
    },
    /// Apply weekly macro progression to every eligible overlay
    Progress {
        /// Day to run for (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Built-in exercise library
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Food catalog used to build and swap meals
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Serve the JSON API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a plan from a TOML file
    Create {
        /// Path to the plan TOML file
        file: String,
    },
    /// Show one plan, or list plans
    Show {
        /// Plan ID to show (omit to list)
        plan_id: Option<Uuid>,
        /// Only list plans of this kind
        #[arg(long)]
        kind: Option<PlanKind>,
        /// Include archived plans in the list
        #[arg(long)]
        archived: bool,
    },
    /// Copy plans under new ids with " (Copy)" appended to the name
    Duplicate {
        #[arg(required = true)]
        plan_ids: Vec<Uuid>,
    },
    /// Archive plans, or restore them with --restore
    Archive {
        #[arg(required = true)]
        plan_ids: Vec<Uuid>,
        #[arg(long)]
        restore: bool,
    },
    /// Delete plans. Their assignments are kept.
    Delete {
        #[arg(required = true)]
        plan_ids: Vec<Uuid>,
    },
    /// Export plans of one kind as CSV
    Export {
        /// Which catalog to export
        #[arg(long)]
        kind: PlanKind,
        /// Plans to export (omit for every unarchived plan of the kind)
        plan_ids: Vec<Uuid>,
        /// Output file (defaults to diet-plans-<date>.csv / workouts-<date>.csv)
        #[arg(long, conflicts_with = "stdout")]
        output: Option<String>,
        /// Write to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },
}

#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add a member to the directory
    Add {
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Photo URL
        #[arg(long)]
        photo: Option<String>,
        #[arg(long, default_value = "active")]
        status: MembershipStatus,
    },
    /// List members
    List {
        /// Match name, email or phone
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        status: Option<MembershipStatus>,
    },
}

/// Notification channel flags accepted by `--notify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifyChannel {
    Email,
    Sms,
    Whatsapp,
    InApp,
}

pub fn notify_channels(channels: &[NotifyChannel]) -> NotifyChannels {
    NotifyChannels {
        email: channels.contains(&NotifyChannel::Email),
        sms: channels.contains(&NotifyChannel::Sms),
        whatsapp: channels.contains(&NotifyChannel::Whatsapp),
        in_app: channels.contains(&NotifyChannel::InApp),
    }
}

/// Active days from `--preset` or `--days`, if either was given.
pub fn chosen_days(preset: Option<DayPreset>, days: &[Weekday]) -> Option<WeekdaySet> {
    match preset {
        Some(p) => Some(p.days()),
        None if days.is_empty() => None,
        None => Some(days.iter().copied().collect()),
    }
}

#[derive(Args)]
pub struct AssignArgs {
    /// Plans to assign
    #[arg(required = true)]
    pub plan_ids: Vec<Uuid>,
    /// Comma-separated member ids
    #[arg(long, value_delimiter = ',')]
    pub members: Vec<Uuid>,
    /// Day preset: weekdays, weekends, all, mwf, tts
    #[arg(long, conflicts_with = "days")]
    pub preset: Option<DayPreset>,
    /// Comma-separated weekdays
    #[arg(long, value_delimiter = ',')]
    pub days: Vec<Weekday>,
    /// First day (defaults to today)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last day (omit for ongoing)
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Comma-separated channels: email, sms, whatsapp, in-app
    #[arg(long, value_delimiter = ',')]
    pub notify: Vec<NotifyChannel>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum AssignmentCommands {
    /// List assignments of one kind, newest first
    List {
        #[arg(long, default_value = "diet")]
        kind: PlanKind,
        #[arg(long)]
        status: Option<AssignmentStatus>,
        /// Match member name, email or plan name
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show one assignment
    Show { assignment_id: Uuid },
    /// Change fields of an assignment
    Update {
        assignment_id: Uuid,
        #[arg(long)]
        status: Option<AssignmentStatus>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long, conflicts_with = "ongoing")]
        end: Option<NaiveDate>,
        /// Clear the end date
        #[arg(long)]
        ongoing: bool,
        #[arg(long, conflicts_with = "days")]
        preset: Option<DayPreset>,
        #[arg(long, value_delimiter = ',')]
        days: Vec<Weekday>,
        /// Replace notification channels
        #[arg(long, value_delimiter = ',')]
        notify: Option<Vec<NotifyChannel>>,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
    },
    /// Delete an assignment and its customization
    Delete { assignment_id: Uuid },
    /// Counts by status
    Stats {
        #[arg(long, default_value = "diet")]
        kind: PlanKind,
    },
}

#[derive(Subcommand)]
pub enum OverlayCommands {
    /// Show the customization of a diet assignment
    Show { assignment_id: Uuid },
    /// Mark a weekday active, rest or cheat
    SetDay {
        assignment_id: Uuid,
        day: Weekday,
        kind: DayKind,
    },
    /// Set the cycle length
    Cycle {
        assignment_id: Uuid,
        /// Two-week cycle
        #[arg(long, conflicts_with = "days")]
        biweekly: bool,
        /// Custom cycle length in days (1-365)
        #[arg(long)]
        days: Option<u16>,
    },
    /// Adjust macro targets
    Macros {
        assignment_id: Uuid,
        #[arg(long)]
        calories: Option<u32>,
        #[arg(long)]
        protein: Option<u32>,
        #[arg(long)]
        carbs: Option<u32>,
        #[arg(long)]
        fat: Option<u32>,
        /// Percentage of the plan's macros (50-150)
        #[arg(long)]
        scale: Option<u16>,
        /// Enable weekly progression in this direction
        #[arg(long, conflicts_with = "no_progression")]
        progression: Option<Direction>,
        /// Weekly change in percent (1-50)
        #[arg(long, default_value_t = 5)]
        percent_per_week: u8,
        /// Turn weekly progression off
        #[arg(long)]
        no_progression: bool,
        /// Drop existing overrides first
        #[arg(long)]
        clear: bool,
    },
    /// Replace dietary restrictions and report conflicts
    Restrict {
        assignment_id: Uuid,
        #[arg(long)]
        diet_type: Option<DietType>,
        #[arg(long, value_delimiter = ',')]
        allergies: Vec<Allergen>,
        #[arg(long, value_delimiter = ',')]
        medical: Vec<MedicalTag>,
        /// Comma-separated ingredients to avoid
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
    },
    /// Pause, resume or complete a customization
    Status {
        assignment_id: Uuid,
        status: OverlayStatus,
    },
    /// Restore plan defaults
    Reset { assignment_id: Uuid },
    /// List meal items that clash with the member's restrictions
    Conflicts { assignment_id: Uuid },
    /// Show the member's meals for one weekday
    Meals { assignment_id: Uuid, day: Weekday },
}

#[derive(Subcommand)]
pub enum FoodCommands {
    /// Add an item to the food catalog
    Add {
        name: String,
        #[arg(long)]
        category: FoodCategory,
        /// Serving the nutrition values refer to
        #[arg(long, default_value = "")]
        serving: String,
        #[arg(long)]
        calories: u32,
        #[arg(long, default_value_t = 0.0)]
        protein: f32,
        #[arg(long, default_value_t = 0.0)]
        carbs: f32,
        #[arg(long, default_value_t = 0.0)]
        fat: f32,
        #[arg(long)]
        fiber: Option<f32>,
        /// Diets the item fits (comma-separated)
        #[arg(long, value_delimiter = ',')]
        diet_types: Vec<DietType>,
        #[arg(long, value_delimiter = ',')]
        allergens: Vec<Allergen>,
    },
    /// Search the catalog by name, category and diet type
    Search {
        /// Name substring
        #[arg(default_value = "")]
        text: String,
        #[arg(long)]
        category: Option<FoodCategory>,
        #[arg(long)]
        diet_type: Option<DietType>,
    },
    /// Remove an item from the catalog
    Delete { id: Uuid },
}

#[derive(Subcommand)]
pub enum ExerciseCommands {
    /// List exercises, optionally filtered
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
}

/// Execute the `gymdash init` command: write config file.
fn cmd_init(db_url: &str, concurrency: usize, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        bulk: config::BulkSection {
            concurrency: concurrency.max(1),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  bulk.concurrency = {}", cfg.bulk.concurrency);
    println!();
    println!("Next: run `gymdash db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `gymdash db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = GymdashConfig::resolve(cli_db_url);

    println!("Initializing gymdash database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("gymdash db-init complete.");
    Ok(())
}

/// Resolve config and open the Postgres-backed store.
async fn connect(cli_db_url: Option<&str>) -> anyhow::Result<(PgPool, Arc<dyn Store>, GymdashConfig)> {
    let resolved = GymdashConfig::resolve(cli_db_url);
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let store: Arc<dyn Store> = Arc::new(PgStore::new(db_pool.clone()));
    Ok((db_pool, store, resolved))
}

/// A token cancelled on the first Ctrl+C. Bulk operations stop starting new
/// items once it fires.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; remaining items will be skipped");
            child.cancel();
        }
    });
    token
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db_url = cli.database_url.as_deref();

    match cli.command {
        Commands::Init {
            db_url,
            concurrency,
            force,
        } => {
            cmd_init(&db_url, concurrency, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(db_url).await?;
        }
        Commands::Plan { command } => {
            let (db_pool, store, resolved) = connect(db_url).await?;
            let cancel = cancel_on_ctrl_c();
            let result =
                plan_cmds::run_plan_command(command, store, resolved.bulk_concurrency, &cancel)
                    .await;
            db_pool.close().await;
            result?;
        }
        Commands::Member { command } => {
            let (db_pool, store, _) = connect(db_url).await?;
            let result = member_cmds::run_member_command(command, store).await;
            db_pool.close().await;
            result?;
        }
        Commands::Assign(args) => {
            let (db_pool, store, resolved) = connect(db_url).await?;
            let cancel = cancel_on_ctrl_c();
            let result =
                assignment_cmds::run_assign(args, store, resolved.bulk_concurrency, &cancel).await;
            db_pool.close().await;
            result?;
        }
        Commands::Assignment { command } => {
            let (db_pool, store, _) = connect(db_url).await?;
            let result = assignment_cmds::run_assignment_command(command, store).await;
            db_pool.close().await;
            result?;
        }
        Commands::Overlay { command } => {
            let (db_pool, store, _) = connect(db_url).await?;
            let result = overlay_cmds::run_overlay_command(command, store).await;
            db_pool.close().await;
            result?;
        }
        Commands::Progress { date } => {
            let (db_pool, store, _) = connect(db_url).await?;
            let today = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let result = progress_cmd::run_progress(store, today).await;
            db_pool.close().await;
            result?;
        }
        Commands::Exercise { command } => {
            exercise_cmd::run_exercise_command(command);
        }
        Commands::Food { command } => {
            let (db_pool, store, _) = connect(db_url).await?;
            let result = food_cmds::run_food_command(command, store).await;
            db_pool.close().await;
            result?;
        }
        Commands::Serve { bind, port } => {
            let (db_pool, store, _) = connect(db_url).await?;
            let result = serve_cmd::run_serve(store, &bind, port).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that touch process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn assign_parses_lists_and_presets() {
        let plan = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let cli = Cli::try_parse_from([
            "gymdash".to_string(),
            "assign".to_string(),
            plan.to_string(),
            "--members".to_string(),
            format!("{a},{b}"),
            "--preset".to_string(),
            "mwf".to_string(),
            "--notify".to_string(),
            "email,in-app".to_string(),
            "--start".to_string(),
            "2024-03-04".to_string(),
        ])
        .unwrap();
        let Commands::Assign(args) = cli.command else {
            panic!("expected assign");
        };
        assert_eq!(args.plan_ids, vec![plan]);
        assert_eq!(args.members, vec![a, b]);
        assert_eq!(
            chosen_days(args.preset, &args.days),
            Some(DayPreset::MonWedFri.days())
        );
        let notify = notify_channels(&args.notify);
        assert!(notify.email && notify.in_app && !notify.sms);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 3, 4));
    }

    #[test]
    fn preset_and_days_conflict() {
        let result = Cli::try_parse_from([
            "gymdash",
            "assign",
            "8c1b6f7e-1f0c-4a57-9d53-1b1c2b0e7a11",
            "--preset",
            "weekends",
            "--days",
            "monday",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_days_collect_into_a_set() {
        let days = [Weekday::Friday, Weekday::Monday, Weekday::Friday];
        let set = chosen_days(None, &days).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Weekday::Monday));
        assert_eq!(chosen_days(None, &[]), None);
    }
}
