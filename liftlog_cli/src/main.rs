use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use clap::{Parser, Subcommand};
use liftlog_core::advisor::fmt_weight;
use liftlog_core::service::{self, Dashboard};
use liftlog_core::*;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Training analytics for your lifting log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User whose data to analyze
    #[arg(long, global = true)]
    user: Option<String>,

    /// Evaluate as of this RFC 3339 timestamp; its offset defines the local day
    #[arg(long, global = true)]
    now: Option<String>,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show streak, week, PRs and balance (default)
    Dashboard,

    /// Current consecutive-day streak
    Streak,

    /// This week's days, sets and volume
    Week,

    /// Recent personal records
    Prs {
        /// Trailing window in days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Sets per muscle group
    Balance {
        /// Trailing window in days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Suggest the next weight/reps for an exercise
    Suggest {
        exercise: String,

        /// hypertrophy, strength or mixed
        #[arg(long)]
        style: Option<String>,
    },

    /// Manage exercises
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },

    /// Start or finish a workout session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Log a set
    Log {
        session: Uuid,
        exercise: String,

        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,

        /// warmup, working or dropset
        #[arg(long, default_value = "working")]
        role: String,

        /// Flag the set as a personal record
        #[arg(long)]
        pr: bool,
    },

    /// Roll the set log up into the CSV archive
    Rollup {
        /// Remove processed logs after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommands {
    /// Add or redefine an exercise
    Add {
        id: String,
        name: String,

        #[arg(long)]
        muscle: String,

        #[arg(long, default_value = "other")]
        equipment: String,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Start a session and print its id
    Start {
        /// Split label (push, pull, legs, ...)
        #[arg(long)]
        split: Option<String>,
    },

    /// Mark a session as finished
    Finish { id: Uuid },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    liftlog_core::logging::init(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(user) = cli.user.clone() {
        config.user.id = user;
    }

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let store = JsonlStore::new(data_dir);
    let command = cli.command.unwrap_or(Commands::Dashboard);

    // An explicit --now pins its offset; otherwise each instant gets the
    // local offset in effect at that instant
    match cli.now.as_deref() {
        Some(s) => run(command, &store, &config, parse_now(s)?),
        None => run(command, &store, &config, Local::now()),
    }
}

fn run<Tz: TimeZone>(
    command: Commands,
    store: &JsonlStore,
    config: &Config,
    now: DateTime<Tz>,
) -> Result<()> {
    let user_id = config.user.id.as_str();

    match command {
        Commands::Dashboard => {
            let dashboard = service::load_dashboard(store, config, &now);
            print_dashboard(dashboard, config);
            Ok(())
        }
        Commands::Streak => {
            let streak = service::load_streak(store, user_id, &now);
            print_streak(or_empty(streak));
            Ok(())
        }
        Commands::Week => {
            let week = service::load_weekly_summary(store, user_id, &now);
            print_week(&or_empty(week));
            Ok(())
        }
        Commands::Prs { days } => {
            let days = days.unwrap_or(config.analytics.pr_window_days);
            let prs = service::load_recent_prs(store, user_id, days, &now);
            print_prs(&or_empty(prs), days);
            Ok(())
        }
        Commands::Balance { days } => {
            let days = days.unwrap_or(config.analytics.balance_window_days);
            let balance = service::load_muscle_balance(store, user_id, days, &now);
            print_balance(&or_empty(balance), days);
            Ok(())
        }
        Commands::Suggest { exercise, style } => cmd_suggest(store, config, &exercise, style),
        Commands::Exercise {
            command:
                ExerciseCommands::Add {
                    id,
                    name,
                    muscle,
                    equipment,
                },
        } => {
            let exercise = Exercise {
                id,
                name,
                muscle_group: muscle.parse()?,
                equipment: equipment.parse()?,
            };
            store.add_exercise(&exercise)?;
            println!("✓ Exercise {} saved ({})", exercise.id, exercise.muscle_group);
            Ok(())
        }
        Commands::Session { command } => {
            cmd_session(store, config, command, now.with_timezone(&Utc))
        }
        Commands::Log {
            session,
            exercise,
            weight,
            reps,
            role,
            pr,
        } => {
            if store.find_session(session)?.is_none() {
                return Err(Error::Other(format!("Unknown session: {}", session)));
            }
            let set = LoggedSet {
                id: Uuid::new_v4(),
                session_id: session,
                exercise_id: exercise,
                weight,
                reps,
                role: role.parse()?,
                is_pr: pr,
                logged_at: now.with_timezone(&Utc),
            };
            store.log_set(&set)?;
            println!("✓ Logged {} x {} {}", fmt_weight(set.weight), set.reps, set.exercise_id);
            Ok(())
        }
        Commands::Rollup { cleanup } => cmd_rollup(store, cleanup),
    }
}

fn parse_now(s: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::Other(format!("Invalid --now timestamp '{}': {}", s, e)))
}

/// Report a failed fetch on stderr and fall back to the empty state
fn or_empty<T: Default>(result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!("Fetch failed: {}", e);
        eprintln!("warning: could not load data: {}", e);
        T::default()
    })
}

fn cmd_suggest(
    store: &JsonlStore,
    config: &Config,
    exercise_id: &str,
    style: Option<String>,
) -> Result<()> {
    let style = match style {
        Some(s) => s.parse()?,
        None => config.analytics.training_style,
    };

    let name = store
        .get_exercise(exercise_id)?
        .map(|e| e.name)
        .unwrap_or_else(|| exercise_id.to_string());

    let suggestion =
        service::load_suggestion(store, &config.user.id, exercise_id, style, &config.policy)?;

    match suggestion {
        Some(s) => {
            println!("\n  {} ({:?})", name, style);
            println!(
                "  Last: {} x {} (based on {} sets)",
                fmt_weight(s.last_weight),
                s.last_reps,
                s.last_set_count
            );
            println!(
                "  Next: {} x {}",
                fmt_weight(s.suggested_weight),
                s.suggested_reps
            );
            println!("  → {}", s.message);
            println!();
        }
        None => println!("No working sets logged for {} yet.", name),
    }
    Ok(())
}

fn cmd_session(
    store: &JsonlStore,
    config: &Config,
    command: SessionCommands,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        SessionCommands::Start { split } => {
            let session = WorkoutSession {
                id: Uuid::new_v4(),
                user_id: config.user.id.clone(),
                started_at: now,
                ended_at: None,
                split,
            };
            store.put_session(&session)?;
            println!("{}", session.id);
        }
        SessionCommands::Finish { id } => {
            let session = store
                .find_session(id)?
                .ok_or_else(|| Error::Other(format!("Unknown session: {}", id)))?;
            if session.is_completed() {
                println!("Session {} already finished.", id);
                return Ok(());
            }
            store.put_session(&WorkoutSession {
                ended_at: Some(now),
                ..session
            })?;
            println!("✓ Session {} finished", id);
        }
    }
    Ok(())
}

fn cmd_rollup(store: &JsonlStore, cleanup: bool) -> Result<()> {
    let log_path = store.sets_path();
    if !log_path.exists() {
        println!("No set log found - nothing to roll up.");
        return Ok(());
    }

    let count = liftlog_core::archive::rollup_sets(&log_path, &store.archive_path())?;
    println!("✓ Rolled up {} sets to CSV", count);
    println!("  CSV: {}", store.archive_path().display());

    if cleanup {
        let cleaned = liftlog_core::archive::cleanup_processed(store.dir())?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed logs", cleaned);
        }
    }
    Ok(())
}

fn print_dashboard(dashboard: Dashboard, config: &Config) {
    print_streak(or_empty(dashboard.streak));
    print_week(&or_empty(dashboard.week));
    print_prs(&or_empty(dashboard.prs), config.analytics.pr_window_days);
    print_balance(&or_empty(dashboard.balance), config.analytics.balance_window_days);
}

fn print_streak(streak: u32) {
    let unit = if streak == 1 { "day" } else { "days" };
    println!("Streak: {} {}", streak, unit);
}

fn print_week(week: &WeeklySummary) {
    println!(
        "This week: {} days, {} sets, volume {}",
        week.days_this_week,
        week.total_sets,
        fmt_weight(week.total_volume)
    );
}

fn print_prs(prs: &[PersonalRecord], days: u32) {
    println!("PRs (last {} days):", days);
    if prs.is_empty() {
        println!("  none");
    }
    for pr in prs {
        let marker = if pr.is_resolved() { "" } else { " (?)" };
        println!(
            "  {}  {}{}  {} x {}",
            pr.date,
            pr.exercise_name,
            marker,
            fmt_weight(pr.weight),
            pr.reps
        );
    }
}

fn print_balance(balance: &[BalanceEntry], days: u32) {
    println!("Balance (last {} days):", days);
    if balance.is_empty() {
        println!("  none");
    }
    for entry in balance {
        println!("  {:<12} {}", entry.muscle_group.to_string(), entry.set_count);
    }
}
