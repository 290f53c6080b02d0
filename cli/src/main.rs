mod calendar;
mod dashboard;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use clap::Parser;
use habitual_core::{
    open_store, parse_human_day, resolve_data_dir, CompletionRatio, Config, DayKey, HabitTracker,
    SystemClock,
};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "habitual")]
#[command(about = "Track daily habits and keep your streak going", long_about = None)]
struct Cli {
    /// Data directory (defaults to $HABITUAL_DATA_DIR, then ~/.habitual)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a new habit (usage: add Read 20 pages)
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        name: Vec<String>,
    },
    /// List all habits
    List,
    /// Rename a habit
    Rename {
        /// Habit ID or unique prefix
        id: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        name: Vec<String>,
    },
    /// Delete a habit
    Remove {
        /// Habit ID or unique prefix
        id: String,
    },
    /// Check or uncheck a habit (today unless --day is given)
    Check {
        /// Habit ID or unique prefix
        id: String,
        /// Day to change (today, yesterday, -3d, 2025-01-31)
        #[arg(long)]
        day: Option<String>,
    },
    /// Show today's checklist (default)
    Today,
    /// Show current and longest streak
    Streak,
    /// Show the completion ratio for one day (today, yesterday, -3d, 2025-01-31)
    Ratio { day: String },
    /// Show a month calendar
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Open the month dashboard
    Dashboard,
}

#[derive(Tabled)]
struct HabitRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Habit")]
    name: String,
    #[tabled(rename = "Since")]
    since: String,
}

#[derive(Tabled)]
struct ChecklistRow {
    #[tabled(rename = "")]
    mark: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Habit")]
    name: String,
}

fn format_ratio(ratio: CompletionRatio) -> String {
    match ratio {
        CompletionRatio::Ratio(r) => format!("{:.0}%", r * 100.0),
        CompletionRatio::NoData => "no data".to_string(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir)?;
    let config = Config::load(&data_dir)?;
    debug!(data_dir = %data_dir.display(), user = %config.user, "opening store");
    let store = open_store(&data_dir, &config)?;

    let tracker = Rc::new(RefCell::new(HabitTracker::new(config.totals_policy, SystemClock)));
    let _subscriptions = HabitTracker::attach(&tracker, &store);
    let today = DayKey::today();

    match cli.command.unwrap_or(Commands::Today) {
        Commands::Add { name } => {
            let habit = store.create_habit(&name.join(" "), today)?;
            println!("Habit added: {} (ID: {})", habit.name, habit.short_id());
        }
        Commands::List => {
            let habits = store.list_habits()?;
            if habits.is_empty() {
                println!("No habits yet. Add one with `habitual add <name>`.");
            } else {
                let rows: Vec<HabitRow> = habits
                    .iter()
                    .map(|h| HabitRow {
                        id: h.short_id(),
                        name: h.name.clone(),
                        since: h.created_at.format("%Y-%m-%d").to_string(),
                    })
                    .collect();
                let mut table = Table::new(rows);
                table
                    .with(Style::modern())
                    .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
                println!("{}", table);
            }
        }
        Commands::Rename { id, name } => {
            let habit = store.service().resolve_habit(&id)?;
            let renamed = store.rename_habit(&habit.id, &name.join(" "))?;
            println!("Renamed: {} -> {}", habit.name, renamed.name);
        }
        Commands::Remove { id } => {
            let habit = store.service().resolve_habit(&id)?;
            store.delete_habit(&habit.id, today)?;
            println!("Habit removed: {}", habit.name);
        }
        Commands::Check { id, day } => {
            let day = match day {
                Some(day) => parse_human_day(&day, today)?,
                None => today,
            };
            let habit = store.service().resolve_habit(&id)?;
            let checked = store.toggle_habit_completion(&habit.id, day, today)?;
            if checked {
                println!("✔ {} ({})", habit.name, day);
            } else {
                println!("○ {} ({}, unchecked)", habit.name, day);
            }
            let streak = tracker.borrow().streak()?;
            println!("Current streak: {} day(s)", streak);
        }
        Commands::Today => {
            let items = store.checklist(today)?;
            if items.is_empty() {
                println!("No habits yet. Add one with `habitual add <name>`.");
                return Ok(());
            }
            let done = items.iter().filter(|i| i.checked).count();
            let rows: Vec<ChecklistRow> = items
                .iter()
                .map(|i| ChecklistRow {
                    mark: if i.checked { "✔".to_string() } else { "○".to_string() },
                    id: i.habit.short_id(),
                    name: i.habit.name.clone(),
                })
                .collect();
            let mut table = Table::new(rows);
            table
                .with(Style::modern())
                .with(Modify::new(Rows::first()).with(Color::FG_CYAN));

            println!("\x1b[1;36m{} ({})\x1b[0m", today, today.date().format("%a"));
            println!("{}", table);
            println!("Done: {}/{}", done, items.len());
            let streak = tracker.borrow().streak()?;
            println!("Current streak: {} day(s)", streak);
        }
        Commands::Streak => {
            let summary = tracker.borrow().summary()?;
            println!("Current streak: {} day(s)", summary.current);
            println!("Longest streak: {} day(s)", summary.longest);
            println!("Completed days: {}", summary.completed_days);
        }
        Commands::Ratio { day } => {
            let day = parse_human_day(&day, today)?;
            let ratio = tracker
                .borrow()
                .completion_ratio(day.year(), day.month(), day.day());
            println!("{}: {}", day, format_ratio(ratio));
        }
        Commands::Calendar { year, month } => {
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            if !(1..=12).contains(&month) {
                return Err(anyhow!("Invalid month: {}", month));
            }
            let tracker = tracker.borrow();
            calendar::show_month(&tracker.month(year, month), today);
            if let Ok(summary) = tracker.summary() {
                println!(
                    "Streak: {} day(s), longest {} day(s)",
                    summary.current, summary.longest
                );
            }
        }
        Commands::Dashboard => {
            let tracker = tracker.borrow();
            dashboard::run(&tracker)?;
        }
    }
    Ok(())
}
