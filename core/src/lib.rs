pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod store;
pub mod streak;
pub mod subscription;
pub mod time;
pub mod tracker;

pub use aggregate::{aggregate, aggregate_raw, Aggregation, TotalsPolicy};
pub use calendar::CalendarProjector;
pub use config::{resolve_data_dir, Config};
pub use error::{FetchError, MalformedRecord, StoreError};
pub use model::calendar::{CalendarDay, CompletionRatio, MonthCalendar};
pub use model::completion::{CompletionRecord, RawCompletionRecord};
pub use model::day_map::{DayMap, DayTally};
pub use model::habit::HabitDefinition;
pub use repository::{CheckInRepository, FileCheckInRepository, FileHabitRepository, HabitRepository};
pub use service::habit_service::{ChecklistItem, HabitService};
pub use store::HabitStore;
pub use streak::{current_streak, longest_streak, StreakSummary};
pub use subscription::{Snapshot, Subscription};
pub use time::{parse_human_day, DayKey};
pub use tracker::{Clock, FixedClock, HabitTracker, StreakResult, SystemClock, TrackerSubscriptions};

/// File-backed store for the configured user in `data_dir`.
pub fn open_store(
    data_dir: &std::path::Path,
    config: &Config,
) -> anyhow::Result<HabitStore<FileHabitRepository, FileCheckInRepository>> {
    let service = HabitService::new(
        FileHabitRepository::new(data_dir)?,
        FileCheckInRepository::new(data_dir)?,
        config.user.clone(),
    );
    Ok(HabitStore::new(service))
}
