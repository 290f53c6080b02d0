use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::MalformedRecord;
use crate::model::completion::{CompletionRecord, RawCompletionRecord};
use crate::model::day_map::{DayMap, DayTally};

/// Where a day's `total_habits` comes from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TotalsPolicy {
    /// Use the count stored on the record; fill it from the current habit
    /// count only when the record has none.
    #[default]
    Recorded,
    /// Always use the current habit count. Habits added today then count as
    /// required on every past day.
    #[serde(rename = "current", alias = "current_count")]
    CurrentCount,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub days: DayMap,
    pub skipped: Vec<MalformedRecord>,
}

/// Folds completion records into a fresh `DayMap`.
///
/// Input order only matters for duplicate days, where the later record wins.
/// Records that break `completed <= total` are left out and reported.
pub fn aggregate(
    records: &[CompletionRecord],
    current_habits: u32,
    policy: TotalsPolicy,
) -> Aggregation {
    let mut days = BTreeMap::new();
    let mut skipped = Vec::new();

    for record in records {
        let total = match policy {
            TotalsPolicy::Recorded => record.total_habits.unwrap_or(current_habits),
            TotalsPolicy::CurrentCount => current_habits,
        };

        if record.completed_habits > total {
            let err = MalformedRecord::CompletedExceedsTotal {
                day: record.day,
                completed: record.completed_habits,
                total,
            };
            warn!(%err, "skipping completion record");
            skipped.push(err);
            continue;
        }

        if days
            .insert(record.day, DayTally::new(total, record.completed_habits))
            .is_some()
        {
            debug!(day = %record.day, "duplicate completion record, keeping the later one");
        }
    }

    debug!(records = records.len(), days = days.len(), skipped = skipped.len(), "aggregated");

    Aggregation {
        days: DayMap::from_days(days),
        skipped,
    }
}

/// Like `aggregate`, for records straight off storage. Records missing a
/// required field are skipped and reported alongside the others.
pub fn aggregate_raw(
    raw: &[RawCompletionRecord],
    current_habits: u32,
    policy: TotalsPolicy,
) -> Aggregation {
    let mut records = Vec::with_capacity(raw.len());
    let mut missing = Vec::new();
    for item in raw {
        match CompletionRecord::try_from(item.clone()) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(%err, "skipping completion record");
                missing.push(err);
            }
        }
    }

    let mut aggregation = aggregate(&records, current_habits, policy);
    missing.append(&mut aggregation.skipped);
    aggregation.skipped = missing;
    aggregation
}
