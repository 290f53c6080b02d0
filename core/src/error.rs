use thiserror::Error;

use crate::time::DayKey;

/// The Habit Store could not deliver a snapshot.
///
/// Kept apart from a legitimate zero streak or an empty calendar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to fetch {what}: {reason}")]
pub struct FetchError {
    pub what: &'static str,
    pub reason: String,
}

impl FetchError {
    pub fn new(what: &'static str, reason: impl Into<String>) -> Self {
        Self {
            what,
            reason: reason.into(),
        }
    }
}

/// A completion record that cannot take part in aggregation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("record for {day} has {completed} completed out of {total}")]
    CompletedExceedsTotal {
        day: DayKey,
        completed: u32,
        total: u32,
    },
}

/// A habit reference given by the user could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no habit matches '{0}'")]
    UnknownHabit(String),

    #[error("'{prefix}' is ambiguous, matches {matches:?}")]
    AmbiguousHabit {
        prefix: String,
        matches: Vec<String>,
    },
}
