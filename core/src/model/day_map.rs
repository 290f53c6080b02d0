use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::time::DayKey;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTally {
    pub total_habits: u32,
    pub completed_habits: u32,
}

impl DayTally {
    pub fn new(total_habits: u32, completed_habits: u32) -> Self {
        Self {
            total_habits,
            completed_habits,
        }
    }

    /// Every habit done, and there was at least one habit to do.
    pub fn is_fully_completed(&self) -> bool {
        self.total_habits > 0 && self.completed_habits == self.total_habits
    }

    /// `None` when there were no habits that day.
    pub fn ratio(&self) -> Option<f64> {
        if self.total_habits == 0 {
            None
        } else {
            Some(self.completed_habits as f64 / self.total_habits as f64)
        }
    }
}

/// Aggregated completion tallies keyed by day, in chronological order.
///
/// Built once per snapshot and never mutated afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DayMap {
    days: BTreeMap<DayKey, DayTally>, // Key: "YYYY-MM-DD"
}

impl DayMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_days(days: BTreeMap<DayKey, DayTally>) -> Self {
        Self { days }
    }

    pub fn get(&self, day: &DayKey) -> Option<&DayTally> {
        self.days.get(day)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Oldest day first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&DayKey, &DayTally)> + '_ {
        self.days.iter()
    }

    pub fn fully_completed_days(&self) -> impl DoubleEndedIterator<Item = DayKey> + '_ {
        self.days
            .iter()
            .filter(|(_, tally)| tally.is_fully_completed())
            .map(|(day, _)| *day)
    }
}
