//! Consecutive-day streaks over a `DayMap`.
//!
//! A day counts toward a streak only when every habit was done and there was
//! at least one habit to do. Today is still in progress: completing it adds
//! one, leaving it partial does not break the run that ends yesterday.

use serde::{Deserialize, Serialize};

use crate::model::day_map::DayMap;
use crate::time::DayKey;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakSummary {
    /// Run ending today (or yesterday, if today is not done yet).
    pub current: u32,
    /// Longest run anywhere in the history.
    pub longest: u32,
    /// Fully completed days in total.
    pub completed_days: u32,
}

/// Length of the run of fully completed days ending at `today`.
pub fn current_streak(days: &DayMap, today: DayKey) -> u32 {
    // 1. Qualifying days strictly before today, newest first
    let mut prior: Vec<DayKey> = days
        .fully_completed_days()
        .filter(|day| *day < today)
        .collect();
    prior.sort_by(|a, b| b.cmp(a));

    // 2. Walk back from yesterday, stop at the first gap
    let mut streak = 0;
    let mut expected = today.pred();
    for day in prior {
        if day != expected {
            break;
        }
        streak += 1;
        expected = day.pred();
    }

    // 3. Today only ever adds
    if days.get(&today).is_some_and(|t| t.is_fully_completed()) {
        streak += 1;
    }

    streak
}

/// Longest run of consecutive fully completed days, ignoring days after
/// `today`.
pub fn longest_streak(days: &DayMap, today: DayKey) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<DayKey> = None;

    for day in days.fully_completed_days().filter(|day| *day <= today) {
        run = match previous {
            Some(prev) if prev.succ() == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    longest
}

pub fn summarize(days: &DayMap, today: DayKey) -> StreakSummary {
    StreakSummary {
        current: current_streak(days, today),
        longest: longest_streak(days, today),
        completed_days: days
            .fully_completed_days()
            .filter(|day| *day <= today)
            .count() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, TotalsPolicy};
    use crate::model::completion::CompletionRecord;

    fn today() -> DayKey {
        DayKey::from_ymd(2024, 3, 2).unwrap()
    }

    fn ago(n: i64) -> DayKey {
        let mut day = today();
        for _ in 0..n {
            day = day.pred();
        }
        day
    }

    fn map(records: &[CompletionRecord]) -> DayMap {
        aggregate(records, 2, TotalsPolicy::Recorded).days
    }

    #[test]
    fn test_empty_history_is_zero() {
        assert_eq!(current_streak(&DayMap::new(), today()), 0);
        assert_eq!(summarize(&DayMap::new(), today()), StreakSummary::default());
    }

    #[test]
    fn test_only_today_completed() {
        let days = map(&[CompletionRecord::new(today(), 2, 2)]);
        assert_eq!(current_streak(&days, today()), 1);
    }

    #[test]
    fn test_three_days_including_today() {
        let days = map(&[
            CompletionRecord::new(ago(2), 2, 2),
            CompletionRecord::new(ago(1), 2, 2),
            CompletionRecord::new(today(), 2, 2),
        ]);
        assert_eq!(current_streak(&days, today()), 3);
    }

    #[test]
    fn test_partial_today_neither_adds_nor_breaks() {
        let days = map(&[
            CompletionRecord::new(ago(2), 2, 2),
            CompletionRecord::new(ago(1), 2, 2),
            CompletionRecord::new(today(), 2, 1),
        ]);
        assert_eq!(current_streak(&days, today()), 2);
    }

    #[test]
    fn test_missing_today_keeps_yesterdays_run() {
        let days = map(&[
            CompletionRecord::new(ago(2), 2, 2),
            CompletionRecord::new(ago(1), 2, 2),
        ]);
        assert_eq!(current_streak(&days, today()), 2);
    }

    #[test]
    fn test_stops_at_gap() {
        let days = map(&[
            CompletionRecord::new(ago(3), 2, 2),
            CompletionRecord::new(ago(2), 2, 0),
            CompletionRecord::new(ago(1), 2, 2),
            CompletionRecord::new(today(), 2, 2),
        ]);
        assert_eq!(current_streak(&days, today()), 2);
    }

    #[test]
    fn test_missing_day_is_a_gap() {
        let days = map(&[
            CompletionRecord::new(ago(3), 2, 2),
            CompletionRecord::new(ago(1), 2, 2),
        ]);
        assert_eq!(current_streak(&days, today()), 1);
    }

    #[test]
    fn test_run_must_reach_yesterday() {
        let days = map(&[
            CompletionRecord::new(ago(4), 2, 2),
            CompletionRecord::new(ago(3), 2, 2),
            CompletionRecord::new(today(), 2, 2),
        ]);
        assert_eq!(current_streak(&days, today()), 1);
    }

    #[test]
    fn test_zero_habit_days_never_count() {
        let days = map(&[
            CompletionRecord::new(ago(2), 2, 2),
            CompletionRecord::new(ago(1), 0, 0),
            CompletionRecord::new(today(), 0, 0),
        ]);
        assert_eq!(current_streak(&days, today()), 0);
        assert_eq!(summarize(&days, today()).completed_days, 1);
    }

    #[test]
    fn test_future_records_ignored() {
        let days = map(&[
            CompletionRecord::new(today().succ(), 2, 2),
            CompletionRecord::new(today(), 2, 2),
        ]);
        assert_eq!(current_streak(&days, today()), 1);
        assert_eq!(longest_streak(&days, today()), 1);
    }

    #[test]
    fn test_run_length_matches_consecutive_completed_days() {
        for n in 0..10 {
            let mut records = vec![CompletionRecord::new(ago(n + 1), 2, 1)];
            for i in 0..=n {
                records.push(CompletionRecord::new(ago(i), 2, 2));
            }
            let days = map(&records);
            assert_eq!(current_streak(&days, today()), n as u32 + 1);
        }
    }

    #[test]
    fn test_longest_across_month_boundary() {
        // Leap year: the current run covers Feb 29 and Mar 1.
        let days = map(&[
            CompletionRecord::new(ago(9), 2, 2),
            CompletionRecord::new(ago(8), 2, 2),
            CompletionRecord::new(ago(7), 2, 2),
            CompletionRecord::new(ago(6), 2, 2),
            CompletionRecord::new(ago(5), 2, 1),
            CompletionRecord::new(ago(2), 2, 2),
            CompletionRecord::new(ago(1), 2, 2),
        ]);
        let summary = summarize(&days, today());
        assert_eq!(summary.current, 2);
        assert_eq!(summary.longest, 4);
        assert_eq!(summary.completed_days, 6);
    }
}
