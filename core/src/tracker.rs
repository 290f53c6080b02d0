//! Recomputes the DayMap and streak from the latest store snapshots and
//! notifies listeners.
//!
//! Each stream keeps the sequence number of the last snapshot it applied;
//! anything not newer is dropped, so a late delivery can never replace a
//! result computed from fresher data.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::aggregate::{aggregate, TotalsPolicy};
use crate::calendar::CalendarProjector;
use crate::error::{FetchError, MalformedRecord};
use crate::model::calendar::{CompletionRatio, MonthCalendar};
use crate::model::completion::CompletionRecord;
use crate::model::day_map::DayMap;
use crate::repository::{CheckInRepository, HabitRepository};
use crate::store::HabitStore;
use crate::streak::{current_streak, summarize, StreakSummary};
use crate::subscription::{Snapshot, Subscription};
use crate::time::DayKey;

/// Source of "today" for streak and calendar computations.
pub trait Clock {
    fn today(&self) -> DayKey;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> DayKey {
        DayKey::today()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DayKey);

impl Clock for FixedClock {
    fn today(&self) -> DayKey {
        self.0
    }
}

pub type StreakResult = Result<u32, FetchError>;

/// Store subscriptions held on behalf of a tracker.
#[derive(Debug)]
pub struct TrackerSubscriptions {
    pub habits: Subscription,
    pub records: Subscription,
}

pub struct HabitTracker {
    policy: TotalsPolicy,
    clock: Box<dyn Clock>,

    records: Option<Vec<CompletionRecord>>,
    habit_count: u32,
    last_records_seq: Option<u64>,
    last_count_seq: Option<u64>,
    records_error: Option<FetchError>,
    count_error: Option<FetchError>,

    days: DayMap,
    skipped: Vec<MalformedRecord>,

    aggregate_listeners: Vec<Box<dyn Fn(&DayMap)>>,
    streak_listeners: Vec<Box<dyn Fn(StreakResult)>>,
}

impl HabitTracker {
    pub fn new(policy: TotalsPolicy, clock: impl Clock + 'static) -> Self {
        Self {
            policy,
            clock: Box::new(clock),
            records: None,
            habit_count: 0,
            last_records_seq: None,
            last_count_seq: None,
            records_error: None,
            count_error: None,
            days: DayMap::new(),
            skipped: Vec::new(),
            aggregate_listeners: Vec::new(),
            streak_listeners: Vec::new(),
        }
    }

    pub fn on_aggregate_updated(&mut self, callback: impl Fn(&DayMap) + 'static) {
        self.aggregate_listeners.push(Box::new(callback));
    }

    pub fn on_streak_updated(&mut self, callback: impl Fn(StreakResult) + 'static) {
        self.streak_listeners.push(Box::new(callback));
    }

    /// Applies a records snapshot. Returns `false` if it was superseded.
    pub fn apply_records(&mut self, snapshot: Snapshot<Vec<CompletionRecord>>) -> bool {
        if !is_newer(self.last_records_seq, snapshot.seq) {
            debug!(seq = snapshot.seq, last = ?self.last_records_seq, "dropping stale records snapshot");
            return false;
        }
        self.last_records_seq = Some(snapshot.seq);

        match snapshot.payload {
            Ok(records) => {
                self.records = Some(records);
                self.records_error = None;
                self.recompute();
            }
            Err(err) => {
                self.records_error = Some(err.clone());
                self.fail(err);
            }
        }
        true
    }

    /// Applies a habit-count snapshot. Returns `false` if it was superseded.
    pub fn apply_habit_count(&mut self, snapshot: Snapshot<u32>) -> bool {
        if !is_newer(self.last_count_seq, snapshot.seq) {
            debug!(seq = snapshot.seq, last = ?self.last_count_seq, "dropping stale habit count snapshot");
            return false;
        }
        self.last_count_seq = Some(snapshot.seq);

        match snapshot.payload {
            Ok(count) => {
                self.habit_count = count;
                self.count_error = None;
                // Nothing to recompute until the first records arrive.
                if self.records.is_some() {
                    self.recompute();
                }
            }
            Err(err) => {
                self.count_error = Some(err.clone());
                self.fail(err);
            }
        }
        true
    }

    fn fetch_error(&self) -> Option<&FetchError> {
        self.records_error.as_ref().or(self.count_error.as_ref())
    }

    /// Streak over the latest DayMap as of the clock's today, or the error
    /// that prevented computing it.
    pub fn streak(&self) -> StreakResult {
        match self.fetch_error() {
            Some(err) => Err(err.clone()),
            None => Ok(current_streak(&self.days, self.clock.today())),
        }
    }

    pub fn summary(&self) -> Result<StreakSummary, FetchError> {
        match self.fetch_error() {
            Some(err) => Err(err.clone()),
            None => Ok(summarize(&self.days, self.clock.today())),
        }
    }

    pub fn days(&self) -> &DayMap {
        &self.days
    }

    /// Records left out of the last aggregation.
    pub fn skipped(&self) -> &[MalformedRecord] {
        &self.skipped
    }

    pub fn today(&self) -> DayKey {
        self.clock.today()
    }

    pub fn completion_ratio(&self, year: i32, month: u32, day: u32) -> CompletionRatio {
        CalendarProjector::new(&self.days, self.clock.today()).completion_ratio(year, month, day)
    }

    pub fn month(&self, year: i32, month: u32) -> MonthCalendar {
        CalendarProjector::new(&self.days, self.clock.today()).month(year, month)
    }

    fn recompute(&mut self) {
        let records = self.records.as_deref().unwrap_or_default();
        let aggregation = aggregate(records, self.habit_count, self.policy);
        self.days = aggregation.days;
        self.skipped = aggregation.skipped;

        let streak = self.streak();
        debug!(today = %self.clock.today(), days = self.days.len(), ?streak, "recomputed");

        for listener in &self.aggregate_listeners {
            listener(&self.days);
        }
        for listener in &self.streak_listeners {
            listener(streak.clone());
        }
    }

    // The last good DayMap stays in place for calendar lookups.
    fn fail(&self, err: FetchError) {
        debug!(%err, "snapshot carried a fetch error");
        for listener in &self.streak_listeners {
            listener(Err(err.clone()));
        }
    }

    /// Subscribes `tracker` to both of the store's streams.
    ///
    /// The tracker is held weakly; once it is dropped the callbacks do
    /// nothing. Listeners must not borrow the tracker, since they run while
    /// it is mutably borrowed.
    pub fn attach<H, C>(tracker: &Rc<RefCell<Self>>, store: &HabitStore<H, C>) -> TrackerSubscriptions
    where
        H: HabitRepository,
        C: CheckInRepository,
    {
        let weak: Weak<RefCell<Self>> = Rc::downgrade(tracker);
        let habits = store.subscribe_habit_count(move |snapshot| {
            if let Some(tracker) = weak.upgrade() {
                tracker.borrow_mut().apply_habit_count(snapshot);
            }
        });

        let weak: Weak<RefCell<Self>> = Rc::downgrade(tracker);
        let records = store.subscribe_completion_records(move |snapshot| {
            if let Some(tracker) = weak.upgrade() {
                tracker.borrow_mut().apply_records(snapshot);
            }
        });

        TrackerSubscriptions { habits, records }
    }
}

fn is_newer(last: Option<u64>, seq: u64) -> bool {
    last.map_or(true, |last| seq > last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn today() -> DayKey {
        DayKey::from_ymd(2024, 6, 10).unwrap()
    }

    fn ago(n: u32) -> DayKey {
        (0..n).fold(today(), |day, _| day.pred())
    }

    fn tracker() -> HabitTracker {
        HabitTracker::new(TotalsPolicy::Recorded, FixedClock(today()))
    }

    fn full(day: DayKey) -> CompletionRecord {
        CompletionRecord::new(day, 2, 2)
    }

    #[test]
    fn test_no_records() {
        let mut tracker = tracker();
        tracker.apply_records(Snapshot::ok(1, vec![]));
        assert_eq!(tracker.streak(), Ok(0));
        assert!(tracker.completion_ratio(2024, 6, 10).is_no_data());
        assert!(tracker.completion_ratio(2024, 6, 9).is_no_data());
    }

    #[test]
    fn test_three_day_streak() {
        let mut tracker = tracker();
        tracker.apply_records(Snapshot::ok(1, vec![full(ago(2)), full(ago(1)), full(today())]));
        assert_eq!(tracker.streak(), Ok(3));
    }

    #[test]
    fn test_partial_today() {
        let mut tracker = tracker();
        tracker.apply_records(Snapshot::ok(
            1,
            vec![full(ago(2)), full(ago(1)), CompletionRecord::new(today(), 2, 1)],
        ));
        assert_eq!(tracker.streak(), Ok(2));
        assert_eq!(tracker.completion_ratio(2024, 6, 10), CompletionRatio::Ratio(0.5));
    }

    #[test]
    fn test_gap_stops_streak() {
        let mut tracker = tracker();
        tracker.apply_records(Snapshot::ok(
            1,
            vec![
                full(ago(3)),
                CompletionRecord::new(ago(2), 2, 0),
                full(ago(1)),
                full(today()),
            ],
        ));
        assert_eq!(tracker.streak(), Ok(2));
    }

    #[test]
    fn test_malformed_record_excluded() {
        let mut tracker = tracker();
        tracker.apply_records(Snapshot::ok(
            1,
            vec![full(ago(2)), CompletionRecord::new(ago(1), 2, 3), full(today())],
        ));
        assert_eq!(tracker.skipped().len(), 1);
        assert!(tracker.completion_ratio(2024, 6, 9).is_no_data());
        assert_eq!(tracker.completion_ratio(2024, 6, 8), CompletionRatio::Ratio(1.0));
        assert_eq!(tracker.streak(), Ok(1));
    }

    #[test]
    fn test_stale_snapshot_is_dropped() {
        let mut tracker = tracker();
        assert!(tracker.apply_records(Snapshot::ok(5, vec![full(ago(1)), full(today())])));
        assert!(!tracker.apply_records(Snapshot::ok(4, vec![])));
        assert!(!tracker.apply_records(Snapshot::ok(5, vec![])));
        assert_eq!(tracker.streak(), Ok(2));
    }

    #[test]
    fn test_fetch_error_is_not_zero() {
        let mut tracker = tracker();
        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&results);
        tracker.on_streak_updated(move |r| sink.borrow_mut().push(r));

        tracker.apply_records(Snapshot::ok(1, vec![full(today())]));
        let err = FetchError::new("completion records", "offline");
        tracker.apply_records(Snapshot::err(2, err.clone()));

        assert_eq!(*results.borrow(), vec![Ok(1), Err(err.clone())]);
        assert_eq!(tracker.streak(), Err(err));
        // Calendar still answers from the last good snapshot.
        assert_eq!(tracker.completion_ratio(2024, 6, 10), CompletionRatio::Ratio(1.0));

        tracker.apply_records(Snapshot::ok(3, vec![]));
        assert_eq!(tracker.streak(), Ok(0));
    }

    #[test]
    fn test_habit_count_backfills_and_recomputes() {
        let mut tracker = tracker();
        let updates = Rc::new(Cell::new(0));
        let sink = Rc::clone(&updates);
        tracker.on_aggregate_updated(move |_| sink.set(sink.get() + 1));

        // Count alone does not emit.
        tracker.apply_habit_count(Snapshot::ok(1, 1));
        assert_eq!(updates.get(), 0);

        tracker.apply_records(Snapshot::ok(2, vec![CompletionRecord::without_total(today(), 1)]));
        assert_eq!(tracker.streak(), Ok(1));

        tracker.apply_habit_count(Snapshot::ok(3, 2));
        assert_eq!(updates.get(), 2);
        assert_eq!(tracker.streak(), Ok(0));
        assert_eq!(tracker.completion_ratio(2024, 6, 10), CompletionRatio::Ratio(0.5));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut tracker = tracker();
        let records = vec![full(ago(1)), CompletionRecord::new(today(), 2, 1)];
        tracker.apply_records(Snapshot::ok(1, records.clone()));
        let first = tracker.days().clone();
        tracker.apply_records(Snapshot::ok(2, records));
        assert_eq!(tracker.days(), &first);
    }

    struct SharedClock(Rc<Cell<DayKey>>);

    impl Clock for SharedClock {
        fn today(&self) -> DayKey {
            self.0.get()
        }
    }

    #[test]
    fn test_streak_follows_clock_across_midnight() {
        let now = Rc::new(Cell::new(today()));
        let mut tracker =
            HabitTracker::new(TotalsPolicy::Recorded, SharedClock(Rc::clone(&now)));
        tracker.apply_records(Snapshot::ok(1, vec![full(ago(2)), full(ago(1)), full(today())]));
        assert_eq!(tracker.streak(), Ok(3));

        // Next day, nothing checked yet: the run through yesterday still counts.
        now.set(today().succ());
        assert_eq!(tracker.streak(), Ok(3));
        assert_eq!(tracker.summary().unwrap().current, 3);

        // Two days later the run is broken.
        now.set(today().succ().succ());
        assert_eq!(tracker.streak(), Ok(0));
        assert_eq!(tracker.summary().unwrap().current, 0);
    }

    #[test]
    fn test_summary() {
        let mut tracker = tracker();
        tracker.apply_records(Snapshot::ok(
            1,
            vec![full(ago(5)), full(ago(4)), full(ago(3)), full(ago(1))],
        ));
        let summary = tracker.summary().unwrap();
        assert_eq!(summary.current, 1);
        assert_eq!(summary.longest, 3);
        assert_eq!(summary.completed_days, 4);
    }
}
