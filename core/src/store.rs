//! In-process Habit Store: habit CRUD and check-ins on top of the file
//! repositories, with push notification of complete snapshots.
//!
//! Every write is followed by a fresh snapshot on both streams. Read
//! failures are delivered as `Err(FetchError)` snapshots rather than empty
//! data.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use tracing::warn;
use uuid::Uuid;

use crate::error::FetchError;
use crate::model::completion::CompletionRecord;
use crate::model::habit::HabitDefinition;
use crate::repository::{CheckInRepository, HabitRepository};
use crate::service::habit_service::{ChecklistItem, HabitService};
use crate::subscription::{Listeners, Snapshot, Subscription};
use crate::time::DayKey;

pub struct HabitStore<H: HabitRepository, C: CheckInRepository> {
    service: HabitService<H, C>,
    seq: Cell<u64>,
    record_listeners: Rc<RefCell<Listeners<Vec<CompletionRecord>>>>,
    count_listeners: Rc<RefCell<Listeners<u32>>>,
}

impl<H: HabitRepository, C: CheckInRepository> HabitStore<H, C> {
    pub fn new(service: HabitService<H, C>) -> Self {
        Self {
            service,
            seq: Cell::new(0),
            record_listeners: Listeners::new(),
            count_listeners: Listeners::new(),
        }
    }

    pub fn service(&self) -> &HabitService<H, C> {
        &self.service
    }

    /// Delivers the current records right away, then again after every
    /// write, until the returned handle is dropped.
    pub fn subscribe_completion_records(
        &self,
        callback: impl Fn(Snapshot<Vec<CompletionRecord>>) + 'static,
    ) -> Subscription {
        let (callback, subscription) = Listeners::add(&self.record_listeners, callback);
        callback(self.records_snapshot());
        subscription
    }

    /// Same as `subscribe_completion_records`, for the number of active
    /// habits.
    pub fn subscribe_habit_count(&self, callback: impl Fn(Snapshot<u32>) + 'static) -> Subscription {
        let (callback, subscription) = Listeners::add(&self.count_listeners, callback);
        callback(self.count_snapshot());
        subscription
    }

    pub fn subscriber_count(&self) -> usize {
        Listeners::len(&self.record_listeners) + Listeners::len(&self.count_listeners)
    }

    pub fn create_habit(&self, name: &str, today: DayKey) -> Result<HabitDefinition> {
        let habit = self.service.create_habit(name, today)?;
        self.publish();
        Ok(habit)
    }

    pub fn rename_habit(&self, id: &Uuid, name: &str) -> Result<HabitDefinition> {
        let habit = self.service.rename_habit(id, name)?;
        self.publish();
        Ok(habit)
    }

    pub fn delete_habit(&self, id: &Uuid, today: DayKey) -> Result<()> {
        self.service.delete_habit(id, today)?;
        self.publish();
        Ok(())
    }

    pub fn toggle_habit_completion(
        &self,
        habit_id: &Uuid,
        day: DayKey,
        today: DayKey,
    ) -> Result<bool> {
        let checked = self.service.toggle_completion(habit_id, day, today)?;
        self.publish();
        Ok(checked)
    }

    pub fn list_habits(&self) -> Result<Vec<HabitDefinition>> {
        self.service.list_habits()
    }

    pub fn checklist(&self, day: DayKey) -> Result<Vec<ChecklistItem>> {
        self.service.checklist(day)
    }

    /// Pushes fresh snapshots to every subscriber. The count goes first so
    /// that record consumers backfill with the new habit count.
    pub fn publish(&self) {
        Listeners::emit(&self.count_listeners, self.count_snapshot());
        Listeners::emit(&self.record_listeners, self.records_snapshot());
    }

    fn next_seq(&self) -> u64 {
        let seq = self.seq.get() + 1;
        self.seq.set(seq);
        seq
    }

    fn records_snapshot(&self) -> Snapshot<Vec<CompletionRecord>> {
        let seq = self.next_seq();
        match self.service.completion_records() {
            Ok(records) => Snapshot::ok(seq, records),
            Err(err) => {
                warn!(error = %format!("{:#}", err), "could not read completion records");
                Snapshot::err(seq, FetchError::new("completion records", format!("{:#}", err)))
            }
        }
    }

    fn count_snapshot(&self) -> Snapshot<u32> {
        let seq = self.next_seq();
        match self.service.habit_count() {
            Ok(count) => Snapshot::ok(seq, count),
            Err(err) => {
                warn!(error = %format!("{:#}", err), "could not read habits");
                Snapshot::err(seq, FetchError::new("habits", format!("{:#}", err)))
            }
        }
    }
}
