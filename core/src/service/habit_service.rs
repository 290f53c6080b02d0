use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::checkin::CheckIn;
use crate::model::completion::CompletionRecord;
use crate::model::habit::HabitDefinition;
use crate::repository::{CheckInRepository, HabitRepository};
use crate::time::DayKey;

/// A habit together with whether it was checked on a given day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChecklistItem {
    pub habit: HabitDefinition,
    pub checked: bool,
}

pub struct HabitService<H: HabitRepository, C: CheckInRepository> {
    habits: H,
    checkins: C,
    user: String,
}

impl<H: HabitRepository, C: CheckInRepository> HabitService<H, C> {
    pub fn new(habits: H, checkins: C, user: impl Into<String>) -> Self {
        Self {
            habits,
            checkins,
            user: user.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Creates the habit. If `today` already has a check-in, its total is
    /// raised to include the new habit.
    pub fn create_habit(&self, name: &str, today: DayKey) -> Result<HabitDefinition> {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("Habit name is required"));
        }
        let habit = self
            .habits
            .create(HabitDefinition::new(name.to_string(), self.user.clone()))?;

        if let Some(mut checkin) = self.checkins.get(&self.user, today)? {
            checkin.total_habits = Some(self.habit_count()?);
            self.checkins.upsert(checkin)?;
        }

        info!(id = %habit.id, name = %habit.name, "habit created");
        Ok(habit)
    }

    /// The user's habits, oldest first.
    pub fn list_habits(&self) -> Result<Vec<HabitDefinition>> {
        let mut habits: Vec<HabitDefinition> = self
            .habits
            .list()?
            .into_iter()
            .filter(|h| h.user == self.user)
            .collect();
        habits.sort_by_key(|h| h.created_at);
        Ok(habits)
    }

    pub fn habit_count(&self) -> Result<u32> {
        Ok(self.list_habits()?.len() as u32)
    }

    pub fn get_habit(&self, id: &Uuid) -> Result<HabitDefinition> {
        let habit = self.habits.get(id)?;
        if habit.user != self.user {
            return Err(StoreError::UnknownHabit(id.to_string()).into());
        }
        Ok(habit)
    }

    /// Finds a habit by full id or unique id prefix.
    pub fn resolve_habit(&self, key: &str) -> Result<HabitDefinition> {
        let key = key.trim().to_lowercase();
        let habits = self.list_habits()?;

        // 1. Exact match
        if let Some(habit) = habits.iter().find(|h| h.id.to_string() == key) {
            return Ok(habit.clone());
        }

        // 2. Prefix match
        let mut matches: Vec<HabitDefinition> = habits
            .into_iter()
            .filter(|h| !key.is_empty() && h.id.to_string().starts_with(&key))
            .collect();

        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(StoreError::UnknownHabit(key).into()),
            _ => Err(StoreError::AmbiguousHabit {
                prefix: key,
                matches: matches.iter().map(|h| h.short_id()).collect(),
            }
            .into()),
        }
    }

    pub fn rename_habit(&self, id: &Uuid, name: &str) -> Result<HabitDefinition> {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("Habit name is required"));
        }
        let mut habit = self.get_habit(id)?;
        habit.name = name.to_string();
        self.habits.update(&habit)?;
        info!(id = %habit.id, name = %habit.name, "habit renamed");
        Ok(habit)
    }

    /// Deletes the habit and drops it from `today`'s check-in. Earlier days
    /// keep their tallies.
    pub fn delete_habit(&self, id: &Uuid, today: DayKey) -> Result<()> {
        self.get_habit(id)?;
        self.habits.delete(id)?;

        if let Some(mut checkin) = self.checkins.get(&self.user, today)? {
            checkin.checked.retain(|checked| checked != id);
            checkin.total_habits = Some(self.habit_count()?);
            self.checkins.upsert(checkin)?;
        }

        info!(%id, "habit deleted");
        Ok(())
    }

    /// Flips the habit's state on `day` and returns whether it is now
    /// checked.
    ///
    /// Today's total is refreshed from the current habit list. An earlier
    /// day keeps the total it was stored with and only gets one if it had
    /// none. Days after `today` are rejected.
    pub fn toggle_completion(&self, habit_id: &Uuid, day: DayKey, today: DayKey) -> Result<bool> {
        if day > today {
            return Err(anyhow!("Cannot check in for a future day: {}", day));
        }
        self.get_habit(habit_id)?;

        let mut checkin = self
            .checkins
            .get(&self.user, day)?
            .unwrap_or_else(|| CheckIn::new(day, self.user.clone()));
        let checked = checkin.toggle(*habit_id);
        if day == today || checkin.total_habits.is_none() {
            checkin.total_habits = Some(self.habit_count()?);
        }
        self.checkins.upsert(checkin)?;

        info!(habit = %habit_id, %day, checked, "completion toggled");
        Ok(checked)
    }

    pub fn checklist(&self, day: DayKey) -> Result<Vec<ChecklistItem>> {
        let checkin = self.checkins.get(&self.user, day)?;
        Ok(self
            .list_habits()?
            .into_iter()
            .map(|habit| ChecklistItem {
                checked: checkin.as_ref().is_some_and(|c| c.is_checked(&habit.id)),
                habit,
            })
            .collect())
    }

    pub fn completion_records(&self) -> Result<Vec<CompletionRecord>> {
        Ok(self
            .checkins
            .list(&self.user)?
            .iter()
            .map(CheckIn::to_record)
            .collect())
    }
}
