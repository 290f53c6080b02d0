use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::completion::CompletionRecord;
use crate::time::DayKey;

/// Stored form of a user's day: which habits were checked, and how many
/// habits existed when the day was last written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckIn {
    pub day: DayKey,
    pub user: String,
    pub checked: Vec<Uuid>,
    #[serde(default)]
    pub total_habits: Option<u32>,
}

impl CheckIn {
    pub fn new(day: DayKey, user: String) -> Self {
        Self {
            day,
            user,
            checked: Vec::new(),
            total_habits: None,
        }
    }

    pub fn is_checked(&self, habit_id: &Uuid) -> bool {
        self.checked.contains(habit_id)
    }

    /// Flips `habit_id` and returns whether it is now checked.
    pub fn toggle(&mut self, habit_id: Uuid) -> bool {
        if let Some(pos) = self.checked.iter().position(|id| *id == habit_id) {
            self.checked.remove(pos);
            false
        } else {
            self.checked.push(habit_id);
            true
        }
    }

    pub fn to_record(&self) -> CompletionRecord {
        CompletionRecord {
            day: self.day,
            total_habits: self.total_habits,
            completed_habits: self.checked.len() as u32,
        }
    }
}
