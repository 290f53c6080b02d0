use std::path::Path;

use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::model::habit::HabitDefinition;
use crate::repository::json::JsonFile;
use crate::repository::traits::HabitRepository;

const HABITS_FILE_NAME: &str = "habits.json";

#[derive(Debug, Clone)]
pub struct FileHabitRepository {
    file: JsonFile,
}

impl FileHabitRepository {
    pub fn new(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            file: JsonFile::open(data_dir, HABITS_FILE_NAME)?,
        })
    }
}

impl HabitRepository for FileHabitRepository {
    fn create(&self, habit: HabitDefinition) -> Result<HabitDefinition> {
        let mut habits: Vec<HabitDefinition> = self.file.read()?;
        habits.push(habit.clone());
        self.file.write(&habits)?;
        Ok(habit)
    }

    fn get(&self, id: &Uuid) -> Result<HabitDefinition> {
        let habits: Vec<HabitDefinition> = self.file.read()?;
        habits
            .into_iter()
            .find(|h| h.id == *id)
            .ok_or_else(|| anyhow!("Habit with ID {} not found", id))
    }

    fn list(&self) -> Result<Vec<HabitDefinition>> {
        self.file.read()
    }

    fn update(&self, habit: &HabitDefinition) -> Result<()> {
        let mut habits: Vec<HabitDefinition> = self.file.read()?;
        if let Some(pos) = habits.iter().position(|h| h.id == habit.id) {
            habits[pos] = habit.clone();
            self.file.write(&habits)
        } else {
            Err(anyhow!("Habit with ID {} not found", habit.id))
        }
    }

    fn delete(&self, id: &Uuid) -> Result<()> {
        let mut habits: Vec<HabitDefinition> = self.file.read()?;
        let initial_len = habits.len();
        habits.retain(|h| h.id != *id);

        if habits.len() == initial_len {
            return Err(anyhow!("Habit with ID {} not found", id));
        }

        self.file.write(&habits)
    }
}
