use anyhow::Result;
use uuid::Uuid;

use crate::model::checkin::CheckIn;
use crate::model::habit::HabitDefinition;
use crate::time::DayKey;

pub trait HabitRepository {
    fn create(&self, habit: HabitDefinition) -> Result<HabitDefinition>;
    fn get(&self, id: &Uuid) -> Result<HabitDefinition>;
    fn list(&self) -> Result<Vec<HabitDefinition>>;
    fn update(&self, habit: &HabitDefinition) -> Result<()>;
    fn delete(&self, id: &Uuid) -> Result<()>;
}

pub trait CheckInRepository {
    fn get(&self, user: &str, day: DayKey) -> Result<Option<CheckIn>>;
    fn list(&self, user: &str) -> Result<Vec<CheckIn>>;
    fn upsert(&self, checkin: CheckIn) -> Result<()>;
}
