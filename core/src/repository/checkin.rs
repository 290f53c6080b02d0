use std::path::Path;

use anyhow::Result;

use crate::model::checkin::CheckIn;
use crate::repository::json::JsonFile;
use crate::repository::traits::CheckInRepository;
use crate::time::DayKey;

const CHECKINS_FILE_NAME: &str = "checkins.json";

#[derive(Debug, Clone)]
pub struct FileCheckInRepository {
    file: JsonFile,
}

impl FileCheckInRepository {
    pub fn new(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            file: JsonFile::open(data_dir, CHECKINS_FILE_NAME)?,
        })
    }
}

impl CheckInRepository for FileCheckInRepository {
    fn get(&self, user: &str, day: DayKey) -> Result<Option<CheckIn>> {
        let checkins: Vec<CheckIn> = self.file.read()?;
        Ok(checkins
            .into_iter()
            .find(|c| c.user == user && c.day == day))
    }

    fn list(&self, user: &str) -> Result<Vec<CheckIn>> {
        let checkins: Vec<CheckIn> = self.file.read()?;
        Ok(checkins.into_iter().filter(|c| c.user == user).collect())
    }

    // One check-in per (user, day).
    fn upsert(&self, checkin: CheckIn) -> Result<()> {
        let mut checkins: Vec<CheckIn> = self.file.read()?;
        if let Some(pos) = checkins
            .iter()
            .position(|c| c.user == checkin.user && c.day == checkin.day)
        {
            checkins[pos] = checkin;
        } else {
            checkins.push(checkin);
        }
        self.file.write(&checkins)
    }
}
