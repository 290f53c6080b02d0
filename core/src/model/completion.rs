use serde::{Deserialize, Serialize};

use crate::error::MalformedRecord;
use crate::time::DayKey;

/// One day's tally of completed habits for a user.
///
/// `total_habits` is optional: records that never stored their own count are
/// backfilled by the aggregator from the current number of habits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub day: DayKey,
    pub total_habits: Option<u32>,
    pub completed_habits: u32,
}

impl CompletionRecord {
    pub fn new(day: DayKey, total_habits: u32, completed_habits: u32) -> Self {
        Self {
            day,
            total_habits: Some(total_habits),
            completed_habits,
        }
    }

    pub fn without_total(day: DayKey, completed_habits: u32) -> Self {
        Self {
            day,
            total_habits: None,
            completed_habits,
        }
    }
}

/// A record as it comes off storage, before required fields are checked.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCompletionRecord {
    pub day: Option<DayKey>,
    pub total_habits: Option<u32>,
    pub completed_habits: Option<u32>,
}

impl TryFrom<RawCompletionRecord> for CompletionRecord {
    type Error = MalformedRecord;

    fn try_from(raw: RawCompletionRecord) -> Result<Self, Self::Error> {
        let day = raw.day.ok_or(MalformedRecord::MissingField("day"))?;
        let completed_habits = raw
            .completed_habits
            .ok_or(MalformedRecord::MissingField("completed_habits"))?;
        Ok(Self {
            day,
            total_habits: raw.total_habits,
            completed_habits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_requires_day_and_completed() {
        let day = DayKey::from_ymd(2024, 6, 1).unwrap();

        let ok = RawCompletionRecord {
            day: Some(day),
            total_habits: None,
            completed_habits: Some(1),
        };
        assert_eq!(
            CompletionRecord::try_from(ok).unwrap(),
            CompletionRecord::without_total(day, 1)
        );

        let no_day = RawCompletionRecord {
            completed_habits: Some(1),
            ..Default::default()
        };
        assert_eq!(
            CompletionRecord::try_from(no_day),
            Err(MalformedRecord::MissingField("day"))
        );

        let no_completed = RawCompletionRecord {
            day: Some(day),
            total_habits: Some(2),
            completed_habits: None,
        };
        assert_eq!(
            CompletionRecord::try_from(no_completed),
            Err(MalformedRecord::MissingField("completed_habits"))
        );
    }

    #[test]
    fn test_raw_record_from_json() {
        let raw: RawCompletionRecord =
            serde_json::from_str(r#"{"day":"2024-06-01","completed_habits":2}"#).unwrap();
        let record = CompletionRecord::try_from(raw).unwrap();
        assert_eq!(record.day.to_string(), "2024-06-01");
        assert_eq!(record.total_habits, None);
    }
}
