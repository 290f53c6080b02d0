use crate::model::calendar::{CalendarDay, CompletionRatio, MonthCalendar};
use crate::model::day_map::DayMap;
use crate::time::{days_in_month, DayKey};

/// Read-only calendar lookups over one `DayMap`.
pub struct CalendarProjector<'a> {
    days: &'a DayMap,
    today: DayKey,
}

impl<'a> CalendarProjector<'a> {
    pub fn new(days: &'a DayMap, today: DayKey) -> Self {
        Self { days, today }
    }

    /// Ratio of completed habits on the given day.
    ///
    /// Invalid dates, days after today, days without a record and days with
    /// no habits all give `NoData`.
    pub fn completion_ratio(&self, year: i32, month: u32, day: u32) -> CompletionRatio {
        match DayKey::from_ymd(year, month, day) {
            Some(key) => self.ratio_for(key),
            None => CompletionRatio::NoData,
        }
    }

    pub fn ratio_for(&self, day: DayKey) -> CompletionRatio {
        if day > self.today {
            return CompletionRatio::NoData;
        }
        self.days
            .get(&day)
            .and_then(|tally| tally.ratio())
            .map(CompletionRatio::Ratio)
            .unwrap_or(CompletionRatio::NoData)
    }

    /// One cell per day of the month. An invalid month gives no cells.
    pub fn month(&self, year: i32, month: u32) -> MonthCalendar {
        let days = days_in_month(year, month)
            .map(|count| {
                (1..=count)
                    .map(|day| CalendarDay {
                        day,
                        ratio: self.completion_ratio(year, month, day),
                    })
                    .collect()
            })
            .unwrap_or_default();

        MonthCalendar { year, month, days }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, TotalsPolicy};
    use crate::model::completion::CompletionRecord;

    fn day(m: u32, d: u32) -> DayKey {
        DayKey::from_ymd(2024, m, d).unwrap()
    }

    fn sample() -> DayMap {
        aggregate(
            &[
                CompletionRecord::new(day(2, 27), 4, 1),
                CompletionRecord::new(day(2, 28), 2, 2),
                CompletionRecord::new(day(2, 29), 0, 0),
                CompletionRecord::new(day(3, 1), 2, 0),
            ],
            2,
            TotalsPolicy::Recorded,
        )
        .days
    }

    #[test]
    fn test_empty_map_has_no_data() {
        let days = DayMap::new();
        let projector = CalendarProjector::new(&days, day(3, 1));
        for d in 1..=29 {
            assert!(projector.completion_ratio(2024, 2, d).is_no_data());
        }
    }

    #[test]
    fn test_ratios() {
        let days = sample();
        let projector = CalendarProjector::new(&days, day(3, 1));
        assert_eq!(projector.completion_ratio(2024, 2, 27), CompletionRatio::Ratio(0.25));
        assert_eq!(projector.completion_ratio(2024, 2, 28), CompletionRatio::Ratio(1.0));
        assert_eq!(projector.completion_ratio(2024, 3, 1), CompletionRatio::Ratio(0.0));
    }

    #[test]
    fn test_zero_total_is_no_data() {
        let days = sample();
        let projector = CalendarProjector::new(&days, day(3, 1));
        assert_eq!(projector.completion_ratio(2024, 2, 29), CompletionRatio::NoData);
    }

    #[test]
    fn test_future_and_invalid_days_are_no_data() {
        let days = sample();
        let projector = CalendarProjector::new(&days, day(2, 28));
        assert!(projector.completion_ratio(2024, 3, 1).is_no_data());
        assert!(projector.completion_ratio(2999, 1, 1).is_no_data());
        assert!(projector.completion_ratio(2024, 2, 30).is_no_data());
        assert!(projector.completion_ratio(2024, 13, 1).is_no_data());
        assert!(projector.completion_ratio(1900, 1, 1).is_no_data());
    }

    #[test]
    fn test_month_grid() {
        let days = sample();
        let projector = CalendarProjector::new(&days, day(3, 1));
        let february = projector.month(2024, 2);

        assert_eq!(february.name(), "February");
        assert_eq!(february.days.len(), 29);
        assert_eq!(february.days[26].ratio, CompletionRatio::Ratio(0.25));
        assert_eq!(february.completed_days(), 1);
        assert_eq!(february.average(), Some(0.625));

        assert!(projector.month(2024, 0).days.is_empty());
    }
}
