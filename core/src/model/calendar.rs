use serde::{Deserialize, Serialize};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Completion ratio for a calendar cell.
///
/// `NoData` is distinct from `Ratio(0.0)`: nothing was recorded, or there
/// was nothing to do.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum CompletionRatio {
    Ratio(f64),
    NoData,
}

impl CompletionRatio {
    pub fn value(&self) -> Option<f64> {
        match self {
            CompletionRatio::Ratio(r) => Some(*r),
            CompletionRatio::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, CompletionRatio::NoData)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub day: u32,
    pub ratio: CompletionRatio,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthCalendar {
    pub fn name(&self) -> &'static str {
        self.month
            .checked_sub(1)
            .and_then(|i| MONTH_NAMES.get(i as usize))
            .copied()
            .unwrap_or("")
    }

    /// Days with every habit done.
    pub fn completed_days(&self) -> usize {
        self.days
            .iter()
            .filter(|d| d.ratio == CompletionRatio::Ratio(1.0))
            .count()
    }

    /// Mean ratio over days that have data.
    pub fn average(&self) -> Option<f64> {
        let values: Vec<f64> = self.days.iter().filter_map(|d| d.ratio.value()).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}
