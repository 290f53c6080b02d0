use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Calendar-day identifier used to join days and completion records.
///
/// Renders as zero-padded `YYYY-MM-DD`, so string order and chronological
/// order agree.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Day of `dt` in its own timezone.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self(dt.date_naive())
    }

    pub fn today() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// The previous calendar day.
    pub fn pred(&self) -> Self {
        Self(self.0 - Duration::days(1))
    }

    /// The next calendar day.
    pub fn succ(&self) -> Self {
        Self(self.0 + Duration::days(1))
    }

    pub fn days_since(&self, earlier: DayKey) -> i64 {
        (self.0 - earlier.0).num_days()
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|e| anyhow!("Invalid day key '{}': {}", s, e))
    }
}

/// Number of days in the given month, `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Parses a day as typed on the command line, relative to `today`.
///
/// Accepts `today`, `yesterday`, `-Nd` and `YYYY-MM-DD`.
pub fn parse_human_day(input: &str, today: DayKey) -> Result<DayKey> {
    let input = input.trim();

    // 1. Reserved keywords
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yes" => return Ok(today.pred()),
        _ => {}
    }

    // 2. Relative format (-Nd)
    if let Some(rest) = input.strip_prefix('-') {
        if let Some(num_str) = rest.strip_suffix('d') {
            let count: i64 = num_str
                .parse()
                .map_err(|_| anyhow!("Invalid relative day: {}", input))?;
            return Ok(DayKey(today.date() - Duration::days(count)));
        }
    }

    // 3. Fallback to the canonical key format
    input.parse()
}
