pub mod calendar;
pub mod checkin;
pub mod completion;
pub mod day_map;
pub mod habit;
