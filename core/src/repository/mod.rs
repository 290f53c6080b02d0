pub mod checkin;
pub mod file;
mod json;
pub mod traits;

// Re-export
pub use checkin::FileCheckInRepository;
pub use file::FileHabitRepository;
pub use traits::{CheckInRepository, HabitRepository};
