pub mod habit_service;
