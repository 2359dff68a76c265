pub mod clock;
pub mod schedule;
pub mod time_of_day;
pub mod week_day;
