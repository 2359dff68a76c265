pub mod availability;
pub mod notice;
