pub mod form;
pub mod schedule;
pub mod text;
