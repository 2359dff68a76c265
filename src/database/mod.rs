pub mod error;
pub mod sqlite;
