use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not obtain a database connection: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored schedule could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),
}
