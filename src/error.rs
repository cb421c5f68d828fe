//! Error type for the adapter layer (datamine files, store, reports).
//!
//! The modeling core never returns these: missing or malformed source data
//! shows up as absent fields, not errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unrecognized datamine layout: {0}")]
    Layout(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
