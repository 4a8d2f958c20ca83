use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoIndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Geo index connection lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, GeoIndexError>;
