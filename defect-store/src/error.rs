use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite failed to open, migrate, read or write
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored payload no longer decodes
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Another thread panicked while holding the connection
    #[error("Store connection lock poisoned")]
    Poisoned,

    /// Key rejected before any I/O
    #[error("Key error: {0}")]
    Key(#[from] recallscope_records::RecordError),

    /// Configuration rejected by validation
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
