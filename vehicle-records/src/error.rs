use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Year did not parse as a positive integer, or make/model was blank.
    #[error("Invalid vehicle key: {reason}")]
    InvalidKey { reason: String },
}

impl RecordError {
    pub(crate) fn invalid_key(reason: impl Into<String>) -> Self {
        RecordError::InvalidKey {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
