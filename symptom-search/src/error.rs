use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid search configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
