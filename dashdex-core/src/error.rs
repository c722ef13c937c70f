use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashdexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Footage root unavailable: {0}")]
    RootUnavailable(String),

    #[error("Index store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DashdexError>;
