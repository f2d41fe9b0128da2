use thiserror::Error;

use crate::models::SectionHandle;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Section {0:?} does not exist")]
    UnknownSection(SectionHandle),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;
