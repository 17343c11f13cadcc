use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("unknown system table: '{kind}'")]
    UnknownKind { kind: String },

    #[error("row key '{key}' is not numeric")]
    NonNumericRowKey { key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FixtureError>;
