use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Record store error: {0}")]
    Store(String),

    #[error("Field definitions unavailable: {0}")]
    FieldDefinitions(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for TallyError {
    fn from(e: serde_json::Error) -> Self {
        TallyError::Serialize(e.to_string())
    }
}
