use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Record not found: {0}")]
    RecordNotFound(uuid::Uuid),

    #[error("Duplicate upload: content hash {0} already in the ledger")]
    DuplicateUpload(String),

    #[error("Corrupt record row: {0}")]
    CorruptRecord(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
