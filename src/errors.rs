use thiserror::Error;
use uuid::Uuid;

/// Error type that captures store-adapter failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),
    #[error("Entry already exists: {0}")]
    DuplicateEntry(Uuid),
    #[error("Instrument not found: {0}")]
    InstrumentNotFound(Uuid),
    #[error("Storage error: {0}")]
    Storage(String),
}
