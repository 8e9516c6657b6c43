use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Knowledge store unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Knowledge store at {} is not a JSON object: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Malformed record for '{key}': {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("Text normalizes to an empty signature")]
    EmptyKey,
}
