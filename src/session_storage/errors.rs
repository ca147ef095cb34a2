use std::io::Error as IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("invalid session file contents: {0}")]
    Parsing(#[from] toml::de::Error),

    #[error("serializing the session info failed: {0}")]
    Serialization(#[from] toml::ser::Error),
}
