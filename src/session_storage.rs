mod internal;
mod errors;

use async_trait::async_trait;
use crate::backend::Session;

pub use errors::*;
pub use internal::{MemorySessionStorage, ProductionSessionStorage};

/// Where the backend keeps the session between runs.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> Result<Option<Session>, SessionStorageError>;

    async fn store(&self, session: &Session) -> Result<(), SessionStorageError>;

    /// Succeeds if there's nothing to clear.
    async fn clear(&self) -> Result<(), SessionStorageError>;
}
