use std::path::Path;
use async_trait::async_trait;
use log::{debug, trace};
use crate::backend::Session;
use crate::session_storage::{SessionStorage, SessionStorageError};
use data::SessionData;
use io_trait::{MemorySessionStorageIo, ProductionSessionStorageIo, SessionStorageIo};

mod data;
mod io_trait;

#[allow(private_bounds)]
pub struct SessionStorageImpl<Io: SessionStorageIo> {
    io: Io,
}

pub type ProductionSessionStorage = SessionStorageImpl<ProductionSessionStorageIo>;

pub type MemorySessionStorage = SessionStorageImpl<MemorySessionStorageIo>;

impl ProductionSessionStorage {
    pub async fn new(
        data_directory: impl AsRef<Path> + Send,
    ) -> Result<ProductionSessionStorage, SessionStorageError> {
        debug!(
            "keeping the session in {}",
            data_directory.as_ref().display(),
        );
        Ok(
            SessionStorageImpl {
                io: ProductionSessionStorageIo::new(data_directory).await?,
            }
        )
    }
}

impl MemorySessionStorage {
    pub fn new() -> MemorySessionStorage {
        SessionStorageImpl {
            io: MemorySessionStorageIo::new(),
        }
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(private_bounds)]
#[async_trait]
impl<Io: SessionStorageIo> SessionStorage for SessionStorageImpl<Io> {
    async fn load(&self) -> Result<Option<Session>, SessionStorageError> {
        let Some(contents) = self.io.read_session_file().await? else {
            return Ok(None)
        };
        let data: SessionData = toml::de::from_str(&contents)?;
        trace!("loaded the session of user {}", data.user_id);
        Ok(Some(data.into()))
    }

    async fn store(&self, session: &Session) -> Result<(), SessionStorageError> {
        trace!("storing the session of user {}", session.user.id);
        self.io
            .write_session_file(&toml::to_string(&SessionData::from(session))?)
            .await
    }

    async fn clear(&self) -> Result<(), SessionStorageError> {
        trace!("clearing the stored session");
        self.io.remove_session_file().await
    }
}
