use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use async_trait::async_trait;
use log::trace;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use crate::lib_constants::{SESSION_FILE_PATH, SESSION_FILE_READ_BUF_SIZE};
use crate::session_storage::SessionStorageError;

#[async_trait]
pub(super) trait SessionStorageIo: Send + Sync {
    async fn read_session_file(
        &self,
    ) -> Result<Option<String>, SessionStorageError>;

    async fn write_session_file(
        &self,
        contents: &str,
    ) -> Result<(), SessionStorageError>;

    async fn remove_session_file(&self) -> Result<(), SessionStorageError>;
}

pub struct ProductionSessionStorageIo {
    session_file: PathBuf,
    temp_file: PathBuf,
}

impl ProductionSessionStorageIo {
    pub async fn new(
        data_directory: impl AsRef<Path> + Send,
    ) -> Result<Self, SessionStorageError> {
        let data_directory = data_directory.as_ref();
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(data_directory)
            .await?;
        let session_file = data_directory.join(SESSION_FILE_PATH);
        let mut temp_file = session_file.clone().into_os_string();
        temp_file.push(".tmp");
        Ok(
            ProductionSessionStorageIo {
                session_file,
                temp_file: temp_file.into(),
            }
        )
    }
}

#[async_trait]
impl SessionStorageIo for ProductionSessionStorageIo {
    async fn read_session_file(
        &self,
    ) -> Result<Option<String>, SessionStorageError> {
        let mut file = match fs::File::open(&self.session_file).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("no session file at {}", self.session_file.display());
                return Ok(None)
            },
            Err(e) => return Err(e.into()),
        };
        let mut read_buf = String::with_capacity(SESSION_FILE_READ_BUF_SIZE);
        file.read_to_string(&mut read_buf).await?;
        Ok(Some(read_buf))
    }

    async fn write_session_file(
        &self,
        contents: &str,
    ) -> Result<(), SessionStorageError> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600)
            .open(&self.temp_file)
            .await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&self.temp_file, &self.session_file).await?;
        Ok(())
    }

    async fn remove_session_file(&self) -> Result<(), SessionStorageError> {
        match fs::remove_file(&self.session_file).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Keeps the session for the lifetime of the process only.
pub struct MemorySessionStorageIo {
    contents: Mutex<Option<String>>,
}

impl MemorySessionStorageIo {
    pub fn new() -> Self {
        MemorySessionStorageIo {
            contents: Mutex::new(None),
        }
    }

    fn contents(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // a panic while holding the lock can't leave a half-written string
        self.contents.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionStorageIo for MemorySessionStorageIo {
    async fn read_session_file(
        &self,
    ) -> Result<Option<String>, SessionStorageError> {
        Ok(self.contents().clone())
    }

    async fn write_session_file(
        &self,
        contents: &str,
    ) -> Result<(), SessionStorageError> {
        *self.contents() = Some(contents.to_owned());
        Ok(())
    }

    async fn remove_session_file(&self) -> Result<(), SessionStorageError> {
        *self.contents() = None;
        Ok(())
    }
}
