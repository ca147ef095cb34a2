use async_trait::async_trait;
use uuid::Uuid;
use crate::data::{Credentials, NewNote, Note, NoteContent, User};

mod errors;
mod events;
mod internal;
mod model;

pub use errors::{BackendError, BackendInitError};
pub use events::{SessionEvents, SessionSubscription};
pub use internal::{HostedBackend, ProductionBackend};
pub use model::{AuthEvent, Session, SignUpOutcome};

/// The hosted service as seen by the application: its identity service
/// and the notes table, with row-level access control enforced on its side.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn get_current_session(
        &self,
    ) -> Result<Option<Session>, BackendError>;

    /// Dropping the returned subscription unsubscribes.
    fn subscribe_to_session_changes(&self) -> SessionSubscription;

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, BackendError>;

    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<SignUpOutcome, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    async fn get_current_user(&self) -> Result<Option<User>, BackendError>;

    /// Newest first.
    async fn list_notes(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<Note>, BackendError>;

    async fn create_note(
        &self,
        note: &NewNote,
    ) -> Result<Note, BackendError>;

    async fn delete_note(&self, id: Uuid) -> Result<(), BackendError>;

    async fn update_note(
        &self,
        id: Uuid,
        content: &NoteContent,
    ) -> Result<Note, BackendError>;
}
