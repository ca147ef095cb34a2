use async_trait::async_trait;
use log::{debug, info, trace, warn};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};
use uuid::Uuid;
use crate::backend::{Backend, BackendError};
use crate::data::{NewNote, Note, NoteContent, User};
use crate::session_controller::AuthContext;

mod errors;
mod lifetime;
mod note_cache;
#[cfg(test)] mod tests;

pub use errors::WorkspaceError;
pub use lifetime::ViewLifetime;
pub use note_cache::NoteCache;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Loading,
    Ready,
    Submitting,
}

/// How a workspace action ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionOutcome {
    Applied,
    Failed,
    /// Nothing to do, no backend call was made.
    Skipped,
    /// The view was torn down while the call was in flight.
    Abandoned,
}

/// Asks the user whether a note really should go.
#[async_trait]
pub trait Confirm: Send {
    async fn confirm_delete(&mut self, note: &Note) -> bool;
}

/// The notes list and editor of the signed-in user.
pub struct Workspace<B: Backend> {
    context: AuthContext<B>,
    lifetime: ViewLifetime,
    phase: Phase,
    user: Option<User>,
    notes: NoteCache,
    draft: String,
    error: Option<WorkspaceError>,
    max_note_length: usize,
    clock: fn() -> OffsetDateTime,
}

impl<B: Backend> Workspace<B> {
    pub fn new(context: AuthContext<B>, max_note_length: usize) -> Self {
        Self::with_clock(context, max_note_length, OffsetDateTime::now_utc)
    }

    pub fn with_clock(
        context: AuthContext<B>,
        max_note_length: usize,
        clock: fn() -> OffsetDateTime,
    ) -> Self {
        Workspace {
            context,
            lifetime: ViewLifetime::new(),
            phase: Phase::Loading,
            user: None,
            notes: NoteCache::new(),
            draft: String::new(),
            error: None,
            max_note_length,
            clock,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn notes(&self) -> &NoteCache {
        &self.notes
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn error(&self) -> Option<&WorkspaceError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn lifetime(&self) -> ViewLifetime {
        self.lifetime.clone()
    }

    /// Ends the lifetime: anything still in flight is discarded.
    pub fn tear_down(&self) {
        self.lifetime.end();
    }

    /// Resolves the user and fetches their notes. Always leaves `Loading`.
    pub async fn mount(&mut self) -> ActionOutcome {
        self.phase = Phase::Loading;
        let outcome = self.load().await;
        self.phase = Phase::Ready;
        outcome
    }

    async fn load(&mut self) -> ActionOutcome {
        let backend = self.context.backend();
        let user = match self.lifetime.guard(backend.get_current_user()).await {
            None => return ActionOutcome::Abandoned,
            Some(Err(e)) => return self.fail("resolving the user", e),
            Some(Ok(None)) => {
                debug!("no current user, nothing to list");
                return ActionOutcome::Skipped
            },
            Some(Ok(Some(user))) => user,
        };
        debug!("loading the notes of user {}", user.id);
        let result = self.lifetime.guard(backend.list_notes(user.id)).await;
        self.user = Some(user);
        match result {
            None => ActionOutcome::Abandoned,
            Some(Err(e)) => self.fail("listing notes", e),
            Some(Ok(notes)) => {
                trace!("loaded {} notes", notes.len());
                self.notes.replace(notes);
                ActionOutcome::Applied
            },
        }
    }

    /// Submits the draft. The draft is cleared only once the backend
    /// returns the created note.
    pub async fn create_note(&mut self) -> ActionOutcome {
        if self.phase == Phase::Submitting || self.draft.trim().is_empty() {
            return ActionOutcome::Skipped
        }
        let content = match NoteContent::new(&self.draft, self.max_note_length) {
            Ok(content) => content,
            Err(e) => {
                debug!("not creating the note: {e}");
                self.error = Some(e.into());
                return ActionOutcome::Failed
            },
        };
        let Some(owner_id) = self.user.as_ref().map(|u| u.id) else {
            return self.fail("creating a note", BackendError::NotAuthenticated)
        };

        let new_note = NewNote {
            owner_id,
            content,
            created_at: self.next_created_at(),
        };
        self.error = None;
        let result = {
            let _submitting = Submitting::enter(&mut self.phase);
            self.lifetime
                .guard(self.context.backend().create_note(&new_note))
                .await
        };
        match result {
            None => ActionOutcome::Abandoned,
            Some(Err(e)) => self.fail("creating a note", e),
            Some(Ok(note)) => {
                debug!("created note {}", note.id);
                self.notes.insert(note);
                self.draft.clear();
                ActionOutcome::Applied
            },
        }
    }

    /// The current time, moved past the newest note if the clock is behind.
    fn next_created_at(&self) -> OffsetDateTime {
        let now = (self.clock)();
        match self.notes.newest() {
            Some(newest) if newest.created_at >= now => {
                warn!("the clock is behind the newest note, adjusting the timestamp");
                newest.created_at
                    .checked_add(Duration::MILLISECOND)
                    .unwrap_or_else(|| {
                        warn!("the newest note is at the end of time, keeping the clock");
                        now
                    })
            },
            _ => now,
        }
    }

    pub async fn delete_note(
        &mut self,
        id: Uuid,
        confirm: &mut impl Confirm,
    ) -> ActionOutcome {
        let Some(note) = self.notes.get(id) else {
            debug!("note {id} is not in the list, not deleting");
            return ActionOutcome::Skipped
        };
        if !confirm.confirm_delete(note).await {
            trace!("deletion of note {id} cancelled");
            return ActionOutcome::Skipped
        }
        let result = self.lifetime
            .guard(self.context.backend().delete_note(id))
            .await;
        match result {
            None => ActionOutcome::Abandoned,
            Some(Err(e)) => self.fail("deleting a note", e),
            Some(Ok(())) => {
                debug!("deleted note {id}");
                self.notes.remove(id);
                ActionOutcome::Applied
            },
        }
    }

    /// Signs out and reports it through the context even if the backend
    /// call fails; the backend drops its local session either way.
    pub async fn logout(&mut self) -> ActionOutcome {
        let result = self.lifetime
            .guard(self.context.backend().sign_out())
            .await;
        let outcome = match result {
            None => ActionOutcome::Abandoned,
            Some(Err(e)) => {
                warn!("sign out failed: {e}");
                ActionOutcome::Failed
            },
            Some(Ok(())) => ActionOutcome::Applied,
        };
        info!("signed out");
        self.notes.clear();
        self.context.mark_signed_out();
        self.tear_down();
        outcome
    }

    fn fail(&mut self, action: &str, e: BackendError) -> ActionOutcome {
        warn!("{action} failed: {e}");
        self.error = Some(e.into());
        ActionOutcome::Failed
    }
}

// Puts the workspace back into Ready when a submission ends, even if the
// submitting future is dropped.
struct Submitting<'a>(&'a mut Phase);

impl<'a> Submitting<'a> {
    fn enter(phase: &'a mut Phase) -> Self {
        *phase = Phase::Submitting;
        Submitting(phase)
    }
}

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        *self.0 = Phase::Ready;
    }
}

impl<B: Backend> Drop for Workspace<B> {
    fn drop(&mut self) {
        self.lifetime.end();
    }
}

/// Long form in the given offset, e.g. `15 October 2026, 17:50`.
pub fn format_timestamp(timestamp: OffsetDateTime, offset: UtcOffset) -> String {
    let format = format_description!(
        "[day padding:none] [month repr:long] [year], [hour]:[minute]"
    );
    let local = timestamp.to_offset(offset);
    local.format(format).unwrap_or_else(|_| local.to_string())
}

pub fn count_label(count: usize) -> String {
    match count {
        1 => "1 note".to_owned(),
        n => format!("{n} notes"),
    }
}
