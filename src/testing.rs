use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use rand::Rng;
use time::OffsetDateTime;
use tokio::sync::Notify;
use uuid::{Uuid, Variant, Version};
use crate::backend::{AuthEvent, Backend, BackendError, Session, SessionEvents, SessionSubscription, SignUpOutcome};
use crate::data::{Credentials, NewNote, Note, NoteContent, User};
use crate::terminal::Console;

pub fn make_uuid() -> Uuid {
    uuid::Builder::from_random_bytes(rand::rng().random())
        .with_variant(Variant::RFC4122)
        .with_version(Version::Random)
        .into_uuid()
}

pub struct FakeAccount {
    pub user: User,
    pub password: String,
}

#[derive(Default)]
pub struct FakeState {
    pub accounts: Vec<FakeAccount>,
    pub session: Option<Session>,
    pub notes: Vec<Note>,
    /// `Created` when unset
    pub confirm_sign_ups: bool,
    pub failures: HashMap<&'static str, BackendError>,
    pub calls: Vec<&'static str>,
    gates: HashMap<&'static str, Arc<Notify>>,
}

/// In-memory backend for view and controller tests.
pub struct FakeBackend {
    state: Mutex<FakeState>,
    events: SessionEvents,
}

impl FakeBackend {
    pub fn new() -> Self {
        FakeBackend {
            state: Mutex::new(FakeState {
                confirm_sign_ups: true,
                ..FakeState::default()
            }),
            events: SessionEvents::new(),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn add_account(&self, email: &str, password: &str) -> User {
        let user = User {
            id: make_uuid(),
            email: email.to_owned(),
        };
        self.state().accounts.push(FakeAccount {
            user: user.clone(),
            password: password.to_owned(),
        });
        user
    }

    /// Starts the backend with a live session, no event is emitted.
    pub fn sign_in_silently(&self, user: &User) -> Session {
        let session = make_session(user.clone());
        self.state().session = Some(session.clone());
        session
    }

    pub fn add_note(
        &self,
        owner: &User,
        content: &str,
        created_at: OffsetDateTime,
    ) -> Note {
        let note = Note {
            id: make_uuid(),
            owner_id: owner.id,
            content: content.to_owned(),
            created_at,
        };
        self.state().notes.push(note.clone());
        note
    }

    pub fn fail_next(&self, call: &'static str, error: BackendError) {
        self.state().failures.insert(call, error);
    }

    /// The next `call` waits until the returned gate is notified.
    pub fn hold_next(&self, call: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state().gates.insert(call, gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, call: &'static str) -> usize {
        self.state().calls.iter().filter(|c| **c == call).count()
    }

    pub fn emit(&self, event: AuthEvent) {
        self.state().session = event.session().cloned();
        self.events.emit(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    async fn begin(&self, call: &'static str) -> Result<(), BackendError> {
        let gate = {
            let mut state = self.state();
            state.calls.push(call);
            if let Some(e) = state.failures.remove(call) {
                return Err(e)
            }
            state.gates.remove(call)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(())
    }

    fn session_user(&self) -> Result<User, BackendError> {
        self.state()
            .session
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or(BackendError::NotAuthenticated)
    }
}

fn make_session(user: User) -> Session {
    Session {
        user,
        access_token: "fake-access".to_owned(),
        refresh_token: "fake-refresh".to_owned(),
        expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn get_current_session(
        &self,
    ) -> Result<Option<Session>, BackendError> {
        self.begin("get_current_session").await?;
        Ok(self.state().session.clone())
    }

    fn subscribe_to_session_changes(&self) -> SessionSubscription {
        self.events.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, BackendError> {
        self.begin("sign_in_with_password").await?;
        let user = self.state()
            .accounts
            .iter()
            .find(|a| {
                a.user.email == *credentials.email
                    && a.password == credentials.password()
            })
            .map(|a| a.user.clone())
            .ok_or(BackendError::InvalidCredentials)?;
        let session = make_session(user);
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<SignUpOutcome, BackendError> {
        self.begin("sign_up").await?;
        let mut state = self.state();
        if state.accounts.iter().any(|a| a.user.email == *credentials.email) {
            return Err(BackendError::UserAlreadyExists)
        }
        state.accounts.push(FakeAccount {
            user: User {
                id: make_uuid(),
                email: credentials.email.to_string(),
            },
            password: credentials.password().to_owned(),
        });
        Ok(
            if state.confirm_sign_ups {
                SignUpOutcome::ConfirmationRequired
            } else {
                SignUpOutcome::Created
            }
        )
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let result = self.begin("sign_out").await;
        self.emit(AuthEvent::SignedOut);
        result
    }

    async fn get_current_user(&self) -> Result<Option<User>, BackendError> {
        self.begin("get_current_user").await?;
        Ok(self.state().session.as_ref().map(|s| s.user.clone()))
    }

    async fn list_notes(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<Note>, BackendError> {
        self.begin("list_notes").await?;
        let user = self.session_user()?;
        let mut notes: Vec<Note> = self.state()
            .notes
            .iter()
            .filter(|n| n.owner_id == owner_id && n.owner_id == user.id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn create_note(
        &self,
        note: &NewNote,
    ) -> Result<Note, BackendError> {
        self.begin("create_note").await?;
        let user = self.session_user()?;
        if note.owner_id != user.id {
            return Err(BackendError::AccessDenied)
        }
        let created = Note {
            id: make_uuid(),
            owner_id: note.owner_id,
            content: note.content.to_string(),
            created_at: note.created_at,
        };
        self.state().notes.push(created.clone());
        Ok(created)
    }

    async fn delete_note(&self, id: Uuid) -> Result<(), BackendError> {
        self.begin("delete_note").await?;
        let user = self.session_user()?;
        self.state().notes.retain(|n| n.id != id || n.owner_id != user.id);
        Ok(())
    }

    async fn update_note(
        &self,
        id: Uuid,
        content: &NoteContent,
    ) -> Result<Note, BackendError> {
        self.begin("update_note").await?;
        let user = self.session_user()?;
        let mut state = self.state();
        let note = state.notes
            .iter_mut()
            .find(|n| n.id == id && n.owner_id == user.id)
            .ok_or(BackendError::NotFound)?;
        note.content = content.to_string();
        Ok(note.clone())
    }
}

/// Feeds prepared lines and records everything written.
pub struct ScriptedConsole {
    pub input: VecDeque<String>,
    pub output: String,
}

impl ScriptedConsole {
    pub fn new<'a>(lines: impl IntoIterator<Item=&'a str>) -> Self {
        ScriptedConsole {
            input: lines.into_iter().map(str::to_owned).collect(),
            output: String::new(),
        }
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    async fn read_password(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }
}
