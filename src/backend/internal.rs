use async_trait::async_trait;
use log::{debug, info, trace, warn};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;
use crate::backend::{AuthEvent, Backend, BackendError, BackendInitError, Session, SessionEvents, SessionSubscription, SignUpOutcome};
use crate::config::app_config::{AppConfig, SignUpSessionPolicy};
use crate::data::{Credentials, NewNote, Note, NoteContent, User};
use crate::session_storage::SessionStorage;
use data::{NewNoteRow, NoteUpdateRow, SignUpResponse, TokenResponse};
use io_trait::{HostedApiIo, ProductionHostedApiIo};

mod data;
mod io_trait;

// used when the service omits the expiry or sends one out of range
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

pub type ProductionBackend = HostedBackend<ProductionHostedApiIo>;

#[allow(private_bounds)]
pub struct HostedBackend<Io: HostedApiIo> {
    io: Io,
    storage: Box<dyn SessionStorage>,
    // held across refreshes, so that concurrent callers don't refresh twice
    session: Mutex<Option<Session>>,
    events: SessionEvents,
    refresh_margin: Duration,
    sign_up_session: SignUpSessionPolicy,
}

impl ProductionBackend {
    pub fn new(
        app_config: &AppConfig,
        storage: Box<dyn SessionStorage>,
    ) -> Result<ProductionBackend, BackendInitError> {
        debug!("creating a backend for {}", app_config.endpoint_url);
        Ok(
            Self::new_internal(
                ProductionHostedApiIo::new(app_config)?,
                storage,
                app_config.token_refresh_margin,
                app_config.sign_up_session,
            )
        )
    }
}

#[allow(private_bounds)]
impl<Io: HostedApiIo> HostedBackend<Io> {
    fn new_internal(
        io: Io,
        storage: Box<dyn SessionStorage>,
        refresh_margin: Duration,
        sign_up_session: SignUpSessionPolicy,
    ) -> HostedBackend<Io> {
        HostedBackend {
            io,
            storage,
            session: Mutex::new(None),
            events: SessionEvents::new(),
            refresh_margin,
            sign_up_session,
        }
    }

    fn make_session(&self, token: TokenResponse) -> Session {
        let now = self.io.now();
        let expires_at = token.expires_at
            .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
            .or_else(|| {
                let expires_in = token.expires_in?;
                let expiry = now.checked_add(Duration::seconds(expires_in));
                if expiry.is_none() {
                    warn!("ignoring an out of range token lifetime of {expires_in}s");
                }
                expiry
            })
            .or_else(|| now.checked_add(Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS)))
            .unwrap_or(now);
        Session {
            user: token.user.into(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
        }
    }

    async fn adopt_session(
        &self,
        current: &mut Option<Session>,
        token: TokenResponse,
        make_event: fn(Session) -> AuthEvent,
    ) -> Session {
        let session = self.make_session(token);
        debug!(
            "adopting a session for user {} valid until {}",
            session.user.id,
            session.expires_at,
        );
        if let Err(e) = self.storage.store(&session).await {
            warn!("failed to persist the session: {e}");
        }
        *current = Some(session.clone());
        self.events.emit(make_event(session.clone()));
        session
    }

    async fn drop_session(&self, current: &mut Option<Session>) {
        if let Some(session) = current.take() {
            debug!("dropping the session for user {}", session.user.id);
        }
        if let Err(e) = self.storage.clear().await {
            warn!("failed to remove the persisted session: {e}");
        }
        self.events.emit(AuthEvent::SignedOut);
    }

    async fn load_persisted(&self) -> Option<Session> {
        self.storage
            .load()
            .await
            .unwrap_or_else(|e| {
                warn!("ignoring the persisted session: {e}");
                None
            })
    }

    /// The current session, refreshed if it is about to expire.
    async fn fresh_session(
        &self,
        current: &mut Option<Session>,
    ) -> Result<Option<Session>, BackendError> {
        if current.is_none() {
            *current = self.load_persisted().await;
        }
        let Some(session) = current.clone() else {
            return Ok(None)
        };
        let now = self.io.now();
        if !session.expires_within(now, self.refresh_margin) {
            return Ok(Some(session))
        }
        debug!("session for user {} is about to expire, refreshing", session.user.id);
        match self.io.refresh_grant(&session.refresh_token).await {
            Ok(token) => Ok(Some(
                self.adopt_session(current, token, AuthEvent::TokenRefreshed).await
            )),
            Err(e) if e.is_session_lost() => {
                info!("the service rejected the session refresh: {e}");
                self.drop_session(current).await;
                Ok(None)
            },
            Err(e) if session.expires_at > now => {
                warn!("token refresh failed, using the current token: {e}");
                Ok(Some(session))
            },
            Err(e) => Err(e),
        }
    }

    async fn access_token(&self) -> Result<String, BackendError> {
        let mut current = self.session.lock().await;
        self.fresh_session(&mut current)
            .await?
            .map(|session| session.access_token)
            .ok_or(BackendError::NotAuthenticated)
    }

    async fn forget_rejected_session(&self, e: &BackendError) {
        if e.is_session_lost() {
            info!("the service no longer accepts the session: {e}");
            self.drop_session(&mut *self.session.lock().await).await;
        }
    }
}

#[allow(private_bounds)]
#[async_trait]
impl<Io: HostedApiIo + 'static> Backend for HostedBackend<Io> {
    async fn get_current_session(
        &self,
    ) -> Result<Option<Session>, BackendError> {
        trace!("checking for a live session");
        let mut current = self.session.lock().await;
        self.fresh_session(&mut current).await
    }

    fn subscribe_to_session_changes(&self) -> SessionSubscription {
        self.events.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, BackendError> {
        debug!("signing in as \"{}\"", credentials.email);
        let token = self.io.password_grant(credentials).await?;
        let mut current = self.session.lock().await;
        Ok(self.adopt_session(&mut current, token, AuthEvent::SignedIn).await)
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<SignUpOutcome, BackendError> {
        debug!("signing up as \"{}\"", credentials.email);
        match self.io.sign_up(credentials).await? {
            SignUpResponse::User(user) => {
                debug!("user {} awaits email confirmation", user.id);
                Ok(SignUpOutcome::ConfirmationRequired)
            },
            SignUpResponse::Session(token) => match self.sign_up_session {
                SignUpSessionPolicy::Adopt => {
                    let mut current = self.session.lock().await;
                    Ok(
                        SignUpOutcome::SignedIn(
                            self.adopt_session(
                                &mut current,
                                token,
                                AuthEvent::SignedIn,
                            ).await
                        )
                    )
                },
                SignUpSessionPolicy::Discard => {
                    debug!("discarding the session returned by sign-up");
                    if let Err(e) = self.io.logout(&token.access_token).await {
                        warn!("failed to revoke the sign-up session: {e}");
                    }
                    Ok(SignUpOutcome::Created)
                },
            },
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let mut current = self.session.lock().await;
        if current.is_none() {
            *current = self.load_persisted().await;
        }
        let result = match current.as_ref() {
            Some(session) => {
                debug!("signing out user {}", session.user.id);
                self.io.logout(&session.access_token).await
            },
            None => Ok(()),
        };
        // local state goes regardless of what the service says
        self.drop_session(&mut current).await;
        match result {
            Err(e) if e.is_session_lost() => Ok(()),
            result => result,
        }
    }

    async fn get_current_user(&self) -> Result<Option<User>, BackendError> {
        let access_token = {
            let mut current = self.session.lock().await;
            match self.fresh_session(&mut current).await? {
                Some(session) => session.access_token,
                None => return Ok(None),
            }
        };
        match self.io.get_user(&access_token).await {
            Ok(user) => Ok(Some(user.into())),
            Err(e) if e.is_session_lost() => {
                self.forget_rejected_session(&e).await;
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    async fn list_notes(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<Note>, BackendError> {
        debug!("listing notes of user {owner_id}");
        let access_token = self.access_token().await?;
        let rows = self.io
            .select_notes(&access_token, owner_id)
            .await
            .inspect_err(|e| trace!("listing notes failed: {e}"))?;
        let mut notes: Vec<Note> = rows.into_iter().map(Note::from).collect();
        if !notes.is_sorted_by(|a, b| a.created_at >= b.created_at) {
            warn!("the service returned notes out of order, sorting locally");
            notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        trace!("listed {} notes of user {owner_id}", notes.len());
        Ok(notes)
    }

    async fn create_note(
        &self,
        note: &NewNote,
    ) -> Result<Note, BackendError> {
        debug!("creating a note for user {}", note.owner_id);
        let access_token = self.access_token().await?;
        let rows = self.io
            .insert_note(
                &access_token,
                &NewNoteRow {
                    user_id: note.owner_id,
                    content: note.content.as_str(),
                    created_at: note.created_at,
                },
            )
            .await?;
        rows.into_iter()
            .next()
            .map(Note::from)
            .ok_or_else(|| BackendError::UnexpectedResponse(
                "the created note was not returned".to_owned()
            ))
    }

    async fn delete_note(&self, id: Uuid) -> Result<(), BackendError> {
        debug!("deleting note {id}");
        let access_token = self.access_token().await?;
        let rows = self.io.delete_note(&access_token, id).await?;
        if rows.is_empty() {
            debug!("note {id} was already gone");
        }
        Ok(())
    }

    async fn update_note(
        &self,
        id: Uuid,
        content: &NoteContent,
    ) -> Result<Note, BackendError> {
        debug!("updating note {id}");
        let access_token = self.access_token().await?;
        self.io
            .update_note(
                &access_token,
                id,
                &NoteUpdateRow { content: content.as_str() },
            )
            .await?
            .into_iter()
            .next()
            .map(Note::from)
            .ok_or(BackendError::NotFound)
    }
}
