use std::sync::Arc;
use log::{debug, info, trace, warn};
use tokio::sync::watch;
use crate::backend::{AuthEvent, Backend, SessionSubscription};
use crate::data::User;


#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionState {
    Loading,
    Unauthenticated,
    Authenticated(User),
}

impl SessionState {
    pub fn view(&self) -> View {
        match self {
            SessionState::Loading => View::Loading,
            SessionState::Unauthenticated => View::Authenticator,
            SessionState::Authenticated(_) => View::Workspace,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum View {
    Loading,
    Authenticator,
    Workspace,
}

/// The backend handle plus the session state cell, shared by the
/// controller and whichever view is active.
pub struct AuthContext<B: Backend> {
    backend: Arc<B>,
    state: Arc<watch::Sender<SessionState>>,
}

impl<B: Backend> Clone for AuthContext<B> {
    fn clone(&self) -> Self {
        AuthContext {
            backend: self.backend.clone(),
            state: self.state.clone(),
        }
    }
}

impl<B: Backend> AuthContext<B> {
    fn new(backend: Arc<B>) -> Self {
        AuthContext {
            backend,
            state: Arc::new(watch::Sender::new(SessionState::Loading)),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn mark_authenticated(&self, user: User) {
        trace!("marking user {} as authenticated", user.id);
        self.state.send_replace(SessionState::Authenticated(user));
    }

    pub fn mark_signed_out(&self) {
        trace!("marking the session as signed out");
        self.state.send_replace(SessionState::Unauthenticated);
    }
}

/// Owns the top-level authentication state and keeps it in step with the
/// backend's session notifications.
pub struct SessionController<B: Backend> {
    context: AuthContext<B>,
    subscription: Option<SessionSubscription>,
}

impl<B: Backend> SessionController<B> {
    /// Subscribes right away, so nothing emitted during [`Self::start`]
    /// is missed.
    pub fn new(backend: Arc<B>) -> Self {
        let subscription = backend.subscribe_to_session_changes();
        SessionController {
            context: AuthContext::new(backend),
            subscription: Some(subscription),
        }
    }

    /// Resolves the initial `Loading` state.
    pub async fn start(&mut self) {
        debug!("checking for a live session");
        match self.context.backend().get_current_session().await {
            Ok(Some(session)) => {
                info!("resuming the session of {}", session.user.email);
                self.context.mark_authenticated(session.user);
            },
            Ok(None) => {
                debug!("no live session");
                self.context.mark_signed_out();
            },
            Err(e) => {
                warn!("session check failed, continuing signed out: {e}");
                self.context.mark_signed_out();
            },
        }
        self.process_pending_events();
    }

    pub fn apply_event(&self, event: &AuthEvent) {
        debug!("session event: {event:?}");
        match event {
            AuthEvent::SignedIn(session) |
                AuthEvent::TokenRefreshed(session)
            => self.context.mark_authenticated(session.user.clone()),

            AuthEvent::SignedOut => self.context.mark_signed_out(),
        }
    }

    /// Applies every event that has already arrived.
    pub fn process_pending_events(&mut self) {
        while let Some(event) = self.subscription
            .as_mut()
            .and_then(SessionSubscription::try_next_event)
        {
            self.apply_event(&event);
        }
    }

    /// Waits for the next session notification, applies it and returns the
    /// resulting view. `None` once the controller is shut down or the
    /// backend is gone. Cancel safe.
    pub async fn next_change(&mut self) -> Option<View> {
        let event = self.subscription.as_mut()?.next_event().await?;
        self.apply_event(&event);
        Some(self.view())
    }

    pub fn view(&self) -> View {
        self.context.state.borrow().view()
    }

    pub fn state(&self) -> SessionState {
        self.context.state()
    }

    pub fn context(&self) -> &AuthContext<B> {
        &self.context
    }

    /// Releases the session subscription.
    pub fn shutdown(&mut self) {
        if self.subscription.take().is_some() {
            debug!("session controller shut down");
        }
    }
}
