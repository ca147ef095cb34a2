use log::{debug, info};
use crate::backend::{Backend, SignUpOutcome};
use crate::data::{Credentials, User};
use crate::session_controller::AuthContext;

mod errors;

pub use errors::AuthError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> AuthMode {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}

/// Success messages of a registration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Notice {
    CheckEmail,
    AccountCreated,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthOutcome {
    Authenticated(User),
    ConfirmationRequired,
    AccountCreated,
    Rejected,
}

/// The login/registration form.
#[derive(Debug, Default)]
pub struct Authenticator {
    mode: AuthMode,
    error: Option<AuthError>,
    notice: Option<Notice>,
}

impl Authenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn error(&self) -> Option<&AuthError> {
        self.error.as_ref()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    /// Clears the messages even if the mode stays the same.
    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
        self.notice = None;
    }

    /// The form is busy for as long as the returned future is pending.
    /// Dropping it abandons the request and leaves the form usable.
    pub async fn submit<B: Backend>(
        &mut self,
        context: &AuthContext<B>,
        email: &str,
        password: &str,
    ) -> AuthOutcome {
        self.error = None;
        self.notice = None;
        let credentials = match Credentials::new(email, password) {
            Ok(credentials) => credentials,
            Err(e) => {
                debug!("rejecting the form: {e}");
                self.error = Some(e.into());
                return AuthOutcome::Rejected
            },
        };

        match self.mode {
            AuthMode::Login => self.sign_in(context, &credentials).await,
            AuthMode::Register => self.sign_up(context, &credentials).await,
        }
    }

    async fn sign_in<B: Backend>(
        &mut self,
        context: &AuthContext<B>,
        credentials: &Credentials,
    ) -> AuthOutcome {
        match context.backend().sign_in_with_password(credentials).await {
            Ok(session) => {
                info!("signed in as {}", session.user.email);
                context.mark_authenticated(session.user.clone());
                AuthOutcome::Authenticated(session.user)
            },
            Err(e) => {
                debug!("sign in failed: {e}");
                self.error = Some(e.into());
                AuthOutcome::Rejected
            },
        }
    }

    async fn sign_up<B: Backend>(
        &mut self,
        context: &AuthContext<B>,
        credentials: &Credentials,
    ) -> AuthOutcome {
        match context.backend().sign_up(credentials).await {
            Ok(SignUpOutcome::ConfirmationRequired) => {
                info!("registered {}, awaiting confirmation", credentials.email);
                self.notice = Some(Notice::CheckEmail);
                AuthOutcome::ConfirmationRequired
            },
            Ok(SignUpOutcome::Created) => {
                info!("registered {}", credentials.email);
                self.notice = Some(Notice::AccountCreated);
                self.mode = AuthMode::Login;
                AuthOutcome::AccountCreated
            },
            Ok(SignUpOutcome::SignedIn(session)) => {
                info!("registered and signed in as {}", session.user.email);
                context.mark_authenticated(session.user.clone());
                AuthOutcome::Authenticated(session.user)
            },
            Err(e) => {
                debug!("sign up failed: {e}");
                self.error = Some(e.into());
                AuthOutcome::Rejected
            },
        }
    }
}
