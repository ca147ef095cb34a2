use std::fmt;
use std::fmt::Formatter;
use time::{Duration, OffsetDateTime};
use crate::data::User;

#[derive(Clone, Eq, PartialEq)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub fn expires_within(
        &self,
        now: OffsetDateTime,
        margin: Duration,
    ) -> bool {
        self.expires_at
            .checked_sub(margin)
            .is_none_or(|refresh_at| refresh_at <= now)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

impl AuthEvent {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(session) |
                AuthEvent::TokenRefreshed(session)
            => Some(session),

            AuthEvent::SignedOut => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SignUpOutcome {
    /// The account exists but can't be used until the emailed link is followed.
    ConfirmationRequired,

    /// The account is usable, the user still has to sign in.
    Created,

    SignedIn(Session),
}
