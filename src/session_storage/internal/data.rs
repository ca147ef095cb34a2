use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use crate::backend::Session;
use crate::data::User;

#[derive(Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub(super) struct SessionData {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,

    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl From<SessionData> for Session {
    fn from(value: SessionData) -> Self {
        Session {
            user: User {
                id: value.user_id,
                email: value.email,
            },
            access_token: value.access_token,
            refresh_token: value.refresh_token,
            expires_at: value.expires_at,
        }
    }
}

impl From<&Session> for SessionData {
    fn from(value: &Session) -> Self {
        SessionData {
            user_id: value.user.id,
            email: value.user.email.clone(),
            access_token: value.access_token.clone(),
            refresh_token: value.refresh_token.clone(),
            expires_at: value.expires_at,
        }
    }
}
