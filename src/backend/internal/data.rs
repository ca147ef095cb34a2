use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use crate::data::{Note, User};
use crate::email_string::EmailString;

#[derive(Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
    pub expires_at: Option<i64>,
    pub user: UserData,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(super) struct UserData {
    pub id: Uuid,

    #[serde(default)]
    pub email: Option<String>,
}

impl From<UserData> for User {
    fn from(value: UserData) -> Self {
        User {
            id: value.id,
            email: value.email.unwrap_or_default(),
        }
    }
}

// a session when the account is usable right away, a bare user otherwise
#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpResponse {
    Session(TokenResponse),
    User(UserData),
}

#[derive(Serialize)]
pub(super) struct PasswordGrantBody<'a> {
    pub email: &'a EmailString,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(super) struct RefreshGrantBody<'a> {
    pub refresh_token: &'a str,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(super) struct NoteRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<NoteRow> for Note {
    fn from(value: NoteRow) -> Self {
        Note {
            id: value.id,
            owner_id: value.user_id,
            content: value.content,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct NewNoteRow<'a> {
    pub user_id: Uuid,
    pub content: &'a str,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub(super) struct NoteUpdateRow<'a> {
    pub content: &'a str,
}

pub(super) const NOTE_COLUMNS: &str = "id,user_id,content,created_at";
