use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;
use crate::email_string::EmailString;
use crate::lib_constants::MIN_PASSWORD_LEN;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewNote {
    pub owner_id: Uuid,
    pub content: NoteContent,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    #[error("the note is empty")]
    EmptyContent,

    #[error("the note is longer than {max} bytes")]
    ContentTooLong {
        max: usize,
    },

    #[error("\"{0}\" is not a valid email address")]
    MalformedEmail(String),

    #[error("the password must be at least {min} characters long")]
    PasswordTooShort {
        min: usize,
    },
}

/// Trimmed, non-empty note text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NoteContent(String);

impl NoteContent {
    pub fn new(
        text: &str,
        max_len: usize,
    ) -> Result<NoteContent, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyContent)
        }
        if trimmed.len() > max_len {
            return Err(ValidationError::ContentTooLong { max: max_len })
        }
        Ok(NoteContent(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteContent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    pub email: EmailString,
    password: String,
}

impl Credentials {
    pub fn new(
        email: &str,
        password: &str,
    ) -> Result<Credentials, ValidationError> {
        let email = EmailString::from_str(email.trim())?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(
                ValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN }
            )
        }
        Ok(
            Credentials {
                email,
                password: password.to_owned(),
            }
        )
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
