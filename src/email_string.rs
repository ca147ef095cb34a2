use std::fmt;
use std::fmt::Formatter;
use std::ops::Deref;
use std::str::FromStr;
use serde::{Serialize, Serializer};
use crate::data::ValidationError;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EmailString(String);

impl FromStr for EmailString {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_well_formed(s) {
            Ok(EmailString(s.to_owned()))
        } else {
            Err(ValidationError::MalformedEmail(s.to_owned()))
        }
    }
}

// roughly what an `<input type="email">` accepts
fn is_well_formed(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(|c| c.is_whitespace() || c.is_control())
        && domain.contains('.')
        && domain.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

impl Deref for EmailString {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0[..]
    }
}

impl fmt::Display for EmailString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for EmailString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
