use std::path::PathBuf;
use std::time::Duration as StdDuration;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use time::Duration;
use crate::config::app_config::data::AppConfigData;
use crate::config::ConfigError;
use crate::util::StrExt;

pub mod data;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub endpoint_url: Url,
    pub api_key: String,
    pub data_directory: PathBuf,
    pub persist_session: bool,
    pub notes_table: String,
    pub sign_up_session: SignUpSessionPolicy,
    pub token_refresh_margin: Duration,
    pub request_timeout: StdDuration,
    pub max_note_length: usize,
}

/// What to do with a session the service hands out right at sign-up
/// (it does so only when email confirmation is disabled on its side).
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignUpSessionPolicy {
    /// Never sign in as a side effect of signing up.
    #[default]
    Discard,

    /// Treat the returned session as a regular sign-in.
    Adopt,
}

impl TryFrom<AppConfigData> for AppConfig {
    type Error = ConfigError;

    fn try_from(value: AppConfigData) -> Result<Self, Self::Error> {
        let endpoint_url = value.endpoint_url
            .and_then(|v| v.nonblank_to_some())
            .ok_or(ConfigError::Missing("endpoint_url"))?;
        let api_key = value.api_key
            .and_then(|v| v.nonblank_to_some())
            .ok_or(ConfigError::Missing("api_key"))?;
        let notes_table = value.notes_table.trim().to_owned();
        if notes_table.is_empty()
            || !notes_table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::InvalidNotesTable(value.notes_table))
        }
        if value.request_timeout_secs == 0 {
            return Err(ConfigError::Zero("request_timeout_secs"))
        }
        if value.max_note_length == 0 {
            return Err(ConfigError::Zero("max_note_length"))
        }
        Ok(
            AppConfig {
                endpoint_url: parse_endpoint_url(&endpoint_url)?,
                api_key,
                data_directory: value.data_directory,
                persist_session: value.persist_session,
                notes_table,
                sign_up_session: value.sign_up_session,
                token_refresh_margin: Duration::seconds(
                    i64::try_from(value.token_refresh_margin_secs)
                        .unwrap_or(i64::MAX),
                ),
                request_timeout: StdDuration::from_secs(value.request_timeout_secs),
                max_note_length: value.max_note_length,
            }
        )
    }
}

// the api paths are joined onto the endpoint, which needs a trailing slash
// to keep its own path segments
fn parse_endpoint_url(value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEndpointUrl {
            value: value.to_owned(),
            message: e.to_string(),
        })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(
            ConfigError::InvalidEndpointUrl {
                value: value.to_owned(),
                message: "not an http(s) base url".to_owned(),
            }
        )
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
