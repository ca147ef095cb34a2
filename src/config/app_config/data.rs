use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::config::app_config::SignUpSessionPolicy;
use crate::lib_constants::{DEFAULT_DATA_DIRECTORY, DEFAULT_MAX_NOTE_LEN, DEFAULT_NOTES_TABLE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOKEN_REFRESH_MARGIN_SECS};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AppConfigData {
    pub endpoint_url: Option<String>,
    pub api_key: Option<String>,
    pub data_directory: PathBuf,
    pub persist_session: bool,
    pub notes_table: String,
    pub sign_up_session: SignUpSessionPolicy,
    pub token_refresh_margin_secs: u64,
    pub request_timeout_secs: u64,
    pub max_note_length: usize,
}

impl Default for AppConfigData {
    fn default() -> Self {
        AppConfigData {
            endpoint_url: None,
            api_key: None,
            data_directory: PathBuf::from(DEFAULT_DATA_DIRECTORY),
            persist_session: true,
            notes_table: DEFAULT_NOTES_TABLE.to_owned(),
            sign_up_session: SignUpSessionPolicy::default(),
            token_refresh_margin_secs: DEFAULT_TOKEN_REFRESH_MARGIN_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_note_length: DEFAULT_MAX_NOTE_LEN,
        }
    }
}
