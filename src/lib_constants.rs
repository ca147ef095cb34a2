pub const DEFAULT_MAX_NOTE_LEN: usize = 128 * 1024;

pub const MIN_PASSWORD_LEN: usize = 6;

pub const DEFAULT_TOKEN_REFRESH_MARGIN_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_NOTES_TABLE: &str = "notes";
pub const DEFAULT_DATA_DIRECTORY: &str = ".cloudnotes";

// relative to the data directory
pub const SESSION_FILE_PATH: &str = "session.toml";
pub const SESSION_FILE_READ_BUF_SIZE: usize = 4096;

// relative to the endpoint url
pub const AUTH_API_PATH: &str = "auth/v1/";
pub const REST_API_PATH: &str = "rest/v1/";

pub const SESSION_EVENTS_BUFFER_SIZE: usize = 16;
