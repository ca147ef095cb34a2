use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Every failure reported by the hosted service, classified. The raw
/// service message is kept only where it explains what the user can fix.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BackendError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("the email address has not been confirmed yet")]
    EmailNotConfirmed,

    #[error("an account with this email already exists")]
    UserAlreadyExists,

    #[error("the password is too weak: {0}")]
    WeakPassword(String),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("the session has expired, sign in again")]
    SessionExpired,

    #[error("access denied")]
    AccessDenied,

    #[error("not found")]
    NotFound,

    #[error("too many requests, try again later")]
    RateLimited,

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("the service is unavailable (status {0})")]
    ServiceUnavailable(u16),

    #[error("service error (status {status}): {message}")]
    Service {
        status: u16,
        message: String,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response from the service: {0}")]
    UnexpectedResponse(String),
}

impl BackendError {
    /// The service no longer accepts the credentials or tokens at hand.
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            BackendError::InvalidCredentials
                | BackendError::NotAuthenticated
                | BackendError::SessionExpired
        )
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::UnexpectedResponse(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendInitError {
    #[error("cannot build the http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("cannot derive the api url: {0}")]
    Url(String),
}

// union of the auth service, the table service and the oauth error shapes
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorBody {
    error_code: Option<String>,
    code: Option<Value>,
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

pub(crate) fn classify_failure(status: u16, body: &str) -> BackendError {
    let body: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = body.msg
        .or(body.message)
        .or(body.error_description)
        .or_else(|| body.error.clone())
        .unwrap_or_else(|| "no details".to_owned());
    let code = body.error_code
        .or(match body.code {
            Some(Value::String(code)) => Some(code),
            _ => None,
        })
        .or(body.error);
    if let Some(error) = code.and_then(|code| classify_code(&code, &message)) {
        return error
    }
    match status {
        401 => BackendError::NotAuthenticated,
        403 => BackendError::AccessDenied,
        404 => BackendError::NotFound,
        400 | 409 | 422 => BackendError::Rejected(message),
        429 => BackendError::RateLimited,
        500..=599 => BackendError::ServiceUnavailable(status),
        _ => BackendError::Service { status, message },
    }
}

fn classify_code(code: &str, message: &str) -> Option<BackendError> {
    Some(
        match code {
            "invalid_credentials" | "invalid_grant" =>
                BackendError::InvalidCredentials,
            "email_not_confirmed" =>
                BackendError::EmailNotConfirmed,
            "user_already_exists" | "email_exists" =>
                BackendError::UserAlreadyExists,
            "weak_password" =>
                BackendError::WeakPassword(message.to_owned()),
            "over_request_rate_limit" | "over_email_send_rate_limit" =>
                BackendError::RateLimited,
            "no_authorization" =>
                BackendError::NotAuthenticated,
            "bad_jwt" | "session_not_found" | "session_expired"
                | "refresh_token_not_found" | "refresh_token_already_used"
                | "PGRST301" | "PGRST303" =>
                BackendError::SessionExpired,
            // insufficient_privilege, raised by row-level security
            "42501" =>
                BackendError::AccessDenied,
            _ => return None,
        }
    )
}
