use async_trait::async_trait;
use log::debug;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use uuid::Uuid;
use crate::backend::errors::classify_failure;
use crate::backend::internal::data::{NewNoteRow, NoteRow, NoteUpdateRow, PasswordGrantBody, RefreshGrantBody, SignUpResponse, TokenResponse, UserData, NOTE_COLUMNS};
use crate::backend::{BackendError, BackendInitError};
use crate::config::app_config::AppConfig;
use crate::data::Credentials;
use crate::lib_constants::{AUTH_API_PATH, REST_API_PATH};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const RETURN_REPRESENTATION: &str = "return=representation";

#[async_trait]
pub(super) trait HostedApiIo: Send + Sync {
    async fn password_grant(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenResponse, BackendError>;

    async fn refresh_grant(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, BackendError>;

    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<SignUpResponse, BackendError>;

    async fn logout(&self, access_token: &str) -> Result<(), BackendError>;

    async fn get_user(
        &self,
        access_token: &str,
    ) -> Result<UserData, BackendError>;

    async fn select_notes(
        &self,
        access_token: &str,
        owner_id: Uuid,
    ) -> Result<Vec<NoteRow>, BackendError>;

    async fn insert_note(
        &self,
        access_token: &str,
        row: &NewNoteRow<'_>,
    ) -> Result<Vec<NoteRow>, BackendError>;

    async fn delete_note(
        &self,
        access_token: &str,
        id: Uuid,
    ) -> Result<Vec<NoteRow>, BackendError>;

    async fn update_note(
        &self,
        access_token: &str,
        id: Uuid,
        row: &NoteUpdateRow<'_>,
    ) -> Result<Vec<NoteRow>, BackendError>;

    fn now(&self) -> OffsetDateTime;
}

pub struct ProductionHostedApiIo {
    client: reqwest::Client,
    api_key: String,
    token_url: Url,
    signup_url: Url,
    logout_url: Url,
    user_url: Url,
    table_url: Url,
}

impl ProductionHostedApiIo {
    pub fn new(app_config: &AppConfig) -> Result<Self, BackendInitError> {
        let join = |base: &Url, path: &str| base
            .join(path)
            .map_err(|e| BackendInitError::Url(format!("{base} + {path}: {e}")));
        let auth_url = join(&app_config.endpoint_url, AUTH_API_PATH)?;
        let rest_url = join(&app_config.endpoint_url, REST_API_PATH)?;
        Ok(
            ProductionHostedApiIo {
                client: reqwest::Client::builder()
                    .timeout(app_config.request_timeout)
                    .user_agent(USER_AGENT)
                    .build()?,
                api_key: app_config.api_key.clone(),
                token_url: join(&auth_url, "token")?,
                signup_url: join(&auth_url, "signup")?,
                logout_url: join(&auth_url, "logout")?,
                user_url: join(&auth_url, "user")?,
                table_url: join(&rest_url, &app_config.notes_table)?,
            }
        )
    }

    // without a user token the api key doubles as the bearer token
    fn request(
        &self,
        method: Method,
        url: &Url,
        access_token: Option<&str>,
    ) -> RequestBuilder {
        self.client
            .request(method, url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(access_token.unwrap_or(&self.api_key))
    }
}

#[async_trait]
impl HostedApiIo for ProductionHostedApiIo {
    async fn password_grant(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenResponse, BackendError> {
        let response = self.request(Method::POST, &self.token_url, None)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrantBody {
                email: &credentials.email,
                password: credentials.password(),
            })
            .send()
            .await?;
        read_json(response).await
    }

    async fn refresh_grant(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, BackendError> {
        let response = self.request(Method::POST, &self.token_url, None)
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshGrantBody { refresh_token })
            .send()
            .await?;
        read_json(response).await
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
    ) -> Result<SignUpResponse, BackendError> {
        let response = self.request(Method::POST, &self.signup_url, None)
            .json(&PasswordGrantBody {
                email: &credentials.email,
                password: credentials.password(),
            })
            .send()
            .await?;
        read_json(response).await
    }

    async fn logout(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .request(Method::POST, &self.logout_url, Some(access_token))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn get_user(
        &self,
        access_token: &str,
    ) -> Result<UserData, BackendError> {
        let response = self
            .request(Method::GET, &self.user_url, Some(access_token))
            .send()
            .await?;
        read_json(response).await
    }

    async fn select_notes(
        &self,
        access_token: &str,
        owner_id: Uuid,
    ) -> Result<Vec<NoteRow>, BackendError> {
        let response = self
            .request(Method::GET, &self.table_url, Some(access_token))
            .query(&[
                ("select", NOTE_COLUMNS.to_owned()),
                ("user_id", format!("eq.{owner_id}")),
                ("order", "created_at.desc".to_owned()),
            ])
            .send()
            .await?;
        read_json(response).await
    }

    async fn insert_note(
        &self,
        access_token: &str,
        row: &NewNoteRow<'_>,
    ) -> Result<Vec<NoteRow>, BackendError> {
        let response = self
            .request(Method::POST, &self.table_url, Some(access_token))
            .query(&[("select", NOTE_COLUMNS)])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[row])
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_note(
        &self,
        access_token: &str,
        id: Uuid,
    ) -> Result<Vec<NoteRow>, BackendError> {
        let response = self
            .request(Method::DELETE, &self.table_url, Some(access_token))
            .query(&[
                ("select", NOTE_COLUMNS.to_owned()),
                ("id", format!("eq.{id}")),
            ])
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update_note(
        &self,
        access_token: &str,
        id: Uuid,
        row: &NoteUpdateRow<'_>,
    ) -> Result<Vec<NoteRow>, BackendError> {
        let response = self
            .request(Method::PATCH, &self.table_url, Some(access_token))
            .query(&[
                ("select", NOTE_COLUMNS.to_owned()),
                ("id", format!("eq.{id}")),
            ])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(row)
            .send()
            .await?;
        read_json(response).await
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response)
    }
    let url = response.url().path().to_owned();
    let body = response.text().await.unwrap_or_default();
    debug!("request to {url} failed with {status}: {body}");
    Err(classify_failure(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
) -> Result<T, BackendError> {
    Ok(check_status(response).await?.json::<T>().await?)
}
