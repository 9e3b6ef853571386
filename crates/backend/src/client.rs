//! Supabase HTTP Client Implementation
//!
//! Talks to GoTrue at `{url}/auth/v1` and PostgREST at `{url}/rest/v1`.
//! The current session is kept in memory and, when a session path is
//! configured, mirrored to disk so a later process can restore it.

use std::path::{Path, PathBuf};

use chrono::Utc;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::claims::read_unverified_claims;
use crate::query::{Filter, Relation, Row, Select};
use crate::realtime::{ChangeEvent, ChangeHub, ChangeKind};
use crate::session::{Session, SessionUser};
use crate::{AuthApi, BackendConfig, BackendError, ChangeFeed, TableApi};

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: SessionUser,
}

/// Error body shapes returned by GoTrue and PostgREST
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self, fallback: String) -> String {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or(fallback)
    }
}

/// Real Supabase client
pub struct SupabaseClient {
    http: reqwest::Client,
    auth_url: String,
    rest_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    session_path: Option<PathBuf>,
    changes: ChangeHub,
}

impl SupabaseClient {
    /// Create a new client, restoring a previously saved session if present.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        if config.url.is_empty() {
            return Err(BackendError::Configuration(
                "Supabase URL must not be empty".to_string(),
            ));
        }
        let base = config.url.trim_end_matches('/');

        let restored = match &config.session_path {
            Some(path) => load_session(path),
            None => None,
        };

        Ok(Self {
            http: reqwest::Client::new(),
            auth_url: format!("{}/auth/v1", base),
            rest_url: format!("{}/rest/v1", base),
            anon_key: config.anon_key,
            session: RwLock::new(restored),
            session_path: config.session_path,
            changes: ChangeHub::new(),
        })
    }

    async fn bearer(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        }
    }

    async fn rest(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer().await)
    }

    async fn store_session(&self, session: Option<Session>) {
        if let Some(path) = &self.session_path {
            let result = match &session {
                Some(s) => match serde_json::to_vec(s) {
                    Ok(bytes) => tokio::fs::write(path, bytes).await,
                    Err(e) => Err(std::io::Error::other(e)),
                },
                None => match tokio::fs::remove_file(path).await {
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    other => other,
                },
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, path = %path.display(), "Failed to persist session");
            }
        }
        *self.session.write().await = session;
    }

    async fn token_request(
        &self,
        grant_type: &str,
        body: Value,
    ) -> Result<Response, BackendError> {
        self.http
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let response = self
            .token_request(
                "refresh_token",
                serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await?;
        let response = check(response).await?;
        session_from_response(response).await
    }

    fn filtered(&self, builder: RequestBuilder, filters: &[Filter]) -> RequestBuilder {
        let params: Vec<(String, String)> = filters
            .iter()
            .map(|f| (f.column.clone(), f.to_postgrest()))
            .collect();
        builder.query(&params)
    }

    fn table_url(&self, relation: Relation) -> String {
        format!("{}/{}", self.rest_url, relation.as_str())
    }
}

#[async_trait::async_trait]
impl AuthApi for SupabaseClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let response = self
            .token_request(
                "password",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED
        {
            tracing::debug!(status = %status, "Password grant rejected");
            return Err(BackendError::InvalidCredentials);
        }

        let session = session_from_response(check(response).await?).await?;
        tracing::info!(user_id = %session.user.id, "Signed in with password");
        self.store_session(Some(session.clone())).await;
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let Some(session) = self.session.read().await.clone() else {
            return Ok(());
        };
        // The local session goes first; the remote call only revokes the refresh token.
        self.store_session(None).await;

        let response = self
            .http
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        match response.status() {
            // Already revoked or expired on the server.
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::NOT_FOUND => Ok(()),
            _ => check(response).await.map(|_| ()),
        }
    }

    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        let Some(current) = self.session.read().await.clone() else {
            return Ok(None);
        };
        if !current.is_expired() {
            return Ok(Some(current));
        }

        tracing::debug!(user_id = %current.user.id, "Stored session expired, refreshing");
        match self.refresh_session(&current.refresh_token).await {
            Ok(session) => {
                self.store_session(Some(session.clone())).await;
                Ok(Some(session))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed, discarding session");
                self.store_session(None).await;
                Ok(None)
            }
        }
    }
}

#[async_trait::async_trait]
impl TableApi for SupabaseClient {
    async fn select(&self, query: Select) -> Result<Vec<Row>, BackendError> {
        let builder = self
            .http
            .get(self.table_url(query.relation))
            .query(&[("select", query.columns.as_str())]);
        let builder = self.filtered(builder, &query.filters);

        let response = self
            .rest(builder)
            .await
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        rows_from_response(check(response).await?).await
    }

    async fn insert(
        &self,
        relation: Relation,
        rows: Vec<Row>,
        returning: &str,
    ) -> Result<Vec<Row>, BackendError> {
        let builder = self
            .http
            .post(self.table_url(relation))
            .query(&[("select", returning)])
            .header("Prefer", "return=representation")
            .json(&rows);

        let response = self
            .rest(builder)
            .await
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let inserted = rows_from_response(check(response).await?).await?;
        self.changes.publish(relation, ChangeKind::Insert);
        Ok(inserted)
    }

    async fn update(
        &self,
        relation: Relation,
        values: Row,
        filters: Vec<Filter>,
    ) -> Result<Vec<Row>, BackendError> {
        let builder = self
            .http
            .patch(self.table_url(relation))
            .header("Prefer", "return=representation")
            .json(&values);
        let builder = self.filtered(builder, &filters);

        let response = self
            .rest(builder)
            .await
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let updated = rows_from_response(check(response).await?).await?;
        self.changes.publish(relation, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete(&self, relation: Relation, filters: Vec<Filter>) -> Result<(), BackendError> {
        let builder = self.filtered(self.http.delete(self.table_url(relation)), &filters);

        let response = self
            .rest(builder)
            .await
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        check(response).await?;
        self.changes.publish(relation, ChangeKind::Delete);
        Ok(())
    }
}

impl ChangeFeed for SupabaseClient {
    fn subscribe(&self, relation: Relation) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe(relation)
    }
}

/// Turn a non-2xx response into `BackendError::Response`
async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let fallback = format!("HTTP {}", status);
    let message = match response.text().await {
        Ok(text) => serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.into_message(fallback.clone()))
            .unwrap_or(if text.is_empty() { fallback } else { text }),
        Err(_) => fallback,
    };
    Err(BackendError::Response {
        status: status.as_u16(),
        message,
    })
}

async fn rows_from_response(response: Response) -> Result<Vec<Row>, BackendError> {
    let text = response
        .text()
        .await
        .map_err(|e| BackendError::Request(e.to_string()))?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
}

async fn session_from_response(response: Response) -> Result<Session, BackendError> {
    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| BackendError::Decode(format!("token response: {}", e)))?;

    let expires_at = token
        .expires_at
        .or_else(|| {
            read_unverified_claims(&token.access_token)
                .ok()
                .and_then(|claims| i64::try_from(claims.exp).ok())
        })
        .or_else(|| token.expires_in.map(|secs| Utc::now().timestamp() + secs));

    Ok(Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at,
        user: token.user,
    })
}

fn load_session(path: &Path) -> Option<Session> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Failed to read saved session");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Ignoring corrupt saved session");
            None
        }
    }
}
