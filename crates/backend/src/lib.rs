//! SiteDesk Backend Collaborator
//!
//! Everything the dashboard needs from its hosted backend:
//! - Password sign-in, sign-out and session lookup (Supabase GoTrue)
//! - Equality-filtered select/insert/update/delete over named relations (PostgREST)
//! - Per-relation change notifications for refetch-on-change views
//! - An in-memory mock backend for tests and offline development

pub mod claims;
pub mod client;
pub mod mock;
pub mod query;
pub mod realtime;
pub mod session;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

pub use claims::SupabaseClaims;
pub use query::{Filter, Relation, Row, Select};
pub use realtime::{ChangeEvent, ChangeHub, ChangeKind};
pub use session::{Session, SessionUser};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Backend configuration error: {0}")]
    Configuration(String),

    #[error("Backend request error: {0}")]
    Request(String),

    #[error("Backend returned {status}: {message}")]
    Response { status: u16, message: String },

    #[error("Malformed backend data: {0}")]
    Decode(String),

    #[error("Expected at most one row from {relation}, got {count}")]
    Cardinality { relation: Relation, count: usize },
}

impl From<BackendError> for sitedesk_common::Error {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InvalidCredentials => {
                sitedesk_common::Error::Authentication(err.to_string())
            }
            BackendError::Configuration(msg) => sitedesk_common::Error::Internal(msg),
            other => sitedesk_common::Error::Query(other.to_string()),
        }
    }
}

/// Backend configuration
#[derive(Clone)]
pub struct BackendConfig {
    /// Backend provider (supabase, mock)
    pub provider: String,
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anon key sent as `apikey`
    pub anon_key: String,
    /// Where the client keeps its session between runs
    pub session_path: Option<PathBuf>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field("session_path", &self.session_path)
            .finish()
    }
}

impl BackendConfig {
    /// Create backend config from environment variables
    pub fn from_env() -> Result<Self, BackendError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("BACKEND_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let url = std::env::var("SUPABASE_URL").unwrap_or_default();
        let anon_key = std::env::var("SUPABASE_ANON_KEY").unwrap_or_default();
        let session_path = std::env::var("SUPABASE_SESSION_FILE").ok().map(PathBuf::from);

        if provider == "supabase" && (url.is_empty() || anon_key.is_empty()) {
            return Err(BackendError::Configuration(
                "SUPABASE_URL and SUPABASE_ANON_KEY are required for the supabase provider"
                    .to_string(),
            ));
        }

        Ok(Self {
            provider,
            url,
            anon_key,
            session_path,
        })
    }
}

/// Authentication half of the backend contract
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange email + password for a session
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError>;

    /// Terminate the current session
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// The current session, if one exists and has not expired
    async fn get_session(&self) -> Result<Option<Session>, BackendError>;
}

/// Tabular half of the backend contract
#[async_trait::async_trait]
pub trait TableApi: Send + Sync {
    async fn select(&self, query: Select) -> Result<Vec<Row>, BackendError>;

    /// Insert rows and return them projected through `returning`
    async fn insert(
        &self,
        relation: Relation,
        rows: Vec<Row>,
        returning: &str,
    ) -> Result<Vec<Row>, BackendError>;

    /// Merge `values` into every row matching `filters`; returns updated rows
    async fn update(
        &self,
        relation: Relation,
        values: Row,
        filters: Vec<Filter>,
    ) -> Result<Vec<Row>, BackendError>;

    async fn delete(&self, relation: Relation, filters: Vec<Filter>) -> Result<(), BackendError>;
}

/// Change notifications per relation
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, relation: Relation) -> broadcast::Receiver<ChangeEvent>;
}

/// The full backend collaborator
pub trait Backend: AuthApi + TableApi + ChangeFeed {}

impl<T: AuthApi + TableApi + ChangeFeed> Backend for T {}

/// Backend factory
pub struct BackendFactory;

impl BackendFactory {
    /// Create backend based on configuration
    pub fn create(config: BackendConfig) -> Result<Arc<dyn Backend>, BackendError> {
        match config.provider.as_str() {
            "supabase" => {
                tracing::info!(url = %config.url, "Creating Supabase backend client");
                Ok(Arc::new(client::SupabaseClient::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating in-memory mock backend");
                Ok(Arc::new(mock::MockBackend::new()))
            }
            provider => Err(BackendError::Configuration(format!(
                "Unknown backend provider: {}. Supported providers: supabase, mock",
                provider
            ))),
        }
    }
}
