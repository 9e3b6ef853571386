//! SiteDesk Push Service
//!
//! Delivers notification messages to device tokens with support for:
//! - Firebase Cloud Messaging over HTTP for production
//! - Mock push service for testing and development

pub mod fcm;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Push configuration error: {0}")]
    Configuration(String),

    #[error("Push request error: {0}")]
    Request(String),

    #[error("Push response error: {0}")]
    Response(String),
}

/// Title and body shown on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

impl PushNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Outcome of a multicast send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MulticastReceipt {
    pub success_count: usize,
    pub failure_count: usize,
}

/// Push service configuration.
#[derive(Clone)]
pub struct PushConfig {
    /// Push provider (fcm, mock)
    pub provider: String,
    /// FCM server key
    pub server_key: String,
    /// Base URL for the FCM HTTP API
    pub base_url: String,
}

impl std::fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushConfig")
            .field("provider", &self.provider)
            .field("server_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl PushConfig {
    /// Create push config from environment variables.
    pub fn from_env() -> Result<Self, PushError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("PUSH_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let server_key = std::env::var("FCM_SERVER_KEY").unwrap_or_default();
        let base_url = std::env::var("FCM_BASE_URL")
            .unwrap_or_else(|_| "https://fcm.googleapis.com".to_string());

        if provider == "fcm" && server_key.is_empty() {
            return Err(PushError::Configuration(
                "FCM_SERVER_KEY is required for fcm provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            server_key,
            base_url,
        })
    }
}

/// Push service trait for different implementations.
#[async_trait::async_trait]
pub trait PushService: Send + Sync {
    /// Send one notification to every token in a single request.
    async fn send_multicast(
        &self,
        notification: PushNotification,
        tokens: Vec<String>,
    ) -> Result<MulticastReceipt, PushError>;
}

/// Factory for creating PushService implementations.
pub struct PushServiceFactory;

impl PushServiceFactory {
    pub fn create(config: PushConfig) -> Result<Box<dyn PushService>, PushError> {
        match config.provider.as_str() {
            "fcm" => {
                tracing::info!("Creating FCM push service");
                if config.server_key.is_empty() {
                    return Err(PushError::Configuration(
                        "FCM_SERVER_KEY is required for fcm provider".to_string(),
                    ));
                }
                Ok(Box::new(fcm::FcmClient::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock push service");
                Ok(Box::new(mock::MockPushService::new()))
            }
            provider => Err(PushError::Configuration(format!(
                "Unknown push provider: {}. Supported providers: fcm, mock",
                provider
            ))),
        }
    }
}
