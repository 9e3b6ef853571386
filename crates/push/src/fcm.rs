//! FCM HTTP Client Implementation
//!
//! POSTs multicast messages to `{base_url}/fcm/send` authenticated with the
//! server key.

use serde::{Deserialize, Serialize};

use crate::{MulticastReceipt, PushConfig, PushError, PushNotification, PushService};

#[derive(Debug, Serialize)]
struct MulticastRequest<'a> {
    registration_ids: &'a [String],
    notification: &'a PushNotification,
}

#[derive(Debug, Deserialize)]
struct MulticastResponse {
    #[serde(default)]
    success: usize,
    #[serde(default)]
    failure: usize,
}

/// Real FCM client.
pub struct FcmClient {
    http: reqwest::Client,
    send_url: String,
    server_key: String,
}

impl FcmClient {
    pub fn new(config: PushConfig) -> Self {
        let send_url = format!("{}/fcm/send", config.base_url.trim_end_matches('/'));
        Self {
            http: reqwest::Client::new(),
            send_url,
            server_key: config.server_key,
        }
    }
}

#[async_trait::async_trait]
impl PushService for FcmClient {
    async fn send_multicast(
        &self,
        notification: PushNotification,
        tokens: Vec<String>,
    ) -> Result<MulticastReceipt, PushError> {
        if tokens.is_empty() {
            return Ok(MulticastReceipt::default());
        }

        let response = self
            .http
            .post(&self.send_url)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&MulticastRequest {
                registration_ids: &tokens,
                notification: &notification,
            })
            .send()
            .await
            .map_err(|e| PushError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(PushError::Response(format!(
                "FCM returned {}: {}",
                status, body
            )));
        }

        let body: MulticastResponse = response
            .json()
            .await
            .map_err(|e| PushError::Response(format!("Malformed FCM response: {}", e)))?;

        tracing::debug!(
            success = body.success,
            failure = body.failure,
            "FCM multicast sent"
        );
        Ok(MulticastReceipt {
            success_count: body.success,
            failure_count: body.failure,
        })
    }
}
