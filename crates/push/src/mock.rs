//! Mock Push Service Implementation
//!
//! Records multicast sends in memory for test assertions.
//! Thread-safe via `Arc<Mutex<>>`.

use std::sync::{Arc, Mutex};

use crate::{MulticastReceipt, PushError, PushNotification, PushService};

/// A recorded multicast send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMulticast {
    pub notification: PushNotification,
    pub tokens: Vec<String>,
}

#[derive(Debug, Default)]
struct MockPushState {
    sent: Vec<SentMulticast>,
    failure: Option<String>,
}

/// Mock push service that records sends for test assertions.
#[derive(Debug, Clone, Default)]
pub struct MockPushService {
    state: Arc<Mutex<MockPushState>>,
}

impl MockPushService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return all recorded sends.
    pub fn sent(&self) -> Vec<SentMulticast> {
        self.state
            .lock()
            .expect("push lock poisoned: prior test panicked")
            .sent
            .clone()
    }

    /// Every send fails with `message` until reset.
    pub fn fail_with(&self, message: &str) {
        self.state
            .lock()
            .expect("push lock poisoned: prior test panicked")
            .failure = Some(message.to_string());
    }

    pub fn reset(&self) {
        let mut state = self
            .state
            .lock()
            .expect("push lock poisoned: prior test panicked");
        state.sent.clear();
        state.failure = None;
    }
}

#[async_trait::async_trait]
impl PushService for MockPushService {
    async fn send_multicast(
        &self,
        notification: PushNotification,
        tokens: Vec<String>,
    ) -> Result<MulticastReceipt, PushError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| PushError::Request(format!("push lock poisoned: {e}")))?;
        if let Some(message) = &state.failure {
            return Err(PushError::Response(message.clone()));
        }

        tracing::debug!(
            title = %notification.title,
            count = tokens.len(),
            "Mock push: recording multicast"
        );
        let receipt = MulticastReceipt {
            success_count: tokens.len(),
            failure_count: 0,
        };
        state.sent.push(SentMulticast {
            notification,
            tokens,
        });
        Ok(receipt)
    }
}
