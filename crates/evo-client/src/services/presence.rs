//! Presence indicators

use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::Result;
use crate::http::HttpClient;
use crate::number::format_number;
use crate::types::{ChatPresence, GlobalPresence, PresenceRequest};

#[derive(Debug, Clone, Copy)]
pub struct PresenceService<'a> {
    http: &'a HttpClient,
}

impl<'a> PresenceService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Show "typing..." for `duration_ms`
    pub async fn typing(&self, number: &str, duration_ms: u64) -> Result<Value> {
        self.set(number, ChatPresence::Composing, duration_ms).await
    }

    /// Show "recording audio..." for `duration_ms`
    pub async fn recording(&self, number: &str, duration_ms: u64) -> Result<Value> {
        self.set(number, ChatPresence::Recording, duration_ms).await
    }

    pub async fn paused(&self, number: &str) -> Result<Value> {
        self.set(number, ChatPresence::Paused, 0).await
    }

    /// Set a chat presence. A zero delay is left out of the request.
    pub async fn set(&self, number: &str, state: ChatPresence, delay_ms: u64) -> Result<Value> {
        let body = PresenceRequest {
            number: format_number(number),
            state,
            delay: (delay_ms > 0).then_some(delay_ms),
        };

        debug!(number = %body.number, ?state, delay_ms, "Setting presence");
        self.http
            .post(&format!("/chat/presence/{}", self.http.instance()), &body)
            .await
    }

    pub async fn available(&self) -> Result<Value> {
        self.update_global(GlobalPresence::Available).await
    }

    pub async fn unavailable(&self) -> Result<Value> {
        self.update_global(GlobalPresence::Unavailable).await
    }

    pub async fn update_global(&self, presence: GlobalPresence) -> Result<Value> {
        let body = json!({ "presence": presence });
        self.http
            .post(&format!("/chat/updatePresence/{}", self.http.instance()), &body)
            .await
    }

    /// Show "typing..." and wait. Presence errors are logged and ignored.
    pub async fn simulate_typing(&self, number: &str, seconds: u64) {
        if let Err(e) = self.typing(number, seconds * 1000).await {
            warn!(number = %number, "Typing indicator failed: {}", e);
        }
        tokio::time::sleep(Duration::from_secs(seconds)).await;
    }

    /// Show "recording audio..." and wait. Presence errors are logged and ignored.
    pub async fn simulate_recording(&self, number: &str, seconds: u64) {
        if let Err(e) = self.recording(number, seconds * 1000).await {
            warn!(number = %number, "Recording indicator failed: {}", e);
        }
        tokio::time::sleep(Duration::from_secs(seconds)).await;
    }
}
