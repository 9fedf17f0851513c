//! Webhook registration and payload parsing

use serde_json::{Value, json};
use tracing::info;

use crate::error::{EvolutionError, Result};
use crate::http::HttpClient;
use crate::types::{WebhookEvent, WebhookSettings};

/// Events subscribed when the caller does not pick any
pub const DEFAULT_WEBHOOK_EVENTS: [&str; 18] = [
    "APPLICATION_STARTUP",
    "QRCODE_UPDATED",
    "MESSAGES_UPSERT",
    "MESSAGES_UPDATE",
    "MESSAGES_DELETE",
    "SEND_MESSAGE",
    "CONTACTS_SET",
    "CONTACTS_UPSERT",
    "CONTACTS_UPDATE",
    "PRESENCE_UPDATE",
    "CHATS_SET",
    "CHATS_UPSERT",
    "CHATS_UPDATE",
    "CHATS_DELETE",
    "GROUPS_UPSERT",
    "GROUP_UPDATE",
    "GROUP_PARTICIPANTS_UPDATE",
    "CONNECTION_UPDATE",
];

fn webhook_settings(url: &str, events: &[&str], enabled: bool) -> WebhookSettings {
    let events = if events.is_empty() {
        &DEFAULT_WEBHOOK_EVENTS[..]
    } else {
        events
    };

    WebhookSettings {
        url: url.to_string(),
        enabled,
        events: events.iter().map(|e| e.to_string()).collect(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WebhookService<'a> {
    http: &'a HttpClient,
}

impl<'a> WebhookService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Register the instance webhook; an empty `events` subscribes to
    /// [`DEFAULT_WEBHOOK_EVENTS`]
    pub async fn set(&self, url: &str, events: &[&str], enabled: bool) -> Result<Value> {
        let body = json!({ "webhook": webhook_settings(url, events, enabled) });

        info!(url = %url, enabled, "Setting instance webhook");
        self.http
            .post(&format!("/webhook/set/{}", self.http.instance()), &body)
            .await
    }

    pub async fn find(&self) -> Result<Value> {
        self.http
            .get(&format!("/webhook/find/{}", self.http.instance()), &[])
            .await
    }

    pub async fn delete(&self) -> Result<Value> {
        self.http
            .delete(&format!("/webhook/delete/{}", self.http.instance()))
            .await
    }

    pub async fn set_global(&self, url: &str, events: &[&str], enabled: bool) -> Result<Value> {
        let body = webhook_settings(url, events, enabled);

        info!(url = %url, enabled, "Setting global webhook");
        self.http.post("/webhook/globalwebhook", &body).await
    }

    pub async fn get_global(&self) -> Result<Value> {
        self.http.get("/webhook/globalwebhook", &[]).await
    }
}

/// Decode a payload received on a webhook endpoint
pub fn parse_webhook(payload: &str) -> Result<WebhookEvent> {
    serde_json::from_str(payload)
        .map_err(|e| EvolutionError::InvalidPayload(format!("failed to decode webhook payload: {}", e)))
}
