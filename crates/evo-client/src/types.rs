//! Evolution API request and response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Text message request
#[derive(Debug, Clone, Serialize)]
pub struct SendTextRequest {
    pub number: String,
    pub text: String,
    /// Extra gateway options (`delay`, `linkPreview`, ...)
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Audio,
    Document,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMediaRequest {
    pub number: String,
    pub mediatype: MediaType,
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_message: Option<MediaMessage>,
}

/// Contact card attached to a contact message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCard {
    pub full_name: String,
    pub wuid: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub row_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

/// Per-chat presence indicator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatPresence {
    Composing,
    Recording,
    Paused,
}

/// Account-wide presence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GlobalPresence {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresenceRequest {
    pub number: String,
    pub state: ChatPresence,
    /// Milliseconds; omitted when zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantAction {
    Add,
    Remove,
    Promote,
    Demote,
}

/// One entry of a `whatsappNumbers` lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NumberExists {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub jid: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

/// Webhook registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSettings {
    pub url: String,
    pub enabled: bool,
    pub events: Vec<String>,
}

/// Event delivered by the gateway to a webhook endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event name, e.g. `messages.upsert`
    pub event: String,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub data: Value,
    /// Remaining top-level fields (`date_time`, `sender`, `server_url`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `state` of a connectionState response, if present
pub fn connection_state(response: &Value) -> Option<&str> {
    response
        .pointer("/instance/state")
        .or_else(|| response.get("state"))
        .and_then(Value::as_str)
}

/// Message id of a send response (`key.id`)
pub fn message_id(response: &Value) -> Option<&str> {
    response.pointer("/key/id").and_then(Value::as_str)
}
