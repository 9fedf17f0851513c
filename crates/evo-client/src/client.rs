//! Evolution API client facade

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::http::HttpClient;
use crate::services::{
    ContactService, GroupService, InstanceService, MessageService, PresenceService, WebhookService,
};
use crate::settings::{ApiSettings, Settings};
use crate::types::connection_state;

/// Connection state reported for a paired instance
pub const STATE_OPEN: &str = "open";

/// Result of [`EvolutionClient::quick_start`]
#[derive(Debug, Clone, PartialEq)]
pub enum QuickStart {
    /// The instance was already paired; carries the connection state
    AlreadyConnected(Value),
    /// The instance was created and a pairing started
    Created { created: Value, connection: Value },
}

/// Entry point to every service of one gateway instance
#[derive(Debug, Clone)]
pub struct EvolutionClient {
    http: HttpClient,
    settings: ApiSettings,
}

impl EvolutionClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        settings.validate()?;
        let http = HttpClient::new(&settings)?;
        Ok(Self { http, settings })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.api.clone())
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn instance_name(&self) -> &str {
        &self.settings.instance
    }

    pub fn instance(&self) -> InstanceService<'_> {
        InstanceService::new(&self.http)
    }

    pub fn message(&self) -> MessageService<'_> {
        MessageService::new(&self.http)
    }

    pub fn contact(&self) -> ContactService<'_> {
        ContactService::new(&self.http)
    }

    pub fn group(&self) -> GroupService<'_> {
        GroupService::new(&self.http)
    }

    pub fn presence(&self) -> PresenceService<'_> {
        PresenceService::new(&self.http)
    }

    pub fn webhook(&self) -> WebhookService<'_> {
        WebhookService::new(&self.http)
    }

    /// Make sure the configured instance exists and is pairing
    ///
    /// Returns the connection state when the instance is already open.
    /// Otherwise (including when the state cannot be read) the instance is
    /// created with `settings` and a connection is started.
    pub async fn quick_start(&self, settings: Map<String, Value>) -> Result<QuickStart> {
        let name = self.instance_name();

        match self.instance().connection_state(name).await {
            Ok(state) if connection_state(&state) == Some(STATE_OPEN) => {
                info!(instance = %name, "Instance already connected");
                return Ok(QuickStart::AlreadyConnected(state));
            }
            Ok(state) => {
                debug!(instance = %name, state = ?connection_state(&state), "Instance not open");
            }
            Err(e) => {
                warn!(instance = %name, "Could not read connection state: {}", e);
            }
        }

        let created = self.instance().create(name, settings).await?;
        let connection = self.instance().connect(name).await?;

        info!(instance = %name, "Instance created, pairing started");
        Ok(QuickStart::Created { created, connection })
    }

    /// Whether the instance reports state `open`. Errors count as disconnected.
    pub async fn is_connected(&self) -> bool {
        match self.instance().connection_state(self.instance_name()).await {
            Ok(state) => connection_state(&state) == Some(STATE_OPEN),
            Err(e) => {
                debug!("Connection state unavailable: {}", e);
                false
            }
        }
    }

    pub async fn send_quick_message(&self, number: &str, text: &str) -> Result<Value> {
        self.message().send_text(number, text).await
    }

    /// Whether `number` has a WhatsApp account. Errors count as `false`.
    pub async fn check_number(&self, number: &str) -> bool {
        match self.contact().check_exists(&[number]).await {
            Ok(results) => results.first().is_some_and(|r| r.exists),
            Err(e) => {
                debug!(number = %number, "Number check failed: {}", e);
                false
            }
        }
    }
}
