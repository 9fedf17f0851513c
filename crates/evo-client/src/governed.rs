//! Governor collaborators backed by the Evolution API

use std::sync::Arc;

use async_trait::async_trait;
use evo_governor::{
    DeliveryReceipt, GovernorConfig, MessageTransport, NumberValidator, SendGovernor,
    TransportError,
};

use crate::client::EvolutionClient;
use crate::error::Result;
use crate::types::message_id;

#[async_trait]
impl MessageTransport for EvolutionClient {
    async fn send_text(&self, recipient: &str, text: &str) -> std::result::Result<DeliveryReceipt, TransportError> {
        let response = self.message().send_text(recipient, text).await?;
        Ok(DeliveryReceipt {
            message_id: message_id(&response).map(str::to_string),
        })
    }

    /// Emits `composing` for `seconds`; the governor does the waiting
    async fn simulate_typing(&self, recipient: &str, seconds: u64) -> std::result::Result<(), TransportError> {
        self.presence().typing(recipient, seconds * 1000).await?;
        Ok(())
    }
}

#[async_trait]
impl NumberValidator for EvolutionClient {
    async fn exists(&self, recipient: &str) -> std::result::Result<bool, TransportError> {
        let results = self.contact().check_exists(&[recipient]).await?;
        Ok(results.first().is_some_and(|r| r.exists))
    }
}

impl EvolutionClient {
    /// Wrap this client in a governor that uses it as both transport and
    /// validator
    pub fn into_governor(self, config: GovernorConfig) -> Result<SendGovernor> {
        let client = Arc::new(self);
        Ok(SendGovernor::new(client.clone(), client, config)?)
    }
}
