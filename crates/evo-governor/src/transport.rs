//! Collaborators the governor sends through
//!
//! Implement these against whatever gateway actually delivers messages.

use async_trait::async_trait;

use crate::error::TransportError;

/// What the transport reports back for a delivered message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Gateway-assigned message id, if the gateway returned one
    pub message_id: Option<String>,
}

/// Outbound message channel
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Deliver a text message
    async fn send_text(
        &self,
        recipient: &str,
        text: &str,
    ) -> Result<DeliveryReceipt, TransportError>;

    /// Show a typing indicator to the recipient for `seconds`
    ///
    /// Only emits the indicator; the governor does the waiting.
    async fn simulate_typing(&self, recipient: &str, seconds: u64) -> Result<(), TransportError>;
}

/// Destination address check
#[async_trait]
pub trait NumberValidator: Send + Sync {
    /// Whether the address exists on the network
    async fn exists(&self, recipient: &str) -> Result<bool, TransportError>;
}

/// Validator that accepts every address
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

#[async_trait]
impl NumberValidator for AcceptAll {
    async fn exists(&self, _recipient: &str) -> Result<bool, TransportError> {
        Ok(true)
    }
}
