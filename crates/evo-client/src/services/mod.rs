//! Evolution API endpoint groups
//!
//! Each service borrows the shared [`HttpClient`](crate::http::HttpClient)
//! and is handed out by [`EvolutionClient`](crate::client::EvolutionClient).

pub mod contact;
pub mod group;
pub mod instance;
pub mod message;
pub mod presence;
pub mod webhook;

pub use contact::ContactService;
pub use group::GroupService;
pub use instance::InstanceService;
pub use message::MessageService;
pub use presence::PresenceService;
pub use webhook::{DEFAULT_WEBHOOK_EVENTS, WebhookService, parse_webhook};
