//! evo-client: Evolution API (WhatsApp gateway) REST client
//!
//! Typed access to the instance, message, contact, group, presence and
//! webhook endpoints, settings loading, and the [`evo_governor`]
//! collaborator traits implemented on [`EvolutionClient`] so sends can be
//! paced by a [`SendGovernor`](evo_governor::SendGovernor).

pub mod client;
pub mod error;
pub mod governed;
pub mod http;
pub mod number;
pub mod services;
pub mod settings;
pub mod types;

pub use client::{EvolutionClient, QuickStart};
pub use error::{EvolutionError, Result};
pub use http::HttpClient;
pub use number::format_number;
pub use services::{
    ContactService, DEFAULT_WEBHOOK_EVENTS, GroupService, InstanceService, MessageService,
    PresenceService, WebhookService, parse_webhook,
};
pub use settings::{ApiSettings, Settings};
pub use types::*;
