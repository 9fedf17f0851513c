//! evo-governor: client-side send governor for WhatsApp gateways
//!
//! Throttles outbound messages with rolling minute/hour/day quotas, keeps
//! sends inside business hours, paces them with random delays and typing
//! simulation, and backs off when failures suggest the account is being
//! flagged. The gateway itself is reached through the [`MessageTransport`]
//! and [`NumberValidator`] traits.

pub mod batch;
pub mod clock;
pub mod config;
pub mod detect;
pub mod error;
pub mod governor;
pub mod history;
pub mod stats;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchProgress, PauseReason};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{GovernorConfig, GovernorConfigUpdate, Profile};
pub use detect::{BlockDetector, KeywordBlockDetector};
pub use error::{GovernorError, QuotaWindow, Result, SendError, TransportError};
pub use governor::{SendGovernor, SendOptions, SendOutcome, SendReceipt};
pub use history::{SendHistory, SendRecord};
pub use stats::{GovernorStats, RunningStats};
pub use transport::{AcceptAll, DeliveryReceipt, MessageTransport, NumberValidator};

// Re-exported so callers can cancel without depending on tokio-util directly
pub use tokio_util::sync::CancellationToken;
