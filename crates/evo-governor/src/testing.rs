//! Test doubles shared by the governor tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::ManualClock;
use crate::config::GovernorConfig;
use crate::error::TransportError;
use crate::governor::SendGovernor;
use crate::transport::{AcceptAll, DeliveryReceipt, MessageTransport, NumberValidator};

#[derive(Default)]
struct TransportState {
    sent: Vec<(String, String)>,
    typing: Vec<(String, u64)>,
    failures: VecDeque<String>,
    attempts: usize,
    fail_typing: bool,
}

/// Transport that records calls and fails on demand
#[derive(Default)]
pub(crate) struct RecordingTransport {
    state: Mutex<TransportState>,
}

impl RecordingTransport {
    /// Queue an error for the next send
    pub fn fail_next(&self, message: &str) {
        self.state.lock().unwrap().failures.push_back(message.to_string());
    }

    pub fn fail_typing(&self) {
        self.state.lock().unwrap().fail_typing = true;
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn typing(&self) -> Vec<(String, u64)> {
        self.state.lock().unwrap().typing.clone()
    }

    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send_text(&self, recipient: &str, text: &str) -> Result<DeliveryReceipt, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;
        if let Some(error) = state.failures.pop_front() {
            return Err(TransportError::new(error));
        }
        state.sent.push((recipient.to_string(), text.to_string()));
        Ok(DeliveryReceipt {
            message_id: Some(format!("msg-{}", state.sent.len())),
        })
    }

    async fn simulate_typing(&self, recipient: &str, seconds: u64) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_typing {
            return Err(TransportError::new("presence endpoint unavailable"));
        }
        state.typing.push((recipient.to_string(), seconds));
        Ok(())
    }
}

/// Validator rejecting a fixed set of addresses, or failing outright
pub(crate) struct ScriptedValidator {
    rejected: Vec<String>,
    error: Option<String>,
}

impl ScriptedValidator {
    pub fn rejecting<'a>(recipients: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            rejected: recipients.into_iter().map(str::to_string).collect(),
            error: None,
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            rejected: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

#[async_trait]
impl NumberValidator for ScriptedValidator {
    async fn exists(&self, recipient: &str) -> Result<bool, TransportError> {
        if let Some(error) = &self.error {
            return Err(TransportError::new(error.clone()));
        }
        Ok(!self.rejected.iter().any(|r| r == recipient))
    }
}

/// 2024-03-04 (a Monday) at `hour`:00 UTC
pub(crate) fn monday_at(hour: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 4, hour, 0, 0)
        .unwrap()
}

/// Generous limits, no delays, no presence, no validation
pub(crate) fn test_config() -> GovernorConfig {
    GovernorConfig {
        per_minute: 100,
        per_hour: 1_000,
        per_day: 1_000,
        delay_min_secs: 0,
        delay_max_secs: 0,
        use_presence: false,
        validate_recipient: false,
        start_hour: 8,
        end_hour: 22,
        allow_sunday: false,
        max_consecutive_failures: 3,
        failure_pause_secs: 300,
    }
}

pub(crate) fn governor_at(
    start: DateTime<FixedOffset>,
    config: GovernorConfig,
) -> (SendGovernor, Arc<RecordingTransport>, Arc<ManualClock>) {
    let transport = Arc::new(RecordingTransport::default());
    let clock = Arc::new(ManualClock::new(start));
    let governor = SendGovernor::new(transport.clone(), Arc::new(AcceptAll), config)
        .unwrap()
        .with_clock(clock.clone())
        .with_rng(StdRng::seed_from_u64(7));
    (governor, transport, clock)
}
