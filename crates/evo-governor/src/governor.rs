//! The send governor
//!
//! Every outbound message goes through [`SendGovernor::send`], which runs
//! the checks in a fixed order and stops at the first one that fails:
//!
//! 1. rolling quotas (minute, hour, day) over successful sends
//! 2. allowed hours and Sunday rule
//! 3. recipient validation, when enabled
//! 4. random pacing delay
//! 5. typing indicator and typing delay, when enabled
//! 6. the actual send, with block detection and the failure cooldown
//!
//! `send` takes `&mut self`, so one governor never has two sends in flight.
//! All waits race against the governor's cancellation token.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{GovernorConfig, GovernorConfigUpdate};
use crate::detect::{BlockDetector, KeywordBlockDetector};
use crate::error::{QuotaWindow, Result, SendError, TransportError};
use crate::history::{SendHistory, SendRecord};
use crate::stats::{GovernorStats, RunningStats};
use crate::transport::{MessageTransport, NumberValidator};

/// Typing speed used for presence simulation, in characters per minute
const TYPING_CHARS_PER_MINUTE: u64 = 200;
const MIN_TYPING_SECS: u64 = 2;
const MAX_TYPING_SECS: u64 = 8;

/// Per-call overrides of the governor config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub use_presence: Option<bool>,
    pub validate_recipient: Option<bool>,
}

/// A message the transport accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub recipient: String,
    pub message_id: Option<String>,
    pub sent_at: DateTime<FixedOffset>,
}

/// Result of one governed send
pub type SendOutcome = std::result::Result<SendReceipt, SendError>;

/// Rate limiter and pacer in front of a `MessageTransport`
pub struct SendGovernor {
    transport: Arc<dyn MessageTransport>,
    validator: Arc<dyn NumberValidator>,
    pub(crate) config: GovernorConfig,
    history: SendHistory,
    pub(crate) stats: RunningStats,
    clock: Arc<dyn Clock>,
    pub(crate) rng: Box<dyn RngCore + Send + Sync>,
    detector: Box<dyn BlockDetector>,
    pub(crate) cancel: CancellationToken,
}

impl SendGovernor {
    /// Create a governor on the system clock with an entropy-seeded RNG
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        validator: Arc<dyn NumberValidator>,
        config: GovernorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let stats = RunningStats::new(clock.now());

        Ok(Self {
            transport,
            validator,
            config,
            history: SendHistory::new(),
            stats,
            clock,
            rng: Box::new(StdRng::from_entropy()),
            detector: Box::new(KeywordBlockDetector::default()),
            cancel: CancellationToken::new(),
        })
    }

    /// Use another clock; restarts the stats run at the clock's current time
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.stats = RunningStats::new(clock.now());
        self.clock = clock;
        self
    }

    /// Use another random source for delays and message variation
    pub fn with_rng(mut self, rng: impl RngCore + Send + Sync + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn NumberValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_block_detector(mut self, detector: impl BlockDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Tie the governor's waits to an external token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts any pause this governor is in, and all later ones
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Merge new values into the config; invalid results are rejected
    pub fn set_limits(&mut self, update: &GovernorConfigUpdate) -> Result<()> {
        self.config = self.config.merged(update)?;
        info!(config = ?self.config, "governor limits updated");
        Ok(())
    }

    /// Replace the whole config
    pub fn set_config(&mut self, config: GovernorConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Send one message through every check
    ///
    /// Never panics and never surfaces transport errors other than as
    /// the returned outcome.
    pub async fn send(&mut self, recipient: &str, message: &str, options: &SendOptions) -> SendOutcome {
        if self.cancel.is_cancelled() {
            return Err(SendError::Cancelled);
        }

        // One snapshot for the whole call, so a config swap never tears
        let config = self.config.clone();
        let now = self.clock.now();

        self.check_quota(&config, now)?;
        check_schedule(&config, now)?;

        if options.validate_recipient.unwrap_or(config.validate_recipient) {
            self.validate_recipient(recipient, message).await?;
        }

        let delay = self.rng.gen_range(config.delay_min_secs..=config.delay_max_secs);
        debug!(recipient = %recipient, delay_secs = delay, "pacing before send");
        suspend(&self.cancel, Duration::from_secs(delay)).await?;

        if options.use_presence.unwrap_or(config.use_presence) {
            self.simulate_presence(recipient, message).await?;
        }

        match self.transport.send_text(recipient, message).await {
            Ok(receipt) => {
                let sent_at = self.clock.now();
                self.stats.record_success();
                self.history
                    .push(SendRecord::success(recipient, message, sent_at), sent_at);
                info!(recipient = %recipient, message_id = ?receipt.message_id, "message sent");

                Ok(SendReceipt {
                    recipient: recipient.to_string(),
                    message_id: receipt.message_id,
                    sent_at,
                })
            }
            Err(e) => Err(self.handle_transport_failure(&config, recipient, message, e).await),
        }
    }

    fn check_quota(&self, config: &GovernorConfig, now: DateTime<FixedOffset>) -> std::result::Result<(), SendError> {
        let windows = [
            (QuotaWindow::Minute, config.per_minute),
            (QuotaWindow::Hour, config.per_hour),
            (QuotaWindow::Day, config.per_day),
        ];

        for (window, limit) in windows {
            let count = self.history.successful_within(now, window.seconds());
            if count >= limit {
                warn!(window = %window, count, limit, "send quota reached");
                return Err(SendError::QuotaExceeded {
                    window,
                    count,
                    limit,
                });
            }
        }
        Ok(())
    }

    async fn validate_recipient(&mut self, recipient: &str, message: &str) -> std::result::Result<(), SendError> {
        let reason = match self.validator.exists(recipient).await {
            Ok(true) => return Ok(()),
            Ok(false) => "recipient does not exist".to_string(),
            Err(e) => format!("validation failed: {}", e),
        };

        warn!(recipient = %recipient, reason = %reason, "invalid recipient");
        let now = self.clock.now();
        self.stats.record_failure();
        self.history
            .push(SendRecord::failure(recipient, message, reason.clone(), now), now);

        Err(SendError::InvalidRecipient {
            recipient: recipient.to_string(),
            reason,
        })
    }

    async fn simulate_presence(&self, recipient: &str, message: &str) -> std::result::Result<(), SendError> {
        let seconds = typing_seconds(message);
        if let Err(e) = self.transport.simulate_typing(recipient, seconds).await {
            warn!(recipient = %recipient, error = %e, "presence simulation failed");
        }
        suspend(&self.cancel, Duration::from_secs(seconds)).await
    }

    async fn handle_transport_failure(
        &mut self,
        config: &GovernorConfig,
        recipient: &str,
        message: &str,
        err: TransportError,
    ) -> SendError {
        let now = self.clock.now();
        let text = err.to_string();

        self.stats.record_failure();
        self.history
            .push(SendRecord::failure(recipient, message, text.clone(), now), now);
        error!(recipient = %recipient, error = %text, "send failed");

        let block_suspected = self.detector.is_block(&text);
        if block_suspected {
            self.stats.blocks_detected += 1;
            warn!(
                recipient = %recipient,
                blocks_detected = self.stats.blocks_detected,
                "possible account block detected"
            );
        }

        if self.stats.consecutive_failures >= config.max_consecutive_failures {
            warn!(
                consecutive_failures = self.stats.consecutive_failures,
                pause_secs = config.failure_pause_secs,
                "too many consecutive failures, cooling down"
            );
            match suspend(&self.cancel, Duration::from_secs(config.failure_pause_secs)).await {
                Ok(()) => self.stats.consecutive_failures = 0,
                Err(_) => warn!("failure cooldown cancelled"),
            }
        }

        SendError::Transport {
            message: text,
            block_suspected,
        }
    }

    /// Counters plus derived rates, computed now
    pub fn stats(&self) -> GovernorStats {
        self.stats.snapshot(self.clock.now())
    }

    /// Zero the counters and restart the run clock; history is kept
    pub fn reset_stats(&mut self) {
        self.stats = RunningStats::new(self.clock.now());
    }

    /// All history records, or the trailing `last` ones
    pub fn history(&self, last: Option<usize>) -> Vec<SendRecord> {
        self.history.records(last)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Write the history as CSV
    pub fn export_history<W: std::io::Write>(&self, writer: W) -> Result<()> {
        self.history.write_csv(writer)
    }

    pub fn export_history_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.history.write_csv(std::io::BufWriter::new(file))
    }
}

fn check_schedule(config: &GovernorConfig, now: DateTime<FixedOffset>) -> std::result::Result<(), SendError> {
    let hour = now.hour();
    let sunday = now.weekday() == Weekday::Sun;

    if hour < config.start_hour || hour > config.end_hour || (sunday && !config.allow_sunday) {
        warn!(hour, sunday, "outside the allowed sending window");
        return Err(SendError::OutOfWindow { hour, sunday });
    }
    Ok(())
}

/// Seconds a human would take to type `message`, clamped to 2..=8
pub fn typing_seconds(message: &str) -> u64 {
    let chars = message.chars().count() as u64;
    (chars * 60 / TYPING_CHARS_PER_MINUTE).clamp(MIN_TYPING_SECS, MAX_TYPING_SECS)
}

/// Sleep for `duration` unless the token fires first
pub(crate) async fn suspend(cancel: &CancellationToken, duration: Duration) -> std::result::Result<(), SendError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SendError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{governor_at, monday_at, test_config, ScriptedValidator};
    use chrono::{Duration as ChronoDuration, FixedOffset, TimeZone};

    #[test]
    fn test_typing_seconds() {
        assert_eq!(typing_seconds(""), 2);
        assert_eq!(typing_seconds(&"a".repeat(20)), 6);
        assert_eq!(typing_seconds(&"a".repeat(400)), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_success_records_history_and_stats() {
        let (mut governor, transport, _clock) = governor_at(monday_at(10), test_config());

        let receipt = governor
            .send("5511999999999", "Hello there", &SendOptions::default())
            .await
            .unwrap();

        assert_eq!(receipt.recipient, "5511999999999");
        assert_eq!(receipt.message_id.as_deref(), Some("msg-1"));
        assert_eq!(transport.sent(), vec![("5511999999999".to_string(), "Hello there".to_string())]);

        let stats = governor.stats();
        assert_eq!(stats.sent, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.success_rate, 100.0);

        let history = governor.history(None);
        assert_eq!(history.len(), 1);
        assert!(history[0].success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_refuses_without_calling_transport() {
        let mut config = test_config();
        config.per_minute = 2;
        let (mut governor, transport, clock) = governor_at(monday_at(10), config);

        for _ in 0..2 {
            assert!(governor.send("a", "hi", &SendOptions::default()).await.is_ok());
        }

        let outcome = governor.send("a", "hi", &SendOptions::default()).await;
        assert_eq!(
            outcome,
            Err(SendError::QuotaExceeded {
                window: QuotaWindow::Minute,
                count: 2,
                limit: 2,
            })
        );
        assert_eq!(transport.sent().len(), 2);
        // Refusals leave no trace
        assert_eq!(governor.history(None).len(), 2);
        assert_eq!(governor.stats().failed, 0);

        clock.advance(ChronoDuration::seconds(61));
        assert!(governor.send("a", "hi", &SendOptions::default()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hourly_and_daily_quota() {
        let mut config = test_config();
        config.per_minute = 100;
        config.per_hour = 3;
        config.per_day = 4;
        let (mut governor, _transport, clock) = governor_at(monday_at(9), config);

        for _ in 0..3 {
            governor.send("a", "hi", &SendOptions::default()).await.unwrap();
        }
        let outcome = governor.send("a", "hi", &SendOptions::default()).await;
        assert!(matches!(
            outcome,
            Err(SendError::QuotaExceeded { window: QuotaWindow::Hour, .. })
        ));

        clock.advance(ChronoDuration::hours(2));
        governor.send("a", "hi", &SendOptions::default()).await.unwrap();
        let outcome = governor.send("a", "hi", &SendOptions::default()).await;
        assert!(matches!(
            outcome,
            Err(SendError::QuotaExceeded { window: QuotaWindow::Day, count: 4, limit: 4 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_older_than_a_day_do_not_count() {
        let mut config = test_config();
        config.per_day = 2;
        config.end_hour = 23;
        let (mut governor, _transport, clock) = governor_at(monday_at(10), config);

        for _ in 0..2 {
            clock.advance(ChronoDuration::minutes(2));
            governor.send("a", "hi", &SendOptions::default()).await.unwrap();
        }
        assert!(governor.send("a", "hi", &SendOptions::default()).await.is_err());

        clock.advance(ChronoDuration::hours(24));
        assert!(governor.send("a", "hi", &SendOptions::default()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_outside_hours_refused() {
        let (mut governor, transport, _clock) = governor_at(monday_at(23), test_config());

        let outcome = governor.send("a", "hi", &SendOptions::default()).await;
        assert_eq!(outcome, Err(SendError::OutOfWindow { hour: 23, sunday: false }));
        assert!(transport.sent().is_empty());

        let (mut governor, _transport, _clock) = governor_at(monday_at(7), test_config());
        assert!(matches!(
            governor.send("a", "hi", &SendOptions::default()).await,
            Err(SendError::OutOfWindow { hour: 7, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sunday_rule() {
        // 2024-03-10 is a Sunday
        let sunday = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 10, 12, 0, 0)
            .unwrap();

        let (mut governor, _transport, _clock) = governor_at(sunday, test_config());
        assert_eq!(
            governor.send("a", "hi", &SendOptions::default()).await,
            Err(SendError::OutOfWindow { hour: 12, sunday: true })
        );

        let mut config = test_config();
        config.allow_sunday = true;
        let (mut governor, _transport, _clock) = governor_at(sunday, config);
        assert!(governor.send("a", "hi", &SendOptions::default()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_recipient_counts_as_failure() {
        let mut config = test_config();
        config.validate_recipient = true;
        let (governor, transport, _clock) = governor_at(monday_at(10), config);
        let mut governor = governor.with_validator(Arc::new(ScriptedValidator::rejecting(["bad"])));

        let outcome = governor.send("bad", "hi", &SendOptions::default()).await;
        assert!(matches!(outcome, Err(SendError::InvalidRecipient { .. })));
        assert!(transport.sent().is_empty());

        let stats = governor.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.consecutive_failures, 1);
        let history = governor.history(None);
        assert_eq!(history.len(), 1);
        assert!(!history[0].success);
        assert_eq!(history[0].error.as_deref(), Some("recipient does not exist"));

        // The per-call override skips validation
        let options = SendOptions {
            validate_recipient: Some(false),
            ..Default::default()
        };
        assert!(governor.send("bad", "hi", &options).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_recipients_never_start_cooldown() {
        let mut config = test_config();
        config.validate_recipient = true;
        config.max_consecutive_failures = 2;
        config.failure_pause_secs = 300;
        let (governor, transport, _clock) = governor_at(monday_at(10), config);
        let mut governor = governor.with_validator(Arc::new(ScriptedValidator::rejecting(["bad"])));

        let started = tokio::time::Instant::now();
        for _ in 0..3 {
            let outcome = governor.send("bad", "hi", &SendOptions::default()).await;
            assert!(matches!(outcome, Err(SendError::InvalidRecipient { .. })));
        }

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(governor.stats().consecutive_failures, 3);
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validator_error_is_invalid_recipient() {
        let mut config = test_config();
        config.validate_recipient = true;
        let (governor, _transport, _clock) = governor_at(monday_at(10), config);
        let mut governor = governor.with_validator(Arc::new(ScriptedValidator::failing("gateway down")));

        match governor.send("a", "hi", &SendOptions::default()).await {
            Err(SendError::InvalidRecipient { reason, .. }) => {
                assert!(reason.contains("gateway down"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_detection() {
        let mut config = test_config();
        config.max_consecutive_failures = 10;
        let (mut governor, transport, _clock) = governor_at(monday_at(10), config);
        transport.fail_next("Number BLOCKED by server");
        transport.fail_next("connection timed out");

        let first = governor.send("a", "hi", &SendOptions::default()).await.unwrap_err();
        assert!(first.is_block_suspected());
        assert_eq!(governor.stats().blocks_detected, 1);

        let second = governor.send("a", "hi", &SendOptions::default()).await.unwrap_err();
        assert!(!second.is_block_suspected());
        assert_eq!(governor.stats().blocks_detected, 1);

        governor.send("a", "hi", &SendOptions::default()).await.unwrap();
        let stats = governor.stats();
        assert_eq!(stats.blocks_detected, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.consecutive_failures, 0);

        let history = governor.history(None);
        assert_eq!(history[0].error.as_deref(), Some("Number BLOCKED by server"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_failures_trigger_cooldown() {
        let mut config = test_config();
        config.max_consecutive_failures = 2;
        config.failure_pause_secs = 300;
        let (mut governor, transport, _clock) = governor_at(monday_at(10), config);
        transport.fail_next("timeout");
        transport.fail_next("timeout");

        let started = tokio::time::Instant::now();
        assert!(governor.send("a", "one", &SendOptions::default()).await.is_err());
        assert_eq!(governor.stats().consecutive_failures, 1);
        assert!(started.elapsed() < Duration::from_secs(300));

        assert!(governor.send("a", "two", &SendOptions::default()).await.is_err());
        assert!(started.elapsed() >= Duration::from_secs(300));
        assert_eq!(governor.stats().consecutive_failures, 0);
        assert_eq!(governor.stats().failed, 2);

        assert!(governor.send("a", "three", &SendOptions::default()).await.is_ok());
        assert_eq!(transport.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_simulation() {
        let mut config = test_config();
        config.use_presence = true;
        let (mut governor, transport, _clock) = governor_at(monday_at(10), config);

        let started = tokio::time::Instant::now();
        governor
            .send("a", &"x".repeat(400), &SendOptions::default())
            .await
            .unwrap();

        assert_eq!(transport.typing(), vec![("a".to_string(), 8)]);
        assert!(started.elapsed() >= Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_failure_is_swallowed() {
        let mut config = test_config();
        config.use_presence = true;
        let (mut governor, transport, _clock) = governor_at(monday_at(10), config);
        transport.fail_typing();

        assert!(governor.send("a", "hi", &SendOptions::default()).await.is_ok());
        let stats = governor.stats();
        assert_eq!(stats.sent, 1);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_failure_still_waits_typing_delay() {
        let mut config = test_config();
        config.use_presence = true;
        let (mut governor, transport, _clock) = governor_at(monday_at(10), config);
        transport.fail_typing();

        let started = tokio::time::Instant::now();
        governor
            .send("a", &"x".repeat(400), &SendOptions::default())
            .await
            .unwrap();

        assert!(transport.typing().is_empty());
        assert!(started.elapsed() >= Duration::from_secs(8));
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_delay_within_bounds() {
        let mut config = test_config();
        config.delay_min_secs = 3;
        config.delay_max_secs = 8;
        let (mut governor, _transport, _clock) = governor_at(monday_at(10), config);

        let started = tokio::time::Instant::now();
        governor.send("a", "hi", &SendOptions::default()).await.unwrap();
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(3));
        assert!(waited <= Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_governor_does_nothing() {
        let (mut governor, transport, _clock) = governor_at(monday_at(10), test_config());
        governor.cancellation_token().cancel();

        assert_eq!(
            governor.send("a", "hi", &SendOptions::default()).await,
            Err(SendError::Cancelled)
        );
        assert_eq!(transport.attempts(), 0);
        assert!(governor.history(None).is_empty());
        assert_eq!(governor.stats().failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_pacing_delay() {
        let mut config = test_config();
        config.delay_min_secs = 60;
        config.delay_max_secs = 60;
        let (mut governor, transport, _clock) = governor_at(monday_at(10), config);

        let token = governor.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            token.cancel();
        });

        assert_eq!(
            governor.send("a", "hi", &SendOptions::default()).await,
            Err(SendError::Cancelled)
        );
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_idempotent_and_reset() {
        let (mut governor, _transport, clock) = governor_at(monday_at(10), test_config());
        governor.send("a", "hi", &SendOptions::default()).await.unwrap();

        let first = governor.stats();
        assert_eq!(first, governor.stats());

        clock.advance(ChronoDuration::seconds(30));
        let later = governor.stats();
        assert_eq!(later.sent, first.sent);
        assert!(later.elapsed_secs >= first.elapsed_secs);
        assert_eq!(later.elapsed_secs, 30);

        governor.reset_stats();
        let reset = governor.stats();
        assert_eq!(reset.sent, 0);
        assert_eq!(reset.elapsed_secs, 0);
        // History survives a stats reset
        assert_eq!(governor.history(None).len(), 1);
        governor.clear_history();
        assert!(governor.history(None).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_limits() {
        let (mut governor, _transport, _clock) = governor_at(monday_at(10), test_config());

        governor
            .set_limits(&GovernorConfigUpdate {
                per_minute: Some(9),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(governor.config().per_minute, 9);

        let before = governor.config().clone();
        let result = governor.set_limits(&GovernorConfigUpdate {
            start_hour: Some(23),
            end_hour: Some(5),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(governor.config(), &before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_history() {
        let (mut governor, transport, _clock) = governor_at(monday_at(10), test_config());
        transport.fail_next("HTTP 500: oops");
        let _ = governor.send("a", "first", &SendOptions::default()).await;
        governor.send("b", "second", &SendOptions::default()).await.unwrap();

        let mut out = Vec::new();
        governor.export_history(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains(",\"a\",\"first\",no,\"HTTP 500: oops\""));
        assert!(csv.contains(",\"b\",\"second\",yes,\"\""));
    }
}
