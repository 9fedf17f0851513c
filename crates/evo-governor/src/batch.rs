//! Batch sending on top of the governor
//!
//! Batches are processed one recipient at a time. After every send the
//! batch checks [`SendGovernor::pause_reason`] and, when the run looks
//! unhealthy, sits out a one hour safety pause before continuing with the
//! remaining recipients.

use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::error::SendError;
use crate::governor::{SendGovernor, SendOptions, SendOutcome, suspend};
use crate::stats::GovernorStats;

/// Length of the safety pause between batch sends
pub const SAFETY_PAUSE_SECS: u64 = 3_600;

/// Error rate (percent) above which a batch pauses
pub const MAX_ERROR_RATE: f64 = 30.0;

/// Emojis optionally appended by message variation; the empty entry means none
pub const VARIATION_EMOJIS: &[&str] = &["😊", "👋", "✨", "🎉", "💡", ""];

/// Closing punctuation added when a message has none
pub const VARIATION_PUNCTUATION: &[&str] = &[".", "!", ""];

/// Progress report passed to the batch callback after each send
#[derive(Debug)]
pub struct BatchProgress<'a> {
    pub recipient: &'a str,
    pub outcome: &'a SendOutcome,
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
}

/// Why a batch stopped to cool down
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PauseReason {
    HighErrorRate(f64),
    BlockDetected(u64),
    ConsecutiveFailures(u32),
}

impl SendGovernor {
    /// Send `recipient → message` pairs in order
    ///
    /// Pairs behave like an ordered map: a repeated recipient keeps its
    /// first position and takes the last message given for it.
    pub async fn send_batch<I, R, M>(&mut self, batch: I) -> GovernorStats
    where
        I: IntoIterator<Item = (R, M)>,
        R: Into<String>,
        M: Into<String>,
    {
        self.send_batch_with_progress(batch, |_| {}).await
    }

    /// Like [`send_batch`](Self::send_batch), reporting each outcome to `on_progress`
    pub async fn send_batch_with_progress<I, R, M, F>(
        &mut self,
        batch: I,
        mut on_progress: F,
    ) -> GovernorStats
    where
        I: IntoIterator<Item = (R, M)>,
        R: Into<String>,
        M: Into<String>,
        F: FnMut(BatchProgress<'_>) + Send,
    {
        let entries = ordered_entries(batch);
        let total = entries.len();
        info!(total, "starting batch send");

        for (i, (recipient, message)) in entries.iter().enumerate() {
            let index = i + 1;
            debug!(index, total, recipient = %recipient, "processing batch entry");

            let outcome = self.send(recipient, message, &SendOptions::default()).await;
            on_progress(BatchProgress {
                recipient,
                outcome: &outcome,
                index,
                total,
            });

            if matches!(outcome, Err(SendError::Cancelled)) || self.cancel.is_cancelled() {
                warn!(index, total, "batch cancelled");
                break;
            }

            if index == total {
                break;
            }

            if let Some(reason) = self.pause_reason() {
                if self.safety_pause(reason).await.is_err() {
                    warn!(index, total, "batch cancelled during safety pause");
                    break;
                }
            }
        }

        let stats = self.stats();
        info!(
            sent = stats.sent,
            failed = stats.failed,
            success_rate = stats.success_rate,
            "batch finished"
        );
        stats
    }

    /// Send a randomly picked template to each recipient
    ///
    /// `{key}` placeholders are filled from the recipient's entry in
    /// `vars`; unknown placeholders stay as written. Each message gets a
    /// little random variation so no two sends are byte-identical.
    pub async fn send_varied<R, T>(
        &mut self,
        recipients: &[R],
        templates: &[T],
        vars: &HashMap<String, HashMap<String, String>>,
    ) -> GovernorStats
    where
        R: AsRef<str>,
        T: AsRef<str>,
    {
        if templates.is_empty() {
            warn!("send_varied called without templates");
            return self.stats();
        }

        let empty = HashMap::new();
        let mut batch = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let recipient = recipient.as_ref();
            let template = templates
                .choose(&mut self.rng)
                .map(|t| t.as_ref())
                .unwrap_or_default();
            let message = render_template(template, vars.get(recipient).unwrap_or(&empty));
            let message = add_variation(message, &mut self.rng);
            batch.push((recipient.to_string(), message));
        }

        self.send_batch(batch).await
    }

    /// Whether the current run should stop for a safety pause
    pub fn pause_reason(&self) -> Option<PauseReason> {
        let rate = self.stats.error_rate();
        if rate > MAX_ERROR_RATE {
            return Some(PauseReason::HighErrorRate(rate));
        }
        if self.stats.blocks_detected > 0 {
            return Some(PauseReason::BlockDetected(self.stats.blocks_detected));
        }
        if self.stats.consecutive_failures >= self.config.max_consecutive_failures {
            return Some(PauseReason::ConsecutiveFailures(
                self.stats.consecutive_failures,
            ));
        }
        None
    }

    async fn safety_pause(&mut self, reason: PauseReason) -> Result<(), SendError> {
        warn!(
            reason = ?reason,
            stats = ?self.stats,
            pause_secs = SAFETY_PAUSE_SECS,
            "pausing sends for safety"
        );
        suspend(&self.cancel, Duration::from_secs(SAFETY_PAUSE_SECS)).await?;
        self.stats.consecutive_failures = 0;
        info!("safety pause finished, resuming sends");
        Ok(())
    }
}

fn ordered_entries<I, R, M>(batch: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (R, M)>,
    R: Into<String>,
    M: Into<String>,
{
    let mut entries: Vec<(String, String)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (recipient, message) in batch {
        let recipient = recipient.into();
        let message = message.into();
        match positions.get(&recipient) {
            Some(&pos) => entries[pos].1 = message,
            None => {
                positions.insert(recipient.clone(), entries.len());
                entries.push((recipient, message));
            }
        }
    }
    entries
}

/// Replace `{key}` placeholders with their values in a single pass.
///
/// Unknown placeholders are kept as written. Inserted values are never
/// scanned again.
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut message = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        message.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}').and_then(|close| vars.get(&after[..close]).map(|v| (close, v))) {
            Some((close, value)) => {
                message.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                message.push('{');
                rest = after;
            }
        }
    }
    message.push_str(rest);
    message
}

/// Maybe append an emoji, then closing punctuation if the message lacks it
pub fn add_variation<G: Rng + ?Sized>(mut message: String, rng: &mut G) -> String {
    let emoji = VARIATION_EMOJIS.choose(rng).copied().unwrap_or_default();
    if rng.gen_bool(0.5) && !emoji.is_empty() {
        message.push(' ');
        message.push_str(emoji);
    }

    if !message.ends_with(['.', '!', '?']) {
        let punctuation = VARIATION_PUNCTUATION.choose(rng).copied().unwrap_or_default();
        message.push_str(punctuation);
    }
    message
}
