//! Running counters and the derived stats snapshot

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Counters accumulated since the last reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningStats {
    pub sent: u64,
    pub failed: u64,
    pub blocks_detected: u64,
    pub consecutive_failures: u32,
    pub started_at: DateTime<FixedOffset>,
}

impl RunningStats {
    pub fn new(started_at: DateTime<FixedOffset>) -> Self {
        Self {
            sent: 0,
            failed: 0,
            blocks_detected: 0,
            consecutive_failures: 0,
            started_at,
        }
    }

    pub fn record_success(&mut self) {
        self.sent += 1;
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
        self.consecutive_failures += 1;
    }

    pub fn attempts(&self) -> u64 {
        self.sent + self.failed
    }

    /// Failure share of all attempts, in percent
    pub fn error_rate(&self) -> f64 {
        match self.attempts() {
            0 => 0.0,
            n => self.failed as f64 / n as f64 * 100.0,
        }
    }

    /// Snapshot with the derived figures computed against `now`
    pub fn snapshot(&self, now: DateTime<FixedOffset>) -> GovernorStats {
        let attempts = self.attempts();
        let success_rate = if attempts > 0 {
            round2(self.sent as f64 / attempts as f64 * 100.0)
        } else {
            0.0
        };
        let elapsed_secs = (now - self.started_at).num_seconds().max(0) as u64;
        let per_minute = if elapsed_secs > 0 {
            round2(self.sent as f64 / (elapsed_secs as f64 / 60.0))
        } else {
            0.0
        };

        GovernorStats {
            sent: self.sent,
            failed: self.failed,
            blocks_detected: self.blocks_detected,
            consecutive_failures: self.consecutive_failures,
            success_rate,
            elapsed_secs,
            per_minute,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Point-in-time view of a governor's counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernorStats {
    pub sent: u64,
    pub failed: u64,
    pub blocks_detected: u64,
    pub consecutive_failures: u32,
    /// Percentage of attempts that succeeded, two decimals
    pub success_rate: f64,
    pub elapsed_secs: u64,
    /// Successful sends per minute since the run started, two decimals
    pub per_minute: f64,
}

impl fmt::Display for GovernorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+----------------------------------------+")?;
        writeln!(f, "|           SEND GOVERNOR STATS          |")?;
        writeln!(f, "+----------------------------------------+")?;
        writeln!(f, "| Sent:                {:>17} |", self.sent)?;
        writeln!(f, "| Failed:              {:>17} |", self.failed)?;
        writeln!(f, "| Blocks detected:     {:>17} |", self.blocks_detected)?;
        writeln!(f, "| Consecutive failures:{:>17} |", self.consecutive_failures)?;
        writeln!(f, "| Success rate:        {:>16.2}% |", self.success_rate)?;
        writeln!(f, "| Elapsed:             {:>16}s |", self.elapsed_secs)?;
        writeln!(f, "| Messages/minute:     {:>17.2} |", self.per_minute)?;
        write!(f, "+----------------------------------------+")
    }
}
