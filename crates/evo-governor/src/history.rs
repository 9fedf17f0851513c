//! Rolling send history
//!
//! One record per attempted send, in insertion order. Every insertion
//! prunes records older than 24 hours, so the history never holds more
//! than the day quota window needs.

use std::collections::VecDeque;
use std::io::Write;

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of message characters kept in a record
pub const PREVIEW_CHARS: usize = 50;

/// How long records are retained
pub const RETENTION_SECS: i64 = 86_400;

/// A single send attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRecord {
    pub recipient: String,
    /// First characters of the message
    pub preview: String,
    pub success: bool,
    pub error: Option<String>,
    pub timestamp: DateTime<FixedOffset>,
}

impl SendRecord {
    pub fn success(recipient: &str, message: &str, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            recipient: recipient.to_string(),
            preview: preview(message),
            success: true,
            error: None,
            timestamp,
        }
    }

    pub fn failure(
        recipient: &str,
        message: &str,
        error: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            recipient: recipient.to_string(),
            preview: preview(message),
            success: false,
            error: Some(error.into()),
            timestamp,
        }
    }
}

fn preview(message: &str) -> String {
    message.chars().take(PREVIEW_CHARS).collect()
}

/// Send records of the trailing 24 hours
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendHistory {
    records: VecDeque<SendRecord>,
}

impl SendHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, then drop everything older than 24h relative to `now`
    pub fn push(&mut self, record: SendRecord, now: DateTime<FixedOffset>) {
        self.records.push_back(record);
        self.prune(now);
    }

    pub fn prune(&mut self, now: DateTime<FixedOffset>) {
        let cutoff = now - Duration::seconds(RETENTION_SECS);
        self.records.retain(|r| r.timestamp >= cutoff);
    }

    /// Successful sends at or after `now - window_secs`
    pub fn successful_within(&self, now: DateTime<FixedOffset>, window_secs: i64) -> u32 {
        // Never count past the retention horizon, even between prunes
        let window = window_secs.min(RETENTION_SECS);
        let cutoff = now - Duration::seconds(window);
        self.records
            .iter()
            .filter(|r| r.success && r.timestamp >= cutoff)
            .count() as u32
    }

    /// All records, or only the trailing `last` ones
    pub fn records(&self, last: Option<usize>) -> Vec<SendRecord> {
        let skip = match last {
            Some(n) => self.records.len().saturating_sub(n),
            None => 0,
        };
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SendRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Write the history as CSV
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "date,recipient,message,success,error")?;
        for record in &self.records {
            writeln!(
                writer,
                "{},{},{},{},{}",
                record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                csv_field(&record.recipient),
                csv_field(&record.preview),
                if record.success { "yes" } else { "no" },
                csv_field(record.error.as_deref().unwrap_or("")),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
