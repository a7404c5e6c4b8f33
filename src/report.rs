// Alert reports: alerts with an id and a lifecycle status

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::alerts::Alert;

const TAG_LEN: usize = 5;
const TAG_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Reports start ACTIVE. Acknowledging is up to whoever holds the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Active,
    Acknowledged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertReport {
    pub id: String,
    pub status: AlertStatus,
    #[serde(flatten)]
    pub alert: Alert,
}

impl AlertReport {
    pub fn acknowledge(&mut self) {
        self.status = AlertStatus::Acknowledged;
    }
}

/// Assigns report ids of the form `ALERT-<timestamp>-<tag><sequence>`.
///
/// The tag is random per generator, the sequence is atomic, so ids are
/// unique for the lifetime of the process even when several threads
/// generate reports in the same millisecond.
#[derive(Debug)]
pub struct ReportGenerator {
    tag: String,
    sequence: AtomicU64,
}

impl ReportGenerator {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let tag: String = (0..TAG_LEN)
            .map(|_| TAG_ALPHABET[rng.gen_range(0..TAG_ALPHABET.len())] as char)
            .collect();
        Self::with_tag(tag)
    }

    pub fn with_tag(tag: impl Into<String>) -> Self {
        ReportGenerator {
            tag: tag.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn generate(&self, alert: Alert) -> AlertReport {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        AlertReport {
            id: format!("ALERT-{}-{}{}", alert.timestamp, self.tag, seq),
            status: AlertStatus::Active,
            alert,
        }
    }

    pub fn generate_all(&self, alerts: Vec<Alert>) -> Vec<AlertReport> {
        alerts.into_iter().map(|a| self.generate(a)).collect()
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
