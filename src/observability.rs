//! # Check Observability
//!
//! Emits one structured event per check run for log collectors.
//!
//! ```text
//! revchain → JSON stdout → Vector → Loki → Grafana
//! ```
//!
//! Events are JSON lines prefixed with `REVCHAIN_EVENT:`, written to stdout,
//! or to stderr when stdout already carries the `--json` report. The two rendered
//! diagrams are reported as SHA-256 fingerprints so runs can be compared
//! over time without shipping the diagrams themselves.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Instant;
use uuid::Uuid;

use crate::services::{Comparison, Verdict};

/// Event prefix for Vector to identify structured events
const EVENT_PREFIX: &str = "REVCHAIN_EVENT:";

/// Check event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum CheckEvent {
    /// Both chains reconstructed and compared
    CheckCompleted(CheckCompletedEvent),
    /// Loading, parsing or reconstruction failed
    CheckFailed(CheckFailedEvent),
}

/// Common fields for all events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Timestamp in RFC3339 format
    pub timestamp: String,
    /// Unique ID of this run
    pub run_id: String,
    /// Migrations directory that was checked
    pub migrations_dir: String,
    /// Hostname of the machine running the check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// CI job ID if running in CI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_job_id: Option<String>,
}

impl EventMetadata {
    pub fn new(migrations_dir: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            run_id: Uuid::new_v4().to_string(),
            migrations_dir: migrations_dir.into(),
            hostname: std::env::var("HOSTNAME").ok(),
            ci_job_id: std::env::var("GITHUB_RUN_ID")
                .ok()
                .or_else(|| std::env::var("CI_JOB_ID").ok()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckCompletedEvent {
    #[serde(flatten)]
    pub metadata: EventMetadata,
    pub migrations: usize,
    /// "equal" or "divergent"
    pub verdict: String,
    pub header_fingerprint: String,
    pub code_fingerprint: String,
    pub drifting_fields: usize,
    pub heads: usize,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFailedEvent {
    #[serde(flatten)]
    pub metadata: EventMetadata,
    pub error: String,
    pub duration_secs: f64,
}

/// Hex SHA-256 of a rendered diagram
pub fn fingerprint(diagram: &str) -> String {
    Sha256::digest(diagram.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Output stream for event lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSink {
    Stdout,
    Stderr,
}

impl EventSink {
    /// Stderr when stdout holds the JSON report, stdout otherwise
    pub fn for_report(json: bool) -> Self {
        if json {
            Self::Stderr
        } else {
            Self::Stdout
        }
    }
}

/// Prefixed JSON line for one event
pub fn event_line(event: &CheckEvent) -> serde_json::Result<String> {
    Ok(format!("{}{}", EVENT_PREFIX, serde_json::to_string(event)?))
}

/// Emits a structured event as one JSON line
///
/// Events are prefixed with `REVCHAIN_EVENT:` for Vector to parse.
pub fn emit_event(event: CheckEvent, sink: EventSink) {
    match event_line(&event) {
        Ok(line) => match sink {
            EventSink::Stdout => println!("{}", line),
            EventSink::Stderr => eprintln!("{}", line),
        },
        Err(e) => {
            tracing::error!("Failed to serialize event: {}", e);
        }
    }
}

/// Times one check run and reports its outcome
pub struct CheckTracker {
    metadata: EventMetadata,
    start: Instant,
    sink: EventSink,
}

impl CheckTracker {
    pub fn new(migrations_dir: impl Into<String>) -> Self {
        Self {
            metadata: EventMetadata::new(migrations_dir),
            start: Instant::now(),
            sink: EventSink::Stdout,
        }
    }

    pub fn with_sink(mut self, sink: EventSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn completed_event(&self, comparison: &Comparison) -> CheckEvent {
        CheckEvent::CheckCompleted(CheckCompletedEvent {
            metadata: self.metadata.clone(),
            migrations: comparison.migrations,
            verdict: match comparison.verdict {
                Verdict::Equal => "equal".to_string(),
                Verdict::Divergent => "divergent".to_string(),
            },
            header_fingerprint: fingerprint(&comparison.header_diagram),
            code_fingerprint: fingerprint(&comparison.code_diagram),
            drifting_fields: comparison.drift.len(),
            heads: comparison.heads.len(),
            duration_secs: self.start.elapsed().as_secs_f64(),
        })
    }

    /// Emit check completed event
    pub fn emit_completed(self, comparison: &Comparison) {
        emit_event(self.completed_event(comparison), self.sink);
    }

    /// Emit check failed event
    pub fn emit_failed(self, error: &anyhow::Error) {
        emit_event(
            CheckEvent::CheckFailed(CheckFailedEvent {
                metadata: self.metadata,
                error: format!("{:#}", error),
                duration_secs: self.start.elapsed().as_secs_f64(),
            }),
            self.sink,
        );
    }
}
