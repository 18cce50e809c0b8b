//! Structured event definitions for logging.
//!
//! Events follow a consistent schema for machine-parseable JSONL output.
//! All events carry the run id and the pipeline stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Stages of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Ontology and annotation loading.
    Load,
    /// Per-disease patient sampling.
    Sample,
    /// Identifier assignment and summary.
    Assemble,
    /// Writing cohorts or phenopackets.
    Export,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Sample => "sample",
            Stage::Assemble => "assemble",
            Stage::Export => "export",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Load stage
    pub const ONTOLOGY_LOADED: &str = "ontology.loaded";
    pub const ANNOTATIONS_LOADED: &str = "annotations.loaded";

    // Sample stage
    pub const COHORT_SAMPLED: &str = "cohort.sampled";
    pub const COHORT_SKIPPED: &str = "cohort.skipped";

    // Export stage
    pub const EXPORT_WRITTEN: &str = "export.written";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_PRESET_USED: &str = "config.preset_used";
    pub const CONFIG_ERROR: &str = "config.error";
}

/// A structured log event for JSONL output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub ts: DateTime<Utc>,
    pub level: Level,
    /// Event name (e.g., "run.started", "cohort.sampled").
    pub event: String,
    pub run_id: String,
    pub stage: Stage,
    pub message: String,
    /// Additional structured fields (stable keys).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, serde_json::Value>,
}

impl LogEvent {
    pub fn new(
        level: Level,
        event: impl Into<String>,
        run_id: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: run_id.into(),
            stage,
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    /// Add a field to the event.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }
}

/// Context for generating log events with a consistent run id.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }

    pub fn event(
        &self,
        level: Level,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        LogEvent::new(level, event, &self.run_id, stage, message)
    }

    pub fn info(&self, event: impl Into<String>, stage: Stage, message: impl Into<String>) -> LogEvent {
        self.event(Level::Info, event, stage, message)
    }

    pub fn warn(&self, event: impl Into<String>, stage: Stage, message: impl Into<String>) -> LogEvent {
        self.event(Level::Warn, event, stage, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_serialization() {
        let event = LogEvent::new(
            Level::Info,
            event_names::RUN_STARTED,
            "run-12345",
            Stage::Init,
            "Starting simulation run",
        )
        .with_field("patients_per_disease", 20);

        let json = event.to_jsonl();
        assert!(json.contains(r#""event":"run.started""#));
        assert!(json.contains(r#""level":"info""#));
        assert!(json.contains(r#""stage":"init""#));
        assert!(json.contains(r#""run_id":"run-12345""#));
        assert!(json.contains(r#""patients_per_disease":20"#));
    }

    #[test]
    fn test_log_context() {
        let ctx = LogContext::new("run-abc");
        let event = ctx.warn(event_names::COHORT_SKIPPED, Stage::Sample, "skipped");
        assert_eq!(event.run_id, "run-abc");
        assert_eq!(event.level, Level::Warn);
        assert_eq!(event.stage, Stage::Sample);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Load.to_string(), "load");
        assert_eq!(Stage::Assemble.to_string(), "assemble");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(event_names::COHORT_SAMPLED, "cohort.sampled");
        assert_eq!(event_names::CONFIG_LOADED, "config.loaded");
    }
}
