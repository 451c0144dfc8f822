use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::run::WorkflowState;

/// Terminal decision for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Irrigate,
    DoNotIrrigate,
    MaintenanceRequired,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Irrigate => write!(f, "IRRIGATE"),
            Decision::DoNotIrrigate => write!(f, "DO_NOT_IRRIGATE"),
            Decision::MaintenanceRequired => write!(f, "MAINTENANCE_REQUIRED"),
        }
    }
}

/// How firmly a decision is held. `NotApplicable` is reserved for
/// maintenance terminals, where no reading was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "HIGH"),
            Confidence::Medium => write!(f, "MEDIUM"),
            Confidence::Low => write!(f, "LOW"),
            Confidence::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// A classified reading: the decision plus its human-readable justification.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub decision: Decision,
    pub reason: String,
    pub confidence: Confidence,
}

/// Immutable result of one workflow run, produced exactly once at a terminal
/// stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub field_id: u32,
    pub decision: Decision,
    /// Absent when no valid reading was obtained.
    pub current_moisture: Option<f64>,
    /// (min, max) thresholds; absent when the field lookup failed.
    pub optimal_range: Option<(f64, f64)>,
    pub reason: String,
    pub confidence: Confidence,
    pub sensor_attempts: u32,
    pub timestamp: DateTime<Utc>,
    pub errors: Vec<String>,
}

impl DecisionRecord {
    /// Assemble the record for a run that classified a usable reading.
    pub fn classified(run: &WorkflowState, verdict: Verdict) -> Self {
        Self {
            field_id: run.field_id,
            decision: verdict.decision,
            current_moisture: run.reading,
            optimal_range: run
                .profile
                .as_ref()
                .map(|p| (p.min_moisture, p.max_moisture)),
            reason: verdict.reason,
            confidence: verdict.confidence,
            sensor_attempts: run.attempts,
            timestamp: Utc::now(),
            errors: run.errors.clone(),
        }
    }

    /// Assemble the maintenance terminal record from the accumulated faults.
    pub fn maintenance(run: &WorkflowState) -> Self {
        Self {
            field_id: run.field_id,
            decision: Decision::MaintenanceRequired,
            current_moisture: None,
            optimal_range: run
                .profile
                .as_ref()
                .map(|p| (p.min_moisture, p.max_moisture)),
            reason: run.errors.join("; "),
            confidence: Confidence::NotApplicable,
            sensor_attempts: run.attempts,
            timestamp: Utc::now(),
            errors: run.errors.clone(),
        }
    }
}
