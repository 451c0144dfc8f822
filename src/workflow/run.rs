use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::FieldProfile;
use crate::error::IrrigatorError;

use super::state::Stage;

/// The three fault classes that can terminate a run.
///
/// Only a timeout is recoverable, and only while sensor attempts remain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FaultKind {
    /// Directory lookup miss.
    FieldNotFound { field_id: u32 },
    /// The sensor produced no reading within budget.
    SensorTimeout { attempts: u32 },
    /// The sensor reported a physically impossible value. Never retried.
    HardwareFault { raw: f64 },
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::FieldNotFound { field_id } => write!(f, "Field #{field_id} not found"),
            FaultKind::SensorTimeout { attempts } => {
                write!(f, "Sensor timeout after {attempts} attempts")
            }
            FaultKind::HardwareFault { raw } => {
                write!(f, "Sensor hardware error: impossible value {raw:.1}%")
            }
        }
    }
}

/// Retry and cancellation policy for the sensor fetch loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of sensor attempts per run. Attempt 1 is not "retry 0":
    /// a bound of 1 means exactly one call and zero retries.
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential back-off between attempts.
    pub base_delay_ms: u64,
    /// Optional total run deadline in milliseconds.
    pub deadline_ms: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            deadline_ms: None,
        }
    }
}

impl RetryPolicy {
    /// Reject unusable policies before any run starts.
    pub fn validate(&self) -> Result<(), IrrigatorError> {
        if self.max_attempts < 1 {
            return Err(IrrigatorError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Calculate the delay before re-entering the fetch stage after the given
    /// attempt. delay = base_delay_ms * 2^(attempt - 1)
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        self.base_delay_ms * 2u64.pow(attempt.saturating_sub(1))
    }

    /// The run deadline as a duration, if one is configured.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

/// Mutable state threaded through a single decision run.
///
/// Owned exclusively by one [`DecisionWorkflow::run`](crate::engine::DecisionWorkflow::run)
/// invocation and discarded when it returns.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub run_id: Uuid,
    pub field_id: u32,
    pub profile: Option<FieldProfile>,
    pub reading: Option<f64>,
    /// Incremented once per sensor call, before the outcome is evaluated.
    pub attempts: u32,
    pub max_attempts: u32,
    /// Append-only, insertion order preserved.
    pub errors: Vec<String>,
    pub stage: Stage,
    pub stage_history: Vec<Stage>,
    pub started_at: DateTime<Utc>,
}

impl WorkflowState {
    pub fn new(field_id: u32, max_attempts: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            field_id,
            profile: None,
            reading: None,
            attempts: 0,
            max_attempts,
            errors: Vec::new(),
            stage: Stage::Start,
            stage_history: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Enter the fetch stage: count the attempt and return its number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }
}
