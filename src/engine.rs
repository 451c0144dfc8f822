//! Drives a decision run through the full state machine lifecycle.

use std::time::Duration;

use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::directory::FieldDirectory;
use crate::error::IrrigatorError;
use crate::sensor::{MoistureSource, SensorReading};
use crate::workflow::{
    DecisionRecord, FaultKind, RetryPolicy, StageOutcome, StateMachine, Transition, WorkflowState,
};

/// Sequences field lookup, the bounded sensor fetch loop, and classification
/// into exactly one terminal [`DecisionRecord`] per run.
pub struct DecisionWorkflow<D, S> {
    directory: D,
    sensor: S,
    policy: RetryPolicy,
}

impl<D: FieldDirectory, S: MoistureSource> DecisionWorkflow<D, S> {
    /// Build a workflow over the two injected collaborators.
    ///
    /// The retry policy is validated here, before any run starts: an unusable
    /// policy is a configuration error, never a run outcome.
    pub fn new(directory: D, sensor: S, policy: RetryPolicy) -> Result<Self, IrrigatorError> {
        policy.validate()?;
        Ok(Self {
            directory,
            sensor,
            policy,
        })
    }

    /// Decide for one field.
    ///
    /// Never fails: every fault is handled locally and encoded in the
    /// returned record. The only suspension points are the two collaborator
    /// calls; if the policy carries a deadline, a sensor read still in flight
    /// at expiry is treated as a timeout outcome.
    pub async fn run(&mut self, field_id: u32) -> DecisionRecord {
        let mut run = WorkflowState::new(field_id, self.policy.max_attempts);
        let deadline = self.policy.deadline().map(|d| Instant::now() + d);
        info!(run_id = %run.run_id, field_id, "decision run started");

        // START → FIELD_LOOKUP
        StateMachine::next(&mut run, StageOutcome::Success);

        let profile = match self.directory.lookup(field_id).await {
            Some(profile) => {
                debug!(crop = %profile.crop_type, optimal = profile.optimal_moisture, "field profile found");
                run.profile = Some(profile.clone());
                StateMachine::next(&mut run, StageOutcome::Success);
                profile
            }
            None => {
                let kind = FaultKind::FieldNotFound { field_id };
                warn!(run_id = %run.run_id, %kind, "field lookup failed");
                StateMachine::next(&mut run, StageOutcome::Failure(kind));
                return DecisionRecord::maintenance(&run);
            }
        };

        // SENSOR_FETCH, self-looping up to the attempt bound.
        let moisture = loop {
            let attempt = run.begin_attempt();
            debug!(attempt, max_attempts = run.max_attempts, "polling moisture sensor");

            match self.read_sensor(field_id, deadline).await {
                SensorReading::Value(v) if (0.0..=100.0).contains(&v) => {
                    info!(moisture = v, attempt, "usable reading obtained");
                    run.reading = Some(v);
                    StateMachine::next(&mut run, StageOutcome::Success);
                    break v;
                }
                reading => {
                    let kind = match reading {
                        SensorReading::Timeout => FaultKind::SensorTimeout {
                            attempts: run.attempts,
                        },
                        // A value outside [0, 100] is a hardware fault no
                        // matter how the source labelled it.
                        SensorReading::Value(raw) | SensorReading::HardwareFault(raw) => {
                            FaultKind::HardwareFault { raw }
                        }
                    };
                    match StateMachine::next(&mut run, StageOutcome::Failure(kind.clone())) {
                        Transition::Retry { attempt } => {
                            let delay_ms = self.policy.delay_for_attempt(attempt);
                            warn!(attempt, max_attempts = run.max_attempts, delay_ms, "sensor timeout, retrying");
                            self.backoff(delay_ms, deadline).await;
                        }
                        Transition::Next(_) | Transition::Abort(_) => {
                            warn!(run_id = %run.run_id, %kind, attempts = run.attempts, "sensor fetch aborted");
                            return DecisionRecord::maintenance(&run);
                        }
                    }
                }
            }
        };

        // VALIDATE_DECIDE → DONE
        let verdict = Classifier::classify(
            moisture,
            profile.min_moisture,
            profile.optimal_moisture,
            profile.max_moisture,
        );
        info!(run_id = %run.run_id, decision = %verdict.decision, confidence = %verdict.confidence, "decision reached");
        StateMachine::next(&mut run, StageOutcome::Success);

        DecisionRecord::classified(&run, verdict)
    }

    /// Poll the sensor once, converting a deadline overrun into a timeout
    /// outcome rather than fabricating a different decision.
    async fn read_sensor(&mut self, field_id: u32, deadline: Option<Instant>) -> SensorReading {
        match deadline {
            Some(at) => match timeout_at(at, self.sensor.read(field_id)).await {
                Ok(reading) => reading,
                Err(_) => SensorReading::Timeout,
            },
            None => self.sensor.read(field_id).await,
        }
    }

    /// Sleep between attempts, clipped to the run deadline.
    async fn backoff(&self, delay_ms: u64, deadline: Option<Instant>) {
        if delay_ms == 0 {
            return;
        }
        let wait = sleep(Duration::from_millis(delay_ms));
        match deadline {
            Some(at) => {
                let _ = timeout_at(at, wait).await;
            }
            None => wait.await,
        }
    }
}
