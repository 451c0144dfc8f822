use std::fmt;

use serde::{Deserialize, Serialize};

use super::run::{FaultKind, WorkflowState};

/// The five stages of the irrigation decision state machine.
///
/// Each run flows through: START → FIELD_LOOKUP → SENSOR_FETCH →
/// VALIDATE_DECIDE → DONE, with SENSOR_FETCH re-entered on every retried
/// timeout and two escapes straight to the maintenance terminal (lookup miss,
/// exhausted retries or hardware fault).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Start,
    FieldLookup,
    SensorFetch,
    ValidateDecide,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Start => write!(f, "START"),
            Stage::FieldLookup => write!(f, "FIELD_LOOKUP"),
            Stage::SensorFetch => write!(f, "SENSOR_FETCH"),
            Stage::ValidateDecide => write!(f, "VALIDATE_DECIDE"),
            Stage::Done => write!(f, "DONE"),
        }
    }
}

/// The result of executing one stage against the collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Success,
    Failure(FaultKind),
}

/// The result of evaluating a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Advance to the next stage.
    Next(Stage),
    /// Re-enter SENSOR_FETCH: a timeout with retry budget remaining.
    Retry { attempt: u32 },
    /// Escape to the maintenance terminal with the fault that caused it.
    Abort(FaultKind),
}

/// Drives a [`WorkflowState`] through the state machine.
pub struct StateMachine;

impl StateMachine {
    /// Compute the next transition for the run based on its current stage and
    /// the provided outcome, then apply it.
    ///
    /// - `Start` always advances to `FieldLookup`.
    /// - `FieldLookup` and `ValidateDecide` advance on success and abort on
    ///   any failure.
    /// - `SensorFetch` advances on a usable reading; a timeout retries while
    ///   attempts remain and aborts once the bound is reached; a hardware
    ///   fault aborts immediately, never retried.
    /// - `Done` is terminal.
    ///
    /// Aborting records the fault in the run's error list and moves the run
    /// to `Done`.
    pub fn next(run: &mut WorkflowState, outcome: StageOutcome) -> Transition {
        let transition = match run.stage {
            Stage::Start => Transition::Next(Stage::FieldLookup),
            Stage::FieldLookup => match outcome {
                StageOutcome::Success => Transition::Next(Stage::SensorFetch),
                StageOutcome::Failure(kind) => Transition::Abort(kind),
            },
            Stage::SensorFetch => match outcome {
                StageOutcome::Success => Transition::Next(Stage::ValidateDecide),
                StageOutcome::Failure(FaultKind::SensorTimeout { attempts })
                    if attempts < run.max_attempts =>
                {
                    Transition::Retry { attempt: attempts }
                }
                StageOutcome::Failure(kind) => Transition::Abort(kind),
            },
            Stage::ValidateDecide => match outcome {
                StageOutcome::Success => Transition::Next(Stage::Done),
                StageOutcome::Failure(kind) => Transition::Abort(kind),
            },
            Stage::Done => Transition::Next(Stage::Done),
        };

        // Apply the transition to the run.
        match &transition {
            Transition::Next(next_stage) => {
                if run.stage != *next_stage {
                    run.stage_history.push(run.stage);
                    run.stage = *next_stage;
                }
            }
            Transition::Retry { .. } => {
                // Same logical stage re-entered; the re-entry is recorded.
                run.stage_history.push(run.stage);
            }
            Transition::Abort(kind) => {
                run.errors.push(kind.to_string());
                run.stage_history.push(run.stage);
                run.stage = Stage::Done;
            }
        }

        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_run(max_attempts: u32) -> WorkflowState {
        WorkflowState::new(12, max_attempts)
    }

    #[test]
    fn happy_path_walks_all_stages() {
        let mut run = make_run(3);
        assert_eq!(run.stage, Stage::Start);

        let t = StateMachine::next(&mut run, StageOutcome::Success);
        assert_eq!(t, Transition::Next(Stage::FieldLookup));

        let t = StateMachine::next(&mut run, StageOutcome::Success);
        assert_eq!(t, Transition::Next(Stage::SensorFetch));

        run.begin_attempt();
        let t = StateMachine::next(&mut run, StageOutcome::Success);
        assert_eq!(t, Transition::Next(Stage::ValidateDecide));

        let t = StateMachine::next(&mut run, StageOutcome::Success);
        assert_eq!(t, Transition::Next(Stage::Done));
        assert_eq!(run.stage, Stage::Done);
        assert!(run.errors.is_empty());
    }

    #[test]
    fn lookup_miss_aborts_with_error() {
        let mut run = make_run(3);
        StateMachine::next(&mut run, StageOutcome::Success);

        let t = StateMachine::next(
            &mut run,
            StageOutcome::Failure(FaultKind::FieldNotFound { field_id: 12 }),
        );
        assert_eq!(t, Transition::Abort(FaultKind::FieldNotFound { field_id: 12 }));
        assert_eq!(run.stage, Stage::Done);
        assert_eq!(run.errors, vec!["Field #12 not found"]);
    }

    #[test]
    fn timeout_retries_until_bound_then_aborts() {
        let mut run = make_run(3);
        StateMachine::next(&mut run, StageOutcome::Success);
        StateMachine::next(&mut run, StageOutcome::Success);
        assert_eq!(run.stage, Stage::SensorFetch);

        // Attempts 1 and 2 time out with budget remaining.
        for expected in 1..=2 {
            let attempts = run.begin_attempt();
            let t = StateMachine::next(
                &mut run,
                StageOutcome::Failure(FaultKind::SensorTimeout { attempts }),
            );
            assert_eq!(t, Transition::Retry { attempt: expected });
            assert_eq!(run.stage, Stage::SensorFetch);
        }

        // Attempt 3 exhausts the bound.
        let attempts = run.begin_attempt();
        let t = StateMachine::next(
            &mut run,
            StageOutcome::Failure(FaultKind::SensorTimeout { attempts }),
        );
        assert_eq!(t, Transition::Abort(FaultKind::SensorTimeout { attempts: 3 }));
        assert_eq!(run.stage, Stage::Done);
        assert_eq!(run.errors, vec!["Sensor timeout after 3 attempts"]);
    }

    #[test]
    fn single_attempt_timeout_aborts_without_retry() {
        let mut run = make_run(1);
        StateMachine::next(&mut run, StageOutcome::Success);
        StateMachine::next(&mut run, StageOutcome::Success);

        let attempts = run.begin_attempt();
        let t = StateMachine::next(
            &mut run,
            StageOutcome::Failure(FaultKind::SensorTimeout { attempts }),
        );
        assert_eq!(t, Transition::Abort(FaultKind::SensorTimeout { attempts: 1 }));
        assert_eq!(run.errors, vec!["Sensor timeout after 1 attempts"]);
    }

    #[test]
    fn hardware_fault_aborts_immediately_even_with_budget() {
        let mut run = make_run(5);
        StateMachine::next(&mut run, StageOutcome::Success);
        StateMachine::next(&mut run, StageOutcome::Success);

        run.begin_attempt();
        let t = StateMachine::next(
            &mut run,
            StageOutcome::Failure(FaultKind::HardwareFault { raw: -50.0 }),
        );
        assert_eq!(t, Transition::Abort(FaultKind::HardwareFault { raw: -50.0 }));
        assert_eq!(run.stage, Stage::Done);
        assert_eq!(run.attempts, 1);
        assert_eq!(
            run.errors,
            vec!["Sensor hardware error: impossible value -50.0%"]
        );
    }

    #[test]
    fn retry_then_succeed() {
        let mut run = make_run(3);
        StateMachine::next(&mut run, StageOutcome::Success);
        StateMachine::next(&mut run, StageOutcome::Success);

        let attempts = run.begin_attempt();
        let t = StateMachine::next(
            &mut run,
            StageOutcome::Failure(FaultKind::SensorTimeout { attempts }),
        );
        assert!(matches!(t, Transition::Retry { .. }));

        run.begin_attempt();
        let t = StateMachine::next(&mut run, StageOutcome::Success);
        assert_eq!(t, Transition::Next(Stage::ValidateDecide));
        assert_eq!(run.attempts, 2);
        assert!(run.errors.is_empty());
    }

    #[test]
    fn done_is_terminal() {
        let mut run = make_run(3);
        run.stage = Stage::Done;

        let t = StateMachine::next(&mut run, StageOutcome::Success);
        assert_eq!(t, Transition::Next(Stage::Done));
        assert_eq!(run.stage, Stage::Done);
        assert!(run.stage_history.is_empty());
    }

    #[test]
    fn stage_history_records_reentries() {
        let mut run = make_run(3);
        StateMachine::next(&mut run, StageOutcome::Success);
        StateMachine::next(&mut run, StageOutcome::Success);

        let attempts = run.begin_attempt();
        StateMachine::next(
            &mut run,
            StageOutcome::Failure(FaultKind::SensorTimeout { attempts }),
        );
        run.begin_attempt();
        StateMachine::next(&mut run, StageOutcome::Success);
        StateMachine::next(&mut run, StageOutcome::Success);

        assert_eq!(
            run.stage_history,
            vec![
                Stage::Start,
                Stage::FieldLookup,
                Stage::SensorFetch,
                Stage::SensorFetch,
                Stage::ValidateDecide,
            ]
        );
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Start.to_string(), "START");
        assert_eq!(Stage::FieldLookup.to_string(), "FIELD_LOOKUP");
        assert_eq!(Stage::SensorFetch.to_string(), "SENSOR_FETCH");
        assert_eq!(Stage::ValidateDecide.to_string(), "VALIDATE_DECIDE");
        assert_eq!(Stage::Done.to_string(), "DONE");
    }
}
