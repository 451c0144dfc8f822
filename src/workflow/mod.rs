mod record;
mod run;
mod state;

pub use record::{Confidence, Decision, DecisionRecord, Verdict};
pub use run::{FaultKind, RetryPolicy, WorkflowState};
pub use state::{Stage, StageOutcome, StateMachine, Transition};
