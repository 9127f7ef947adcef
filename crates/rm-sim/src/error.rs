use thiserror::Error;

use rm_agent::AgentError;
use rm_behavior::BehaviorError;
use rm_core::{AgentId, CoreError, PathIndex, Phase};
use rm_paths::PathError;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("path generation failed: {0}")]
    Paths(#[from] PathError),

    #[error("population error: {0}")]
    Population(#[from] AgentError),

    #[error("behavior model error: {0}")]
    Behavior(#[from] BehaviorError),

    /// A simulator failure that a reconnect may fix.  Reported to observers
    /// while retrying; never returned from a day that eventually succeeds.
    #[error("recoverable simulator failure (attempt {attempt}): {reason}")]
    RecoverableSimulation { attempt: u32, reason: String },

    /// Retries exhausted or the simulator cannot continue.  The run is over.
    #[error("simulation aborted after {completed_days} completed days: {reason}")]
    FatalSimulation { reason: String, completed_days: u64 },

    #[error("policy chose {action} for {agent}, which has only {n_actions} paths")]
    InvalidAction { agent: AgentId, action: PathIndex, n_actions: usize },

    #[error("`{operation}` is not allowed in phase {phase}")]
    PhaseViolation { operation: &'static str, phase: Phase },

    #[error("environment is not started")]
    NotStarted,
}

impl EnvError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        EnvError::Config(CoreError::Config(msg.into()))
    }
}

pub type EnvResult<T> = Result<T, EnvError>;
