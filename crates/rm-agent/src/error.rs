use thiserror::Error;

use rm_core::NodeId;

#[derive(Debug, Error)]
pub enum AgentError {
    /// More machines were requested than there are humans left to convert.
    #[error("cannot mutate {requested} agents: only {available} humans remain")]
    InsufficientPopulation { requested: usize, available: usize },

    #[error("demand error: {0}")]
    Demand(String),

    #[error("no paths known from {origin} to {destination}")]
    UnknownOdPair { origin: NodeId, destination: NodeId },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
