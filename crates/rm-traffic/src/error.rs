use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulatorError {
    /// The connection dropped; reconnecting may succeed.
    #[error("simulator connection lost: {0}")]
    ConnectionLost(String),

    /// The simulator cannot continue this run.
    #[error("simulator failed: {0}")]
    Unrecoverable(String),

    #[error("simulator is not connected")]
    NotConnected,
}

impl SimulatorError {
    /// `true` if a reconnect-and-retry is worth attempting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimulatorError::ConnectionLost(_) | SimulatorError::NotConnected)
    }
}

pub type SimulatorResult<T> = Result<T, SimulatorError>;
