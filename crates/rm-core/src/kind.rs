//! Agent kind shared across all crates.
//!
//! Group membership for reward shaping is derived from the kind: there is no
//! separately stored group table.

use serde::{Deserialize, Serialize};

/// Whether a driver follows a behavioral model or a learning policy.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Rule-based driver updated by a `HumanModel`.
    #[default]
    Human,
    /// Autonomous vehicle controlled by a `MachinePolicy`.
    Machine,
}

impl AgentKind {
    #[inline]
    pub fn is_machine(self) -> bool {
        matches!(self, AgentKind::Machine)
    }

    /// Label used in output rows.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Human   => "human",
            AgentKind::Machine => "machine",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
