//! Per-day output of the driver.

use rm_core::{AgentId, AgentKind, Day, NodeId, PathIndex, Phase};

/// One agent's trip on one day.  Written once, never changed.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelTimeRecord {
    pub day: Day,
    pub phase: Phase,
    pub agent: AgentId,
    pub kind: AgentKind,
    pub action: PathIndex,
    pub origin: NodeId,
    pub destination: NodeId,
    pub start_time: u32,
    pub travel_time: f64,
    /// Shaped reward.  Machines only.
    pub reward: Option<f64>,
    /// The agent's cost estimates after today's update.
    pub cost_table: Vec<f64>,
}

/// Aggregates for one completed day.
#[derive(Clone, Debug, PartialEq)]
pub struct DayReport {
    pub day: Day,
    pub phase: Phase,
    pub humans: usize,
    pub machines: usize,
    pub mean_travel_time: f64,
    pub mean_human_travel_time: Option<f64>,
    pub mean_machine_travel_time: Option<f64>,
    pub mean_machine_reward: Option<f64>,
    /// Simulator retries needed to complete the day.
    pub retries: u32,
}
