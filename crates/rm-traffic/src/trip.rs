//! Trip records crossing the simulator boundary.

use rm_core::{AgentId, EdgeId};

/// One vehicle to simulate: when it leaves and which links it takes.
#[derive(Clone, Debug, PartialEq)]
pub struct TripRequest<'a> {
    pub agent: AgentId,
    /// Seconds from the start of the horizon.
    pub start_time: u32,
    pub edges: &'a [EdgeId],
}

/// Realised travel time of one trip.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TripResult {
    pub agent: AgentId,
    pub travel_time: f64,
}
