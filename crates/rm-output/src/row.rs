//! Plain data row types written by output backends.

use rm_sim::TravelTimeRecord;

use crate::OutputResult;

/// One agent's trip on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimeRow {
    pub day:         u64,
    pub phase:       String,
    pub agent_id:    u32,
    /// `"human"` or `"machine"`.
    pub kind:        &'static str,
    pub action:      u16,
    pub origin:      u32,
    pub destination: u32,
    pub start_time:  u32,
    pub travel_time: f64,
    /// Machines only.
    pub reward:      Option<f64>,
    /// Cost estimates as a JSON array, e.g. `[612.5,720.0]`.
    pub cost_table:  String,
}

impl TravelTimeRow {
    pub fn from_record(record: &TravelTimeRecord, phase: &str) -> OutputResult<Self> {
        Ok(Self {
            day:         record.day.0,
            phase:       phase.to_owned(),
            agent_id:    record.agent.0,
            kind:        record.kind.as_str(),
            action:      record.action.0,
            origin:      record.origin.0,
            destination: record.destination.0,
            start_time:  record.start_time,
            travel_time: record.travel_time,
            reward:      record.reward,
            cost_table:  serde_json::to_string(&record.cost_table)?,
        })
    }
}

/// Aggregates for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummaryRow {
    pub day:                      u64,
    pub phase:                    String,
    pub humans:                   u64,
    pub machines:                 u64,
    pub mean_travel_time:         f64,
    pub mean_human_travel_time:   Option<f64>,
    pub mean_machine_travel_time: Option<f64>,
    /// Trailing mean of `mean_travel_time` over `reporting.smooth_by` days.
    pub smoothed_travel_time:     f64,
}
