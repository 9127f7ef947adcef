//! Trip demand: one trip per agent per day, the same every day.
//!
//! # CSV format
//!
//! ```csv
//! id,origin,destination,start_time
//! 0,0,3,12
//! 1,0,3,45
//! ```
//!
//! Ids must be exactly `0..n` in any order; the row with id `i` becomes
//! `AgentId(i)`.  `start_time` is seconds from the start of the horizon.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use rm_core::{NodeId, PopulationConfig, SimRng};

use crate::{AgentError, AgentResult};

/// What one agent does every day.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Trip {
    pub origin: NodeId,
    pub destination: NodeId,
    pub start_time: u32,
}

#[derive(Deserialize)]
struct DemandRecord {
    id:          u32,
    origin:      u32,
    destination: u32,
    start_time:  u32,
}

pub fn load_demand_csv(path: &Path) -> AgentResult<Vec<Trip>> {
    let file = std::fs::File::open(path)?;
    load_demand_reader(file)
}

/// Like [`load_demand_csv`] but accepts any `Read` source.
pub fn load_demand_reader<R: Read>(reader: R) -> AgentResult<Vec<Trip>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows: Vec<DemandRecord> = Vec::new();
    for result in csv_reader.deserialize::<DemandRecord>() {
        rows.push(result.map_err(|e| AgentError::Demand(e.to_string()))?);
    }
    rows.sort_by_key(|r| r.id);

    for (expected, row) in rows.iter().enumerate() {
        if row.id as usize != expected {
            return Err(AgentError::Demand(format!(
                "agent ids must be 0..{} without gaps or repeats; found id {} at position {}",
                rows.len(),
                row.id,
                expected
            )));
        }
    }

    Ok(rows
        .into_iter()
        .map(|r| Trip {
            origin:      NodeId(r.origin),
            destination: NodeId(r.destination),
            start_time:  r.start_time,
        })
        .collect())
}

/// `num_agents` trips over the configured OD pairs, assigned round-robin,
/// with start times uniform in `[0, departure_window_secs)`.
pub fn synthetic_demand(config: &PopulationConfig, rng: &mut SimRng) -> Vec<Trip> {
    if config.od_pairs.is_empty() {
        return Vec::new();
    }
    (0..config.num_agents)
        .map(|i| {
            let [o, d] = config.od_pairs[i % config.od_pairs.len()];
            let start_time = if config.departure_window_secs == 0 {
                0
            } else {
                rng.gen_range(0..config.departure_window_secs)
            };
            Trip { origin: NodeId(o), destination: NodeId(d), start_time }
        })
        .collect()
}

/// Distinct `(origin, destination)` pairs in first-appearance order.
pub fn unique_od_pairs(trips: &[Trip]) -> Vec<(NodeId, NodeId)> {
    let mut pairs: Vec<(NodeId, NodeId)> = Vec::new();
    for t in trips {
        let pair = (t.origin, t.destination);
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}
