//! Macroscopic link-performance simulator.
//!
//! Each link's travel time is the BPR volume-delay function
//!
//! ```text
//! t = t_free · (1 + α · (v / c)^β)
//! ```
//!
//! where `v` is the hourly entry rate onto the link within a time bin and
//! `c` its capacity.  Entries are binned by free-flow arrival time at each
//! link; trips then traverse their links in order and pick up the delay of
//! the bin they actually enter in.  Entries after the horizon fall into one
//! overflow bin.
//!
//! There is no queue spillback and no interaction between links beyond the
//! shared bins, which is enough to make route choice congestion-sensitive.

use rm_core::{Day, EdgeId, SimulatorConfig};
use rm_paths::RoadNetwork;

use crate::{SimulatorError, SimulatorResult, TrafficSimulator, TripRequest, TripResult};

pub struct BprSimulator {
    network:   RoadNetwork,
    alpha:     f64,
    beta:      f64,
    bin_secs:  f64,
    bins:      usize,
    connected: bool,
}

impl BprSimulator {
    pub fn new(network: RoadNetwork, config: &SimulatorConfig) -> Self {
        let bin_secs = config.bin_secs.max(1);
        Self {
            network,
            alpha:     config.bpr_alpha,
            beta:      config.bpr_beta,
            bin_secs:  bin_secs as f64,
            bins:      (config.horizon_secs / bin_secs) as usize + 1,
            connected: false,
        }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    #[inline]
    fn bin_of(&self, t: f64) -> usize {
        ((t.max(0.0) / self.bin_secs) as usize).min(self.bins - 1)
    }

    /// Congested travel time on `edge` given `entries` vehicles in one bin.
    pub fn link_time(&self, edge: EdgeId, entries: u32) -> f64 {
        let free = self.network.edge_free_flow_secs[edge.index()];
        let capacity = self.network.edge_capacity_vph[edge.index()];
        let rate = entries as f64 * 3_600.0 / self.bin_secs;
        free * (1.0 + self.alpha * (rate / capacity).powf(self.beta))
    }

    fn check_edges(&self, trips: &[TripRequest<'_>]) -> SimulatorResult<()> {
        let n = self.network.edge_count();
        for trip in trips {
            if let Some(bad) = trip.edges.iter().find(|e| e.index() >= n) {
                return Err(SimulatorError::Unrecoverable(format!(
                    "trip of {} uses unknown edge {bad}",
                    trip.agent
                )));
            }
        }
        Ok(())
    }
}

impl TrafficSimulator for BprSimulator {
    fn name(&self) -> &str {
        "bpr"
    }

    fn connect(&mut self) -> SimulatorResult<()> {
        self.connected = true;
        Ok(())
    }

    fn simulate_day(&mut self, _day: Day, trips: &[TripRequest<'_>]) -> SimulatorResult<Vec<TripResult>> {
        if !self.connected {
            return Err(SimulatorError::NotConnected);
        }
        self.check_edges(trips)?;

        let mut entries = vec![0u32; self.network.edge_count() * self.bins];
        for trip in trips {
            let mut t = trip.start_time as f64;
            for e in trip.edges {
                entries[e.index() * self.bins + self.bin_of(t)] += 1;
                t += self.network.edge_free_flow_secs[e.index()];
            }
        }

        Ok(trips
            .iter()
            .map(|trip| {
                let start = trip.start_time as f64;
                let mut t = start;
                for e in trip.edges {
                    t += self.link_time(*e, entries[e.index() * self.bins + self.bin_of(t)]);
                }
                TripResult { agent: trip.agent, travel_time: t - start }
            })
            .collect())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
