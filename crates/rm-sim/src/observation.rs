//! What a machine sees before it picks a path.
//!
//! | Kind                   | Vector                                                   |
//! |------------------------|----------------------------------------------------------|
//! | `previous_agent_start` | `[start / horizon, count_0, …, count_{n-1}]`             |
//! | `cost_table`           | `[start / horizon, est_0 / horizon, …, est_{n-1} / horizon]` |
//!
//! `count_i` is the number of agents on the same OD pair who start in
//! `[start - span, start)` and have already chosen path `i` today.  Humans
//! choose before any machine and machines act in start-time order, so the
//! counts only ever include decisions already made.

use rm_agent::AgentStore;
use rm_core::{AgentId, MachineConfig, ObservationKind, PathIndex};
use rm_paths::PathCatalog;

/// Builds observation vectors.  Start times and OD pairs never change, so
/// the per-OD index is built once.
pub struct ObservationBuilder {
    kind: ObservationKind,
    horizon: f64,
    span: u32,
    /// Per OD pair: `(start_time, agent)` ascending.
    by_od: Vec<Vec<(u32, AgentId)>>,
}

impl ObservationBuilder {
    pub fn new(config: &MachineConfig, horizon_secs: u32, store: &AgentStore, catalog: &PathCatalog) -> Self {
        let mut by_od: Vec<Vec<(u32, AgentId)>> = vec![Vec::new(); catalog.len()];
        for agent in store.agent_ids() {
            let i = agent.index();
            if let Some(bucket) = by_od.get_mut(store.od[i].index()) {
                bucket.push((store.start_time[i], agent));
            }
        }
        for bucket in &mut by_od {
            bucket.sort_unstable();
        }
        Self {
            kind: config.observation,
            horizon: horizon_secs.max(1) as f64,
            span: config.observed_span_secs,
            by_od,
        }
    }

    pub fn kind(&self) -> ObservationKind {
        self.kind
    }

    /// Observation length for an agent with `n_paths` alternatives.
    pub fn len(&self, n_paths: usize) -> usize {
        n_paths + 1
    }

    /// `choices[i]` is agent `i`'s path today, or `PathIndex::INVALID` if it
    /// has not chosen yet.
    pub fn observe(&self, store: &AgentStore, agent: AgentId, n_paths: usize, choices: &[PathIndex]) -> Vec<f64> {
        let i = agent.index();
        let start = store.start_time[i];
        let mut obs = Vec::with_capacity(self.len(n_paths));
        obs.push(start as f64 / self.horizon);

        match self.kind {
            ObservationKind::PreviousAgentStart => {
                let mut counts = vec![0.0; n_paths];
                if let Some(bucket) = self.by_od.get(store.od[i].index()) {
                    let lo = bucket.partition_point(|&(t, _)| t < start.saturating_sub(self.span));
                    let hi = bucket.partition_point(|&(t, _)| t < start);
                    for &(_, other) in &bucket[lo..hi] {
                        let c = choices[other.index()];
                        if c.is_valid() && c.index() < n_paths {
                            counts[c.index()] += 1.0;
                        }
                    }
                }
                obs.extend(counts);
            }
            ObservationKind::CostTable => {
                let estimates = store.cost_tables[i].estimates();
                obs.extend(estimates.iter().take(n_paths).map(|e| e / self.horizon));
            }
        }
        obs
    }
}
