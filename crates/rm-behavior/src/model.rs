//! The `HumanModel` trait — the extension point for human drivers.

use rm_agent::CostTable;
use rm_core::{AgentRng, PathIndex};

use crate::{BehaviorError, BehaviorResult, LogitChoice};

/// Day-to-day learning rule for a human driver.
///
/// Only [`next_estimate`][Self::next_estimate] and [`choice`][Self::choice]
/// are required.  Validation, window bookkeeping, the choice distribution
/// and sampling have defaults built on those two.
///
/// # Thread safety
///
/// The day loop may call `choose` for many agents in parallel, so models
/// must be `Send + Sync` and keep no per-agent state of their own.
pub trait HumanModel: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Estimate for `path` after observing `sample`, computed from the table
    /// as it was before the observation.
    fn next_estimate(&self, table: &CostTable, path: PathIndex, sample: f64) -> f64;

    /// Choice rule used by [`probabilities`][Self::probabilities] and
    /// [`choose`][Self::choose].
    fn choice(&self) -> &LogitChoice;

    /// Fold the realised travel time of `path` into `table`.  Other paths
    /// are untouched.
    fn update(&self, table: &mut CostTable, path: PathIndex, travel_time: f64) -> BehaviorResult<()> {
        if path.index() >= table.len() {
            return Err(BehaviorError::PathOutOfRange { path, len: table.len() });
        }
        if !travel_time.is_finite() || travel_time < 0.0 {
            return Err(BehaviorError::InvalidTravelTime(travel_time));
        }
        let estimate = self.next_estimate(table, path, travel_time);
        table.record(path, travel_time, estimate);
        Ok(())
    }

    /// Noise-free distribution over path indices; lower cost, higher mass.
    fn probabilities(&self, table: &CostTable) -> Vec<f64> {
        self.choice().probabilities(table)
    }

    /// Sample the path for the next day.
    fn choose(&self, table: &CostTable, rng: &mut AgentRng) -> BehaviorResult<PathIndex> {
        self.choice().choose(table, rng)
    }
}
