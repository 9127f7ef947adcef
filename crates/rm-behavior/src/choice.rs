//! Logit route choice over a cost table.
//!
//! ```text
//! p_i ∝ exp(-β · c_i / c_min)
//! ```
//!
//! Dividing by the cheapest cost makes β independent of the network's time
//! scale: β = 8 means a path 10 % slower than the best is chosen
//! `exp(-0.8) ≈ 0.45` times as often.
//!
//! On top of the deterministic distribution, [`LogitChoice::choose`] applies
//! two sources of randomness from the agent's own RNG: with probability
//! `exploration` the agent picks uniformly, otherwise each cost is perturbed
//! by Gaussian noise with standard deviation `noise · c_i` before the logit.

use rand_distr::{Distribution, Normal};
use tracing::debug;

use rm_agent::CostTable;
use rm_core::{AgentRng, HumanConfig, PathIndex};

use crate::{BehaviorError, BehaviorResult};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LogitChoice {
    pub beta: f64,
    pub exploration: f64,
    pub noise: f64,
}

impl Default for LogitChoice {
    fn default() -> Self {
        Self::from_config(&HumanConfig::default())
    }
}

impl LogitChoice {
    pub fn new(beta: f64, exploration: f64, noise: f64) -> Self {
        Self { beta, exploration, noise }
    }

    pub fn from_config(config: &HumanConfig) -> Self {
        Self::new(config.beta, config.exploration, config.noise)
    }

    /// Noise-free choice distribution.  Uniform for a cold table.
    pub fn probabilities(&self, table: &CostTable) -> Vec<f64> {
        match effective_costs(table) {
            Some(costs) => logit(&costs, self.beta),
            None => uniform(table.len()),
        }
    }

    /// Sample tomorrow's path.
    pub fn choose(&self, table: &CostTable, rng: &mut AgentRng) -> BehaviorResult<PathIndex> {
        let n = table.len();
        if n == 0 {
            return Err(BehaviorError::EmptyTable);
        }
        if n == 1 {
            return Ok(PathIndex(0));
        }

        let Some(mut costs) = effective_costs(table) else {
            debug!(paths = n, "cold start: choosing uniformly");
            return Ok(PathIndex(rng.gen_range(0..n) as u16));
        };

        if self.exploration > 0.0 && rng.gen_bool(self.exploration) {
            return Ok(PathIndex(rng.gen_range(0..n) as u16));
        }

        if self.noise > 0.0 {
            for c in costs.iter_mut() {
                if let Ok(normal) = Normal::new(0.0, self.noise * *c) {
                    *c = (*c + normal.sample(rng.inner())).max(0.0);
                }
            }
        }

        let weights = logit(&costs, self.beta);
        // Weights come from finite costs, so the draw only fails on NaN input.
        let pick = rng.pick_weighted(&weights).unwrap_or(0);
        Ok(PathIndex(pick as u16))
    }
}

/// Estimates with unknown paths filled in by the cheapest known estimate,
/// or `None` when nothing is known.
fn effective_costs(table: &CostTable) -> Option<Vec<f64>> {
    if table.is_cold() {
        return None;
    }
    let known_min = (0..table.len())
        .map(|i| PathIndex(i as u16))
        .filter(|&p| table.is_known(p))
        .map(|p| table.estimate(p))
        .fold(f64::INFINITY, f64::min);
    Some(
        (0..table.len())
            .map(|i| {
                let p = PathIndex(i as u16);
                if table.is_known(p) { table.estimate(p) } else { known_min }
            })
            .collect(),
    )
}

fn logit(costs: &[f64], beta: f64) -> Vec<f64> {
    let c_min = costs.iter().copied().fold(f64::INFINITY, f64::min);
    let scale = if c_min > 0.0 && c_min.is_finite() { c_min } else { 1.0 };

    let utilities: Vec<f64> = costs.iter().map(|c| -beta * c / scale).collect();
    let max_u = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = utilities.iter().map(|u| (u - max_u).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if !(sum > 0.0) || !sum.is_finite() {
        return uniform(costs.len());
    }
    exps.into_iter().map(|e| e / sum).collect()
}

fn uniform(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}
