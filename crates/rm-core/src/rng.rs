//! Deterministic per-agent and run-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent owns an independent `SmallRng` seeded by
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio.
//! Route choices therefore depend only on the run seed, the agent id and the
//! agent's own history, never on the order in which agents are visited.
//! That is what lets the human choice phase run on Rayon without changing
//! results.
//!
//! Operations that touch the whole population (mutation sampling, the
//! uniform pre-training policy, path sampling) use a `SimRng` seeded
//! explicitly by the caller.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Stored in a parallel `Vec<AgentRng>` next to the population arrays.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` / `rand_distr`
    /// distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Draw an index with probability proportional to `weights[i]`.
    ///
    /// Returns `None` when `weights` is empty, contains a negative or
    /// non-finite entry, or sums to zero.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        WeightedIndex::new(weights)
            .ok()
            .map(|dist| dist.sample(&mut self.0))
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Run-level RNG for operations over the whole population.
///
/// Used only from the single-threaded parts of the day loop.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset, e.g. one per
    /// experiment component from a single run seed.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Choose `amount` distinct indices from `0..length`, uniformly and
    /// without replacement.  The result is in sampling order.
    ///
    /// # Panics
    /// Panics if `amount > length`; callers check the bound first.
    pub fn sample_indices(&mut self, length: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.0, length, amount).into_vec()
    }

    /// Weighted draw, see [`AgentRng::pick_weighted`].
    pub fn pick_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        WeightedIndex::new(weights)
            .ok()
            .map(|dist| dist.sample(&mut self.0))
    }
}
