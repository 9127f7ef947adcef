//! Per-agent travel-cost estimates.
//!
//! A table holds one estimate per path of the agent's OD pair.  Fresh tables
//! start from the free-flow prior; a blank table has no prior at all and
//! counts as a cold start until the first sample arrives.
//!
//! The table only stores state.  How a sample moves an estimate is decided
//! by the human model in `rm-behavior`, which writes the result back through
//! [`CostTable::record`].

use std::collections::VecDeque;

use rm_core::PathIndex;

#[derive(Clone, Debug, PartialEq)]
pub struct CostTable {
    estimates: Vec<f64>,
    /// Free-flow prior.  Empty for a blank table.
    prior: Vec<f64>,
    samples: Vec<u32>,
    recent: Vec<VecDeque<f64>>,
    memory: usize,
}

impl CostTable {
    /// Table seeded with `prior`, keeping the last `memory` samples per path.
    pub fn new(prior: Vec<f64>, memory: usize) -> Self {
        let n = prior.len();
        Self {
            estimates: prior.clone(),
            prior,
            samples: vec![0; n],
            recent: vec![VecDeque::new(); n],
            memory: memory.max(1),
        }
    }

    /// Table over `paths` options with no prior information.
    pub fn blank(paths: usize, memory: usize) -> Self {
        Self {
            estimates: vec![0.0; paths],
            prior: Vec::new(),
            samples: vec![0; paths],
            recent: vec![VecDeque::new(); paths],
            memory: memory.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    #[inline]
    pub fn estimate(&self, path: PathIndex) -> f64 {
        self.estimates[path.index()]
    }

    pub fn estimates(&self) -> &[f64] {
        &self.estimates
    }

    /// Prior for `path`, if the table has one.
    pub fn prior(&self, path: PathIndex) -> Option<f64> {
        self.prior.get(path.index()).copied()
    }

    pub fn has_prior(&self) -> bool {
        !self.prior.is_empty()
    }

    #[inline]
    pub fn sample_count(&self, path: PathIndex) -> u32 {
        self.samples[path.index()]
    }

    pub fn total_samples(&self) -> u64 {
        self.samples.iter().map(|&n| n as u64).sum()
    }

    /// Most recent samples on `path`, oldest first.
    pub fn recent(&self, path: PathIndex) -> &VecDeque<f64> {
        &self.recent[path.index()]
    }

    pub fn memory(&self) -> usize {
        self.memory
    }

    /// `true` when the estimate for `path` rests on a prior or a sample.
    #[inline]
    pub fn is_known(&self, path: PathIndex) -> bool {
        self.has_prior() || self.samples[path.index()] > 0
    }

    /// No prior and no samples: nothing to base a choice on.
    pub fn is_cold(&self) -> bool {
        !self.has_prior() && self.total_samples() == 0
    }

    /// Store `sample` as the latest observation on `path` and replace its
    /// estimate with `estimate`.
    pub fn record(&mut self, path: PathIndex, sample: f64, estimate: f64) {
        let i = path.index();
        self.samples[i] = self.samples[i].saturating_add(1);
        let window = &mut self.recent[i];
        if window.len() == self.memory {
            window.pop_front();
        }
        window.push_back(sample);
        self.estimates[i] = estimate;
    }

    /// Forget all samples and return to the prior (or to blank).
    pub fn reset(&mut self) {
        if self.has_prior() {
            self.estimates.copy_from_slice(&self.prior);
        } else {
            self.estimates.iter_mut().for_each(|e| *e = 0.0);
        }
        self.samples.iter_mut().for_each(|n| *n = 0);
        self.recent.iter_mut().for_each(VecDeque::clear);
    }
}
