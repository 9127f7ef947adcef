//! Built-in human learning rules.
//!
//! | Model             | Update for the taken path                        |
//! |-------------------|--------------------------------------------------|
//! | `Gawron`          | `c' = (1 - a)·c + a·s`                           |
//! | `Cumulative`      | `c' = c + (s - c) / (n + 2)`                     |
//! | `WeightedAverage` | `c' = a·prior + (1 - a)·mean(last m samples)`    |
//!
//! `n` counts samples already taken on the path, so the prior weighs like
//! one extra observation.  When a blank table sees its first sample on a
//! path there is nothing to blend with and the estimate becomes the sample.

use rm_agent::CostTable;
use rm_core::{HumanConfig, HumanModelKind, PathIndex};

use crate::{HumanModel, LogitChoice};

/// First sample on a path with no prior.
fn unseeded(table: &CostTable, path: PathIndex) -> bool {
    !table.is_known(path)
}

// ── Gawron ────────────────────────────────────────────────────────────────────

/// Exponential smoothing with weight `rate` on the new sample.
#[derive(Clone, Debug)]
pub struct Gawron {
    pub rate: f64,
    pub choice: LogitChoice,
}

impl HumanModel for Gawron {
    fn name(&self) -> &'static str {
        "gawron"
    }

    fn next_estimate(&self, table: &CostTable, path: PathIndex, sample: f64) -> f64 {
        if unseeded(table, path) {
            return sample;
        }
        (1.0 - self.rate) * table.estimate(path) + self.rate * sample
    }

    fn choice(&self) -> &LogitChoice {
        &self.choice
    }
}

// ── Cumulative ────────────────────────────────────────────────────────────────

/// Running mean of all samples with the prior as one pseudo sample.
#[derive(Clone, Debug)]
pub struct Cumulative {
    pub choice: LogitChoice,
}

impl HumanModel for Cumulative {
    fn name(&self) -> &'static str {
        "cumulative"
    }

    fn next_estimate(&self, table: &CostTable, path: PathIndex, sample: f64) -> f64 {
        if unseeded(table, path) {
            return sample;
        }
        let c = table.estimate(path);
        let seen = if table.has_prior() {
            table.sample_count(path) as f64
        } else {
            // Without a prior the first sample is the baseline.
            table.sample_count(path) as f64 - 1.0
        };
        c + (sample - c) / (seen + 2.0)
    }

    fn choice(&self) -> &LogitChoice {
        &self.choice
    }
}

// ── WeightedAverage ───────────────────────────────────────────────────────────

/// Prior blended with the mean of a bounded window of recent samples.
#[derive(Clone, Debug)]
pub struct WeightedAverage {
    pub prior_weight: f64,
    pub choice: LogitChoice,
}

impl HumanModel for WeightedAverage {
    fn name(&self) -> &'static str {
        "weighted_average"
    }

    fn next_estimate(&self, table: &CostTable, path: PathIndex, sample: f64) -> f64 {
        let window = table.recent(path);
        let keep = window.len().min(table.memory().saturating_sub(1));
        let (sum, len) = window
            .iter()
            .rev()
            .take(keep)
            .fold((sample, 1usize), |(s, n), x| (s + x, n + 1));
        let mean = sum / len as f64;

        match table.prior(path) {
            Some(prior) => self.prior_weight * prior + (1.0 - self.prior_weight) * mean,
            None => mean,
        }
    }

    fn choice(&self) -> &LogitChoice {
        &self.choice
    }
}

// ── AnyHumanModel ─────────────────────────────────────────────────────────────

/// The model named by `[human] model`.
#[derive(Clone, Debug)]
pub enum AnyHumanModel {
    Gawron(Gawron),
    Cumulative(Cumulative),
    WeightedAverage(WeightedAverage),
}

impl AnyHumanModel {
    pub fn from_config(config: &HumanConfig) -> Self {
        let choice = LogitChoice::from_config(config);
        match config.model {
            HumanModelKind::Gawron => {
                AnyHumanModel::Gawron(Gawron { rate: config.learning_rate, choice })
            }
            HumanModelKind::Cumulative => AnyHumanModel::Cumulative(Cumulative { choice }),
            HumanModelKind::WeightedAverage => AnyHumanModel::WeightedAverage(WeightedAverage {
                prior_weight: config.learning_rate,
                choice,
            }),
        }
    }

    fn inner(&self) -> &dyn HumanModel {
        match self {
            AnyHumanModel::Gawron(m) => m,
            AnyHumanModel::Cumulative(m) => m,
            AnyHumanModel::WeightedAverage(m) => m,
        }
    }
}

impl HumanModel for AnyHumanModel {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn next_estimate(&self, table: &CostTable, path: PathIndex, sample: f64) -> f64 {
        self.inner().next_estimate(table, path, sample)
    }

    fn choice(&self) -> &LogitChoice {
        self.inner().choice()
    }
}
