//! Machine behavior vectors (φ) and their named presets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Weights over `(own, group, other, all)` travel-time statistics.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct BehaviorVector(pub [f64; 4]);

impl BehaviorVector {
    pub const ZERO: BehaviorVector = BehaviorVector([0.0; 4]);

    #[inline]
    pub fn new(own: f64, group: f64, other: f64, all: f64) -> Self {
        Self([own, group, other, all])
    }

    #[inline] pub fn own(&self)   -> f64 { self.0[0] }
    #[inline] pub fn group(&self) -> f64 { self.0[1] }
    #[inline] pub fn other(&self) -> f64 { self.0[2] }
    #[inline] pub fn all(&self)   -> f64 { self.0[3] }

    /// Linear functional `φ · stats`.
    #[inline]
    pub fn apply(&self, stats: [f64; 4]) -> f64 {
        self.0.iter().zip(stats).map(|(w, s)| w * s).sum()
    }
}

/// Named machine strategies.
///
/// Parsed from configuration as lowercase names, so a misspelled strategy is
/// rejected when the configuration loads rather than mid-run.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Minimise the system-wide mean.
    Altruistic,
    /// Half own, half own group.
    Collaborative,
    /// Twice own, minus the other group.
    Competitive,
    /// Maximise the other group's delay.
    Malicious,
    /// Minimise own travel time.
    #[default]
    Selfish,
    /// Half own, half system-wide.
    Social,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Altruistic,
        Strategy::Collaborative,
        Strategy::Competitive,
        Strategy::Malicious,
        Strategy::Selfish,
        Strategy::Social,
    ];

    pub fn phi(self) -> BehaviorVector {
        match self {
            Strategy::Altruistic    => BehaviorVector::new(0.0, 0.0, 0.0, 1.0),
            Strategy::Collaborative => BehaviorVector::new(0.5, 0.5, 0.0, 0.0),
            Strategy::Competitive   => BehaviorVector::new(2.0, 0.0, -1.0, 0.0),
            Strategy::Malicious     => BehaviorVector::new(0.0, 0.0, -1.0, 0.0),
            Strategy::Selfish       => BehaviorVector::new(1.0, 0.0, 0.0, 0.0),
            Strategy::Social        => BehaviorVector::new(0.5, 0.0, 0.0, 0.5),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Altruistic    => "altruistic",
            Strategy::Collaborative => "collaborative",
            Strategy::Competitive   => "competitive",
            Strategy::Malicious     => "malicious",
            Strategy::Selfish       => "selfish",
            Strategy::Social        => "social",
        }
    }
}

impl From<Strategy> for BehaviorVector {
    fn from(s: Strategy) -> Self {
        s.phi()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
