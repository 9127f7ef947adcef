//! Day counter and experiment phases.
//!
//! # Design
//!
//! A run is a sequence of simulated days.  Each day every agent makes one
//! trip, so the day is the only unit of time the driver needs; second-level
//! timing inside a day (start times, travel times) belongs to the trips.
//!
//! Orthogonal to the day counter is the [`Phase`]: it gates whether the
//! population may mutate and whether machine rewards feed a learning
//! update.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Day ──────────────────────────────────────────────────────────────────────

/// A simulated day, counted from 0.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Day(pub u64);

impl Day {
    pub const ZERO: Day = Day(0);

    #[inline]
    pub fn next(self) -> Day {
        Day(self.0 + 1)
    }

    /// Days elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Day) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

// ── Phase ────────────────────────────────────────────────────────────────────

/// Global experiment phase.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Only humans exist; they learn their routes day over day.
    #[default]
    HumanLearning,
    /// Machines exist and their feedback is sent to the learning policy.
    PostMutation,
    /// Machines act but no longer learn.
    Testing,
}

impl Phase {
    /// `true` if machine feedback should reach `MachinePolicy::learn`.
    #[inline]
    pub fn learns(self) -> bool {
        matches!(self, Phase::PostMutation)
    }

    /// `true` if the mutation controller may run in this phase.
    #[inline]
    pub fn allows_mutation(self) -> bool {
        !matches!(self, Phase::Testing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::HumanLearning => "human_learning",
            Phase::PostMutation  => "post_mutation",
            Phase::Testing       => "testing",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DayClock ─────────────────────────────────────────────────────────────────

/// Current day plus the phase it belongs to.
#[derive(Clone, Debug, Default)]
pub struct DayClock {
    /// The next day to be simulated.
    pub current_day: Day,
    pub phase: Phase,
    /// First day of the current phase.
    pub phase_started: Day,
}

impl DayClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next day.  Called only after a day completed.
    #[inline]
    pub fn advance(&mut self) {
        self.current_day = self.current_day.next();
    }

    /// Switch phase starting at the current day.  A no-op if unchanged.
    pub fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.phase_started = self.current_day;
        }
    }

    /// Completed days in the current phase.
    #[inline]
    pub fn days_in_phase(&self) -> u64 {
        self.current_day.since(self.phase_started)
    }
}

impl fmt::Display for DayClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, day {} of phase)", self.current_day, self.phase, self.days_in_phase())
    }
}
