//! Reward shaping for machines.
//!
//! A machine's reward is the linear functional
//!
//! ```text
//! r = φ_own·T_own + φ_group·T_group + φ_other·T_other + φ_all·T_all
//! ```
//!
//! over travel-time statistics.  Groups come from agent kind: a machine's
//! group is all machines, "other" is all humans.  The sign is not flipped,
//! so a selfish machine's reward equals its own travel time; learners that
//! maximise must negate it.
//!
//! When no humans travelled, `T_other` falls back to the system-wide mean.

use rm_core::{AgentKind, BehaviorVector};

/// The four statistics a behavior vector weighs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TravelTimeStats {
    pub own: f64,
    pub group: f64,
    pub other: f64,
    pub all: f64,
}

impl TravelTimeStats {
    #[inline]
    pub fn as_array(&self) -> [f64; 4] {
        [self.own, self.group, self.other, self.all]
    }
}

/// `φ · stats`.
#[inline]
pub fn reward(phi: &BehaviorVector, stats: &TravelTimeStats) -> f64 {
    phi.apply(stats.as_array())
}

/// Per-kind and system-wide mean travel times for one day.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupStats {
    pub human_mean: Option<f64>,
    pub machine_mean: Option<f64>,
    pub all_mean: Option<f64>,
    pub humans: usize,
    pub machines: usize,
}

impl GroupStats {
    /// `kinds[i]` and `travel_times[i]` describe the same agent.
    pub fn compute(kinds: &[AgentKind], travel_times: &[f64]) -> Self {
        let (mut h_sum, mut m_sum) = (0.0, 0.0);
        let (mut humans, mut machines) = (0usize, 0usize);
        for (kind, &t) in kinds.iter().zip(travel_times) {
            match kind {
                AgentKind::Human => {
                    h_sum += t;
                    humans += 1;
                }
                AgentKind::Machine => {
                    m_sum += t;
                    machines += 1;
                }
            }
        }
        let mean = |sum: f64, n: usize| (n > 0).then(|| sum / n as f64);
        GroupStats {
            human_mean:   mean(h_sum, humans),
            machine_mean: mean(m_sum, machines),
            all_mean:     mean(h_sum + m_sum, humans + machines),
            humans,
            machines,
        }
    }

    pub fn mean_of(&self, kind: AgentKind) -> Option<f64> {
        match kind {
            AgentKind::Human => self.human_mean,
            AgentKind::Machine => self.machine_mean,
        }
    }

    /// Statistics seen by an agent of `kind` whose own travel time is `own`.
    ///
    /// `None` only when nobody travelled.
    pub fn for_agent(&self, kind: AgentKind, own: f64) -> Option<TravelTimeStats> {
        let all = self.all_mean?;
        let other_kind = match kind {
            AgentKind::Human => AgentKind::Machine,
            AgentKind::Machine => AgentKind::Human,
        };
        Some(TravelTimeStats {
            own,
            group: self.mean_of(kind).unwrap_or(own),
            other: self.mean_of(other_kind).unwrap_or(all),
            all,
        })
    }
}
