//! The `MachinePolicy` trait and two built-in policies.
//!
//! A policy is whatever decides machine routes: a learner living in another
//! process, a trained network, or the uniform baseline used before any
//! training happened.  The environment only needs one action per machine
//! per day and hands back the shaped reward afterwards.

use std::collections::{BTreeMap, VecDeque};

use rm_core::{AgentId, PathIndex, SimRng};

/// What a machine learns from one day.  Every day is a one-step episode,
/// so `done` is always `true`.
#[derive(Clone, Debug, PartialEq)]
pub struct MachineFeedback {
    pub agent: AgentId,
    pub observation: Vec<f64>,
    pub action: PathIndex,
    pub reward: f64,
    pub done: bool,
}

/// Route choice for machines.
///
/// `act` is called once per machine per day, in ascending start-time order.
/// It must return an index below `n_actions`; anything else aborts the day
/// with [`EnvError::InvalidAction`][crate::EnvError::InvalidAction].
pub trait MachinePolicy {
    fn name(&self) -> &str;

    fn act(&mut self, agent: AgentId, observation: &[f64], n_actions: usize) -> PathIndex;

    /// Called after each successful training day with one entry per machine,
    /// ascending id.  Not called outside the training phase.
    fn learn(&mut self, _feedback: &[MachineFeedback]) {}
}

// ── UniformPolicy ─────────────────────────────────────────────────────────────

/// Picks uniformly among the available paths.
pub struct UniformPolicy {
    rng: SimRng,
}

impl UniformPolicy {
    pub fn new(seed: u64) -> Self {
        Self { rng: SimRng::new(seed) }
    }
}

impl MachinePolicy for UniformPolicy {
    fn name(&self) -> &str {
        "uniform"
    }

    fn act(&mut self, _agent: AgentId, _observation: &[f64], n_actions: usize) -> PathIndex {
        if n_actions <= 1 {
            return PathIndex(0);
        }
        PathIndex(self.rng.gen_range(0..n_actions) as u16)
    }
}

// ── ScriptedPolicy ────────────────────────────────────────────────────────────

/// Replays queued actions per agent, falling back to a default.
///
/// Also keeps everything it was shown, which makes it the policy of choice
/// for replaying decisions taken elsewhere and for inspecting what the
/// environment sends out.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPolicy {
    default: PathIndex,
    queued: BTreeMap<AgentId, VecDeque<PathIndex>>,
    /// `(agent, observation)` per `act` call, in call order.
    pub observed: Vec<(AgentId, Vec<f64>)>,
    /// Every feedback batch passed to `learn`.
    pub learned: Vec<Vec<MachineFeedback>>,
}

impl ScriptedPolicy {
    pub fn new(default: PathIndex) -> Self {
        Self { default, ..Self::default() }
    }

    /// Queue `actions` for `agent`, consumed one per day.
    pub fn script(mut self, agent: AgentId, actions: impl IntoIterator<Item = PathIndex>) -> Self {
        self.queued.entry(agent).or_default().extend(actions);
        self
    }

    pub fn push(&mut self, agent: AgentId, action: PathIndex) {
        self.queued.entry(agent).or_default().push_back(action);
    }
}

impl MachinePolicy for ScriptedPolicy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn act(&mut self, agent: AgentId, observation: &[f64], _n_actions: usize) -> PathIndex {
        self.observed.push((agent, observation.to_vec()));
        self.queued
            .get_mut(&agent)
            .and_then(VecDeque::pop_front)
            .unwrap_or(self.default)
    }

    fn learn(&mut self, feedback: &[MachineFeedback]) {
        self.learned.push(feedback.to_vec());
    }
}
