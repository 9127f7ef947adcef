//! Core population storage: `AgentStore` (SoA data) and `AgentRngs`.
//!
//! # Why two structs?
//!
//! The human choice phase needs `&mut AgentRngs` (one RNG per agent) and
//! `&AgentStore` (shared read access to cost tables) at the same time.
//! Keeping the RNGs in their own struct lets both borrows coexist:
//!
//! ```ignore
//! let store: &AgentStore = &env.store;
//! let choices = env.rngs.inner
//!     .par_iter_mut()
//!     .enumerate()
//!     .map(|(i, rng)| model.choose(&store.cost_tables[i], rng))
//!     .collect::<Vec<_>>();
//! ```

use rm_core::{AgentId, AgentKind, AgentRng, BehaviorVector, Day, NodeId, OdPairId, PathIndex};

use crate::CostTable;

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, kept apart from [`AgentStore`].
pub struct AgentRngs {
    pub inner: Vec<AgentRng>,
}

impl AgentRngs {
    pub(crate) fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| AgentRng::new(global_seed, AgentId(i)))
            .collect();
        Self { inner }
    }

    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> &mut AgentRng {
        &mut self.inner[agent.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── MachineState ──────────────────────────────────────────────────────────────

/// Learning bookkeeping for a machine.  Zeroed on mutation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MachineState {
    pub last_action: Option<PathIndex>,
    pub last_reward: Option<f64>,
    pub cumulative_reward: f64,
    pub days_acted: u32,
}

impl MachineState {
    pub fn record(&mut self, action: PathIndex, reward: f64) {
        self.last_action = Some(action);
        self.last_reward = Some(reward);
        self.cumulative_reward += reward;
        self.days_acted += 1;
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for the whole population.
///
/// Every `Vec` field has exactly `count` elements and `AgentId` is the index
/// into all of them.  Ids never change, mutation included; only `kind`,
/// `behavior`, `mutated_on`, `machine` and possibly `cost_tables` are
/// rewritten when a human becomes a machine.
pub struct AgentStore {
    pub count: usize,

    pub kind: Vec<AgentKind>,
    pub origin: Vec<NodeId>,
    pub destination: Vec<NodeId>,
    /// Seconds from the start of the daily horizon.
    pub start_time: Vec<u32>,
    /// Path-catalog pair for `(origin, destination)`.
    pub od: Vec<OdPairId>,

    /// Reward weights.  `BehaviorVector::ZERO` for humans.
    pub behavior: Vec<BehaviorVector>,
    pub mutated_on: Vec<Option<Day>>,

    pub cost_tables: Vec<CostTable>,
    pub machine: Vec<MachineState>,

    version: u64,
}

impl AgentStore {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            count,
            kind:        vec![AgentKind::Human; count],
            origin:      vec![NodeId::INVALID; count],
            destination: vec![NodeId::INVALID; count],
            start_time:  vec![0; count],
            od:          vec![OdPairId::INVALID; count],
            behavior:    vec![BehaviorVector::ZERO; count],
            mutated_on:  vec![None; count],
            cost_tables: Vec::with_capacity(count),
            machine:     vec![MachineState::default(); count],
            version:     0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    #[inline]
    pub fn kind(&self, agent: AgentId) -> AgentKind {
        self.kind[agent.index()]
    }

    /// Ids of agents of `kind`, ascending.
    pub fn ids_of(&self, kind: AgentKind) -> impl Iterator<Item = AgentId> + '_ {
        self.agent_ids().filter(move |&a| self.kind[a.index()] == kind)
    }

    pub fn count_of(&self, kind: AgentKind) -> usize {
        self.kind.iter().filter(|&&k| k == kind).count()
    }

    pub fn human_count(&self) -> usize {
        self.count_of(AgentKind::Human)
    }

    pub fn machine_count(&self) -> usize {
        self.count_of(AgentKind::Machine)
    }

    /// Agents of `kind` ordered by start time, ties by id.
    pub fn by_start_time(&self, kind: AgentKind) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.ids_of(kind).collect();
        ids.sort_by_key(|a| (self.start_time[a.index()], *a));
        ids
    }

    /// Incremented on every change of population composition.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}
