//! Human → machine conversion.
//!
//! A mutation picks `count` current humans uniformly without replacement and
//! turns them into machines in place.  Ids, trips and (optionally) cost
//! tables survive; the reward weights and learning state are new.  Because
//! candidates are drawn from the humans left at call time, repeated
//! mutations always touch disjoint agents and no machine ever turns back.

use tracing::info;

use rm_core::{AgentId, AgentKind, BehaviorVector, Day, SimRng};

use crate::{AgentError, AgentResult, AgentStore, MachineState};

#[derive(Clone, Debug)]
pub struct MutationRequest {
    pub count: usize,
    /// Seeds the selection.  The same seed on the same population selects
    /// the same agents.
    pub seed: u64,
    pub behavior: BehaviorVector,
    /// Keep each mutated agent's learned cost table instead of resetting it.
    pub retain_history: bool,
    pub day: Day,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MutationOutcome {
    /// Mutated ids, ascending.
    pub mutated: Vec<AgentId>,
    pub humans: usize,
    pub machines: usize,
    /// Population version after the change.
    pub version: u64,
}

/// Apply `request` to `store`.
///
/// Fails with [`AgentError::InsufficientPopulation`] and leaves the store
/// untouched when fewer than `request.count` humans remain.
pub fn mutate(store: &mut AgentStore, request: &MutationRequest) -> AgentResult<MutationOutcome> {
    let humans: Vec<AgentId> = store.ids_of(AgentKind::Human).collect();
    if request.count > humans.len() {
        return Err(AgentError::InsufficientPopulation {
            requested: request.count,
            available: humans.len(),
        });
    }

    let mut rng = SimRng::new(request.seed);
    let mut mutated: Vec<AgentId> = rng
        .sample_indices(humans.len(), request.count)
        .into_iter()
        .map(|i| humans[i])
        .collect();
    mutated.sort_unstable();

    for &agent in &mutated {
        let i = agent.index();
        store.kind[i] = AgentKind::Machine;
        store.behavior[i] = request.behavior;
        store.mutated_on[i] = Some(request.day);
        store.machine[i] = MachineState::default();
        if !request.retain_history {
            store.cost_tables[i].reset();
        }
    }
    if !mutated.is_empty() {
        store.bump_version();
    }

    let outcome = MutationOutcome {
        humans:   store.human_count(),
        machines: store.machine_count(),
        version:  store.version(),
        mutated,
    };
    info!(
        day = %request.day,
        mutated = outcome.mutated.len(),
        humans = outcome.humans,
        machines = outcome.machines,
        "population mutated"
    );
    Ok(outcome)
}
