//! The `RouteEnv` struct and its day loop.

use tracing::{debug, info};

use rm_agent::{mutate, AgentRngs, AgentStore, MutationOutcome, MutationRequest};
use rm_behavior::{reward, BehaviorError, BehaviorResult, GroupStats, HumanModel};
use rm_core::{AgentId, AgentKind, AgentRng, Day, DayClock, ExperimentConfig, PathIndex, Phase, SimRng};
use rm_paths::PathCatalog;
use rm_traffic::{SimulatorSession, TrafficSimulator, TripRequest, TripResult};

use crate::{
    DayObserver, DayReport, EnvError, EnvResult, MachineFeedback, MachinePolicy,
    ObservationBuilder, RetryPolicy, TravelTimeRecord,
};

/// Lifecycle of a [`RouteEnv`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnvState {
    /// Built, simulator not yet connected.
    Created,
    /// Between days.
    Idle,
    /// Inside [`RouteEnv::step`].
    Running,
    /// Session released.  Terminal.
    Stopped,
}

/// A machine's decision, kept until its reward is known.
struct MachineDecision {
    agent: AgentId,
    observation: Vec<f64>,
    action: PathIndex,
}

// ── RouteEnv ──────────────────────────────────────────────────────────────────

/// The day driver.
///
/// `RouteEnv<H, S>` owns the population, the path catalog and the simulator
/// session, and runs one day per [`step`](Self::step):
///
/// 1. **Human choice** (optionally parallel with the `parallel` feature):
///    every human samples a path from its cost table with its own RNG.
/// 2. **Machine choice** (sequential, ascending start time): each machine
///    is observed and the policy picks a path.
/// 3. **Dispatch**: all trips go to the simulator in one call; recoverable
///    failures reconnect and retry with exponential backoff.
/// 4. **Learn**: every cost table absorbs its own travel time; machines get
///    shaped rewards, and in the training phase the policy sees them.
/// 5. **Record**: one [`TravelTimeRecord`] per agent, ascending id.
///
/// Any error before step 4 leaves cost tables and the day counter as they
/// were.
///
/// Create via [`EnvBuilder`][crate::EnvBuilder].
pub struct RouteEnv<H: HumanModel, S: TrafficSimulator> {
    pub config: ExperimentConfig,

    /// Current day and phase.
    pub clock: DayClock,

    /// The population.  Mutation rewrites it in place between days.
    pub store: AgentStore,

    /// Per-agent RNGs, separate from `store` for the split borrow in the
    /// choice phase.
    pub rngs: AgentRngs,

    pub catalog: PathCatalog,

    pub model: H,

    pub(crate) session: SimulatorSession<S>,
    pub(crate) observations: ObservationBuilder,
    pub(crate) retry: RetryPolicy,
    pub(crate) mutation_rng: SimRng,

    /// Machines by start time; rebuilt when the store version changes.
    pub(crate) machine_order: Vec<AgentId>,
    pub(crate) order_version: Option<u64>,

    pub(crate) history: Vec<TravelTimeRecord>,
    pub(crate) keep_history: bool,
    pub(crate) state: EnvState,
    pub(crate) completed_days: u64,
}

impl<H: HumanModel, S: TrafficSimulator> RouteEnv<H, S> {
    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Connect to the simulator.  Recoverable connect failures are retried
    /// like failed days.
    pub fn start(&mut self) -> EnvResult<()> {
        match self.state {
            EnvState::Created => {}
            EnvState::Idle | EnvState::Running => return Ok(()),
            EnvState::Stopped => {
                return Err(EnvError::PhaseViolation { operation: "start", phase: self.clock.phase });
            }
        }

        let session = &mut self.session;
        self.retry.run(
            "connect",
            self.completed_days,
            |attempt| if attempt == 0 { session.open() } else { session.reconnect() },
            |_| {},
        )?;

        self.state = EnvState::Idle;
        info!(
            agents = self.store.count,
            simulator = self.session.simulator().name(),
            model = self.model.name(),
            "environment started"
        );
        Ok(())
    }

    /// Simulate one day.
    ///
    /// On [`EnvError::FatalSimulation`] the session is released and the
    /// environment is stopped.  Any other error leaves it idle on the same
    /// day.
    pub fn step<P, O>(&mut self, policy: &mut P, observer: &mut O) -> EnvResult<DayReport>
    where
        P: MachinePolicy + ?Sized,
        O: DayObserver,
    {
        self.ensure_idle()?;
        self.state = EnvState::Running;
        let result = self.simulate_day(policy, observer);
        self.state = match &result {
            Err(EnvError::FatalSimulation { .. }) => {
                self.session.close();
                EnvState::Stopped
            }
            _ => EnvState::Idle,
        };
        result
    }

    /// Turn `mutation.new_machines` humans into machines with the configured
    /// behavior and enter the training phase.
    pub fn mutate<O: DayObserver>(&mut self, observer: &mut O) -> EnvResult<MutationOutcome> {
        self.ensure_idle()?;
        let phase = self.clock.phase;
        if !phase.allows_mutation() {
            return Err(EnvError::PhaseViolation { operation: "mutate", phase });
        }

        let day = self.clock.current_day;
        let request = MutationRequest {
            count:          self.config.mutation.new_machines,
            seed:           self.mutation_rng.gen_range(0..u64::MAX),
            behavior:       self.config.machine.behavior.phi(),
            retain_history: self.config.mutation.retain_cost_history,
            day,
        };
        let outcome = mutate(&mut self.store, &request)?;
        observer.on_mutation(day, &outcome);
        self.enter_phase(Phase::PostMutation, observer);
        Ok(outcome)
    }

    /// Freeze machine learning: from now on `MachinePolicy::learn` is no
    /// longer called.  Only valid after a mutation.
    pub fn begin_testing(&mut self) -> EnvResult<()> {
        self.ensure_idle()?;
        let phase = self.clock.phase;
        if phase != Phase::PostMutation {
            return Err(EnvError::PhaseViolation { operation: "begin_testing", phase });
        }
        self.clock.enter(Phase::Testing);
        info!(day = %self.clock.current_day, phase = %Phase::Testing, "phase changed");
        Ok(())
    }

    /// Release the simulator.  Idempotent.
    pub fn stop(&mut self) {
        if self.state == EnvState::Stopped {
            return;
        }
        self.session.close();
        self.state = EnvState::Stopped;
        info!(days = self.completed_days, "environment stopped");
    }

    /// Drive a whole experiment: human learning, mutation, training,
    /// testing, then stop.  Starts the environment if needed.
    ///
    /// Fails with [`EnvError::PhaseViolation`] once the population has been
    /// mutated, since the phase boundaries would no longer line up.
    ///
    /// Returns the number of completed days.
    pub fn run<P, O>(&mut self, policy: &mut P, observer: &mut O) -> EnvResult<u64>
    where
        P: MachinePolicy + ?Sized,
        O: DayObserver,
    {
        if self.clock.phase != Phase::HumanLearning {
            return Err(EnvError::PhaseViolation { operation: "run", phase: self.clock.phase });
        }
        self.start()?;
        let run = self.config.run.clone();
        info!(
            human_learning_days = run.human_learning_days,
            training_days = run.training_days,
            test_days = run.test_days,
            policy = policy.name(),
            "run started"
        );

        for _ in 0..run.human_learning_days {
            self.step(policy, observer)?;
        }
        self.mutate(observer)?;
        for _ in 0..run.training_days {
            self.step(policy, observer)?;
        }
        self.begin_testing()?;
        observer.on_phase_change(self.clock.current_day, Phase::Testing);
        for _ in 0..run.test_days {
            self.step(policy, observer)?;
        }

        self.stop();
        observer.on_run_end(self.completed_days);
        Ok(self.completed_days)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The next day to simulate.
    #[inline]
    pub fn day(&self) -> Day {
        self.clock.current_day
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.clock.phase
    }

    #[inline]
    pub fn state(&self) -> EnvState {
        self.state
    }

    pub fn completed_days(&self) -> u64 {
        self.completed_days
    }

    pub fn history(&self) -> &[TravelTimeRecord] {
        &self.history
    }

    pub fn take_history(&mut self) -> Vec<TravelTimeRecord> {
        std::mem::take(&mut self.history)
    }

    pub fn simulator(&self) -> &S {
        self.session.simulator()
    }

    pub fn simulator_mut(&mut self) -> &mut S {
        self.session.simulator_mut()
    }

    /// Successful simulator reconnects so far.
    pub fn reconnects(&self) -> u32 {
        self.session.reconnects()
    }

    // ── Day processing ────────────────────────────────────────────────────

    fn ensure_idle(&self) -> EnvResult<()> {
        match self.state {
            EnvState::Idle => Ok(()),
            EnvState::Created | EnvState::Stopped => Err(EnvError::NotStarted),
            EnvState::Running => Err(EnvError::PhaseViolation {
                operation: "re-entrant call",
                phase: self.clock.phase,
            }),
        }
    }

    fn enter_phase<O: DayObserver>(&mut self, phase: Phase, observer: &mut O) {
        if self.clock.phase == phase {
            return;
        }
        self.clock.enter(phase);
        info!(day = %self.clock.current_day, %phase, "phase changed");
        observer.on_phase_change(self.clock.current_day, phase);
    }

    fn simulate_day<P, O>(&mut self, policy: &mut P, observer: &mut O) -> EnvResult<DayReport>
    where
        P: MachinePolicy + ?Sized,
        O: DayObserver,
    {
        let day = self.clock.current_day;
        let phase = self.clock.phase;
        observer.on_day_start(day, phase);

        // ── Phase 1: human choice ─────────────────────────────────────────
        let mut actions = self.human_choices()?;

        // ── Phase 2: machine choice ───────────────────────────────────────
        let decisions = self.machine_choices(policy, &mut actions)?;

        // ── Phase 3: dispatch ─────────────────────────────────────────────
        let (travel_times, retries) = self.dispatch(day, &actions, observer)?;

        // ── Phase 4: learn ────────────────────────────────────────────────
        //
        // Travel times were validated in `dispatch`, so the updates below
        // cannot fail halfway through the population.
        for i in 0..self.store.count {
            self.model.update(&mut self.store.cost_tables[i], actions[i], travel_times[i])?;
        }

        let stats = GroupStats::compute(&self.store.kind, &travel_times);
        let mut rewards: Vec<Option<f64>> = vec![None; self.store.count];
        let mut feedback: Vec<MachineFeedback> = Vec::with_capacity(decisions.len());
        for decision in decisions {
            let i = decision.agent.index();
            let Some(s) = stats.for_agent(AgentKind::Machine, travel_times[i]) else {
                continue;
            };
            let r = reward(&self.store.behavior[i], &s);
            self.store.machine[i].record(decision.action, r);
            rewards[i] = Some(r);
            feedback.push(MachineFeedback {
                agent:       decision.agent,
                observation: decision.observation,
                action:      decision.action,
                reward:      r,
                done:        true,
            });
        }
        feedback.sort_by_key(|f| f.agent);
        if phase.learns() && !feedback.is_empty() {
            policy.learn(&feedback);
        }

        // ── Phase 5: record ───────────────────────────────────────────────
        for agent in self.store.agent_ids() {
            let i = agent.index();
            let record = TravelTimeRecord {
                day,
                phase,
                agent,
                kind:        self.store.kind[i],
                action:      actions[i],
                origin:      self.store.origin[i],
                destination: self.store.destination[i],
                start_time:  self.store.start_time[i],
                travel_time: travel_times[i],
                reward:      rewards[i],
                cost_table:  self.store.cost_tables[i].estimates().to_vec(),
            };
            observer.on_record(&record);
            if self.keep_history {
                self.history.push(record);
            }
        }

        let machine_rewards: Vec<f64> = rewards.iter().flatten().copied().collect();
        let report = DayReport {
            day,
            phase,
            humans: stats.humans,
            machines: stats.machines,
            mean_travel_time: stats.all_mean.unwrap_or(0.0),
            mean_human_travel_time: stats.human_mean,
            mean_machine_travel_time: stats.machine_mean,
            mean_machine_reward: (!machine_rewards.is_empty())
                .then(|| machine_rewards.iter().sum::<f64>() / machine_rewards.len() as f64),
            retries,
        };
        debug!(
            %day,
            %phase,
            mean_travel_time = report.mean_travel_time,
            humans = report.humans,
            machines = report.machines,
            retries,
            "day completed"
        );
        observer.on_day_end(&report);

        self.clock.advance();
        self.completed_days += 1;
        Ok(report)
    }

    /// Path per agent for humans, `PathIndex::INVALID` for machines.
    pub(crate) fn human_choices(&mut self) -> EnvResult<Vec<PathIndex>> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let store = &self.store;
        let model = &self.model;
        let rngs = &mut self.rngs.inner;

        let choose = |i: usize, rng: &mut AgentRng| -> BehaviorResult<PathIndex> {
            match store.kind[i] {
                AgentKind::Human => model.choose(&store.cost_tables[i], rng),
                AgentKind::Machine => Ok(PathIndex::INVALID),
            }
        };

        #[cfg(not(feature = "parallel"))]
        let choices: BehaviorResult<Vec<PathIndex>> =
            rngs.iter_mut().enumerate().map(|(i, rng)| choose(i, rng)).collect();

        #[cfg(feature = "parallel")]
        let choices: BehaviorResult<Vec<PathIndex>> = {
            use rayon::prelude::*;
            rngs.par_iter_mut().enumerate().map(|(i, rng)| choose(i, rng)).collect()
        };

        Ok(choices?)
    }

    /// Fill in machine actions in start-time order.
    fn machine_choices<P: MachinePolicy + ?Sized>(
        &mut self,
        policy: &mut P,
        actions: &mut [PathIndex],
    ) -> EnvResult<Vec<MachineDecision>> {
        if self.order_version != Some(self.store.version()) {
            self.machine_order = self.store.by_start_time(AgentKind::Machine);
            self.order_version = Some(self.store.version());
        }

        let mut decisions = Vec::with_capacity(self.machine_order.len());
        for &agent in &self.machine_order {
            let n_actions = self.catalog.num_paths(self.store.od[agent.index()]);
            let observation = self.observations.observe(&self.store, agent, n_actions, actions);
            let action = policy.act(agent, &observation, n_actions);
            if !action.is_valid() || action.index() >= n_actions {
                return Err(EnvError::InvalidAction { agent, action, n_actions });
            }
            actions[agent.index()] = action;
            decisions.push(MachineDecision { agent, observation, action });
        }
        Ok(decisions)
    }

    /// Send every trip to the simulator and return travel times indexed by
    /// agent plus the number of retries used.
    fn dispatch<O: DayObserver>(
        &mut self,
        day: Day,
        actions: &[PathIndex],
        observer: &mut O,
    ) -> EnvResult<(Vec<f64>, u32)> {
        let mut trips: Vec<TripRequest<'_>> = Vec::with_capacity(self.store.count);
        for agent in self.store.agent_ids() {
            let i = agent.index();
            let action = actions[i];
            let n_actions = self.catalog.num_paths(self.store.od[i]);
            let path = self
                .catalog
                .path(self.store.od[i], action)
                .ok_or(EnvError::InvalidAction { agent, action, n_actions })?;
            trips.push(TripRequest { agent, start_time: self.store.start_time[i], edges: &path.edges });
        }

        let session = &mut self.session;
        let (results, retries) = self.retry.run(
            "simulate_day",
            self.completed_days,
            |attempt| {
                if attempt > 0 {
                    session.reconnect()?;
                }
                session.dispatch(day, &trips)
            },
            |err| observer.on_retry(day, err),
        )?;

        let travel_times = self.collect_travel_times(&trips, results)?;
        Ok((travel_times, retries))
    }

    fn collect_travel_times(&self, trips: &[TripRequest<'_>], results: Vec<TripResult>) -> EnvResult<Vec<f64>> {
        let mut travel_times = Vec::with_capacity(results.len());
        for (trip, result) in trips.iter().zip(results) {
            if trip.agent != result.agent {
                return Err(EnvError::FatalSimulation {
                    reason: format!("result for {} arrived in the slot of {}", result.agent, trip.agent),
                    completed_days: self.completed_days,
                });
            }
            let t = result.travel_time;
            if !t.is_finite() || t < 0.0 {
                return Err(BehaviorError::InvalidTravelTime(t).into());
            }
            travel_times.push(t);
        }
        Ok(travel_times)
    }
}
