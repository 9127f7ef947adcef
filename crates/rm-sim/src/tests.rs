//! Integration tests for rm-sim.

use rm_agent::{CostTable, MutationOutcome, Trip};
use rm_behavior::AnyHumanModel;
use rm_core::{Day, ExperimentConfig, NodeId, Phase};
use rm_paths::builtin;
use rm_traffic::{BprSimulator, TrafficSimulator};

use crate::{DayObserver, DayReport, EnvBuilder, EnvError, RouteEnv, TravelTimeRecord};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(agents: usize, machines: usize) -> ExperimentConfig {
    let mut config = ExperimentConfig::default();
    config.population.num_agents = agents;
    config.mutation.new_machines = machines;
    config.run.human_learning_days = 3;
    config.run.training_days = 2;
    config.run.test_days = 1;
    config.simulator.retry_backoff_ms = 0;
    config
}

fn bpr(config: &ExperimentConfig) -> BprSimulator {
    BprSimulator::new(builtin("two_route").unwrap(), &config.simulator)
}

fn env_with<S: TrafficSimulator>(config: ExperimentConfig, sim: S) -> RouteEnv<AnyHumanModel, S> {
    let model = AnyHumanModel::from_config(&config.human);
    EnvBuilder::new(config, model, sim).build().unwrap()
}

fn started(config: ExperimentConfig) -> RouteEnv<AnyHumanModel, BprSimulator> {
    let sim = bpr(&config);
    let mut env = env_with(config, sim);
    env.start().unwrap();
    env
}

/// Trips on the two-route OD pair with the given start times.
fn trips_at(starts: &[u32]) -> Vec<Trip> {
    starts
        .iter()
        .map(|&start_time| Trip { origin: NodeId(0), destination: NodeId(3), start_time })
        .collect()
}

fn tables<H: rm_behavior::HumanModel, S: TrafficSimulator>(env: &RouteEnv<H, S>) -> Vec<CostTable> {
    env.store.cost_tables.clone()
}

/// Observer that keeps everything it is told.
#[derive(Default)]
struct Recorder {
    records:   Vec<TravelTimeRecord>,
    days:      Vec<DayReport>,
    retries:   Vec<(Day, EnvError)>,
    mutations: Vec<MutationOutcome>,
    phases:    Vec<Phase>,
    run_end:   Option<u64>,
}

impl DayObserver for Recorder {
    fn on_record(&mut self, record: &TravelTimeRecord) {
        self.records.push(record.clone());
    }
    fn on_day_end(&mut self, report: &DayReport) {
        self.days.push(report.clone());
    }
    fn on_retry(&mut self, day: Day, error: &EnvError) {
        let copy = match error {
            EnvError::RecoverableSimulation { attempt, reason } => {
                EnvError::RecoverableSimulation { attempt: *attempt, reason: reason.clone() }
            }
            other => EnvError::FatalSimulation { reason: other.to_string(), completed_days: 0 },
        };
        self.retries.push((day, copy));
    }
    fn on_mutation(&mut self, _day: Day, outcome: &MutationOutcome) {
        self.mutations.push(outcome.clone());
    }
    fn on_phase_change(&mut self, _day: Day, phase: Phase) {
        self.phases.push(phase);
    }
    fn on_run_end(&mut self, days_completed: u64) {
        self.run_end = Some(days_completed);
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use rm_core::{Day, PathIndex, Phase};
    use rm_traffic::TrafficSimulator;

    use super::{bpr, env_with, started, test_config, Recorder};
    use crate::{EnvError, EnvState, NoopObserver, ScriptedPolicy};

    #[test]
    fn step_before_start_is_rejected() {
        let config = test_config(10, 4);
        let sim = bpr(&config);
        let mut env = env_with(config, sim);
        let err = env.step(&mut ScriptedPolicy::new(PathIndex(0)), &mut NoopObserver).unwrap_err();
        assert!(matches!(err, EnvError::NotStarted));
        assert_eq!(env.state(), EnvState::Created);
    }

    #[test]
    fn step_advances_one_day() {
        let mut env = started(test_config(10, 4));
        let mut rec = Recorder::default();
        let report = env.step(&mut ScriptedPolicy::new(PathIndex(0)), &mut rec).unwrap();

        assert_eq!(report.day, Day(0));
        assert_eq!(report.phase, Phase::HumanLearning);
        assert_eq!((report.humans, report.machines), (10, 0));
        assert_eq!(report.retries, 0);
        assert!(report.mean_travel_time > 0.0);
        assert_eq!(env.day(), Day(1));
        assert_eq!(env.completed_days(), 1);
        assert_eq!(env.history().len(), 10);
        assert_eq!(rec.records.len(), 10);
        // Records come out in ascending id order.
        assert!(rec.records.windows(2).all(|w| w[0].agent < w[1].agent));
    }

    #[test]
    fn stop_is_idempotent_and_releases_simulator() {
        let mut env = started(test_config(10, 4));
        assert!(env.simulator().is_connected());
        env.stop();
        env.stop();
        assert_eq!(env.state(), EnvState::Stopped);
        assert!(!env.simulator().is_connected());
        let err = env.step(&mut ScriptedPolicy::new(PathIndex(0)), &mut NoopObserver).unwrap_err();
        assert!(matches!(err, EnvError::NotStarted));
    }

    #[test]
    fn mutation_is_refused_while_testing() {
        let mut env = started(test_config(10, 4));
        env.mutate(&mut NoopObserver).unwrap();
        env.begin_testing().unwrap();
        let err = env.mutate(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            EnvError::PhaseViolation { operation: "mutate", phase: Phase::Testing }
        ));
        assert_eq!(env.store.machine_count(), 4);
    }

    #[test]
    fn testing_requires_a_mutation_first() {
        let mut env = started(test_config(10, 4));
        let err = env.begin_testing().unwrap_err();
        assert!(matches!(err, EnvError::PhaseViolation { operation: "begin_testing", .. }));
        assert_eq!(env.phase(), Phase::HumanLearning);
    }

    #[test]
    fn run_walks_all_phases() {
        let config = test_config(10, 4);
        let sim = bpr(&config);
        let mut env = env_with(config, sim);
        let mut policy = ScriptedPolicy::new(PathIndex(0));
        let mut rec = Recorder::default();

        let days = env.run(&mut policy, &mut rec).unwrap();
        assert_eq!(days, 6);
        assert_eq!(rec.run_end, Some(6));
        assert_eq!(rec.phases, vec![Phase::PostMutation, Phase::Testing]);
        assert_eq!(rec.mutations.len(), 1);
        assert_eq!(env.state(), EnvState::Stopped);
        assert_eq!(env.history().len(), 60);

        let phases: Vec<Phase> = rec.days.iter().map(|d| d.phase).collect();
        use Phase::{HumanLearning as H, PostMutation as P, Testing as T};
        assert_eq!(phases, vec![H, H, H, P, P, T]);
    }

    #[test]
    fn run_after_manual_mutation_is_refused() {
        let mut env = started(test_config(10, 4));
        env.mutate(&mut NoopObserver).unwrap();
        let mut rec = Recorder::default();
        let err = env.run(&mut ScriptedPolicy::new(PathIndex(0)), &mut rec).unwrap_err();
        assert!(matches!(
            err,
            EnvError::PhaseViolation { operation: "run", phase: Phase::PostMutation }
        ));
        // Nothing ran and no second subset was mutated.
        assert_eq!(env.store.machine_count(), 4);
        assert_eq!(env.completed_days(), 0);
        assert!(rec.days.is_empty());
    }

    #[test]
    fn history_can_be_disabled() {
        let config = test_config(10, 4);
        let sim = bpr(&config);
        let model = rm_behavior::AnyHumanModel::from_config(&config.human);
        let mut env = crate::EnvBuilder::new(config, model, sim).keep_history(false).build().unwrap();
        env.start().unwrap();
        let mut rec = Recorder::default();
        env.step(&mut ScriptedPolicy::new(PathIndex(0)), &mut rec).unwrap();
        assert!(env.history().is_empty());
        assert_eq!(rec.records.len(), 10);
    }
}

// ── Choice phase ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod choice_phase {
    use rm_behavior::HumanModel;
    use rm_core::{PathIndex, Phase};

    use super::{bpr, env_with, test_config};
    use crate::{NoopObserver, ScriptedPolicy};

    /// With the `parallel` feature the choice phase runs on Rayon; either
    /// way it must draw exactly what a sequential pass over the same
    /// per-agent RNGs draws.
    #[test]
    fn human_choices_match_sequential_draws() {
        let mut config = test_config(200, 50);
        config.human.exploration = 0.2;
        config.human.noise = 0.3;
        let build = |config: &rm_core::ExperimentConfig| {
            let sim = bpr(config);
            let mut env = env_with(config.clone(), sim);
            env.start().unwrap();
            // Warm the tables and mutate so machines are skipped too.
            for _ in 0..2 {
                env.step(&mut ScriptedPolicy::new(PathIndex(0)), &mut NoopObserver).unwrap();
            }
            env.mutate(&mut NoopObserver).unwrap();
            env
        };
        let mut sequential = build(&config);
        let mut actual = build(&config);
        assert_eq!(actual.phase(), Phase::PostMutation);

        for _ in 0..3 {
            let expected: Vec<PathIndex> = {
                let env = &mut sequential;
                let mut out = Vec::with_capacity(env.store.count);
                for (i, rng) in env.rngs.inner.iter_mut().enumerate() {
                    out.push(if env.store.kind[i].is_machine() {
                        PathIndex::INVALID
                    } else {
                        env.model.choose(&env.store.cost_tables[i], rng).unwrap()
                    });
                }
                out
            };
            let got = actual.human_choices().unwrap();
            assert_eq!(got, expected);
            assert_eq!(got.iter().filter(|c| !c.is_valid()).count(), 50);
        }
    }
}

// ── Mutation ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod mutation {
    use rm_agent::AgentError;
    use rm_core::{AgentId, AgentKind, Day, PathIndex, Phase};

    use super::{started, test_config, Recorder};
    use crate::{EnvError, NoopObserver, ScriptedPolicy};

    #[test]
    fn forty_machines_after_one_hundred_days() {
        let mut config = test_config(100, 40);
        config.run.human_learning_days = 100;
        let mutation_day = config.mutation_day();
        let mut env = started(config);
        let mut policy = ScriptedPolicy::new(PathIndex(0));

        for _ in 0..100 {
            env.step(&mut policy, &mut NoopObserver).unwrap();
        }
        assert_eq!(env.day(), mutation_day);
        assert_eq!(env.day(), Day(100));

        let mut rec = Recorder::default();
        let outcome = env.mutate(&mut rec).unwrap();
        assert_eq!((outcome.humans, outcome.machines), (60, 40));
        assert_eq!(outcome.mutated.len(), 40);
        assert_eq!(env.phase(), Phase::PostMutation);
        assert_eq!(rec.phases, vec![Phase::PostMutation]);

        // Same 100 ids, no duplicates, split 60/40 by kind.
        let ids: Vec<AgentId> = env.store.agent_ids().collect();
        assert_eq!(ids, (0..100).map(AgentId).collect::<Vec<_>>());
        let humans: Vec<AgentId> = env.store.ids_of(AgentKind::Human).collect();
        let machines: Vec<AgentId> = env.store.ids_of(AgentKind::Machine).collect();
        assert_eq!(humans.len() + machines.len(), 100);
        assert!(machines.iter().all(|m| !humans.contains(m)));
        assert_eq!(machines, outcome.mutated);
        assert!(machines.iter().all(|m| env.store.mutated_on[m.index()] == Some(Day(100))));

        let report = env.step(&mut policy, &mut NoopObserver).unwrap();
        assert_eq!((report.humans, report.machines), (60, 40));
    }

    #[test]
    fn over_request_leaves_population_unchanged() {
        let mut env = started(test_config(10, 10));
        env.mutate(&mut NoopObserver).unwrap();
        assert_eq!(env.store.machine_count(), 10);
        let version = env.store.version();

        let err = env.mutate(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            EnvError::Population(AgentError::InsufficientPopulation { requested: 10, available: 0 })
        ));
        assert_eq!(env.store.machine_count(), 10);
        assert_eq!(env.store.human_count(), 0);
        assert_eq!(env.store.version(), version);
    }

    #[test]
    fn policy_learns_only_while_training() {
        let config = test_config(10, 4);
        let mut env = started(config);
        let mut policy = ScriptedPolicy::new(PathIndex(1));
        env.run(&mut policy, &mut NoopObserver).unwrap();

        assert_eq!(policy.learned.len(), 2);
        for batch in &policy.learned {
            assert_eq!(batch.len(), 4);
            assert!(batch.iter().all(|f| f.done && f.action == PathIndex(1)));
            assert!(batch.windows(2).all(|w| w[0].agent < w[1].agent));
        }
        // One act per machine per post-mutation day.
        assert_eq!(policy.observed.len(), 4 * 3);
    }
}

// ── Simulator retries ─────────────────────────────────────────────────────────

#[cfg(test)]
mod retry {
    use rm_core::{Day, PathIndex};
    use rm_traffic::{FaultInjector, SimulatorError};

    use super::{bpr, env_with, tables, test_config, Recorder};
    use crate::{EnvError, EnvState, NoopObserver, RetryPolicy, ScriptedPolicy};

    fn lost() -> SimulatorError {
        SimulatorError::ConnectionLost("socket reset".into())
    }

    #[test]
    fn recovers_after_two_failures() {
        let config = test_config(10, 4);
        let sim = FaultInjector::new(bpr(&config)).fail_days(lost(), 2);
        let mut env = env_with(config, sim);
        env.start().unwrap();

        let mut rec = Recorder::default();
        let report = env.step(&mut ScriptedPolicy::new(PathIndex(0)), &mut rec).unwrap();
        assert_eq!(report.retries, 2);
        assert_eq!(env.reconnects(), 2);
        assert_eq!(env.simulator().day_attempts(), 3);
        assert_eq!(env.day(), Day(1));

        let attempts: Vec<u32> = rec
            .retries
            .iter()
            .map(|(_, e)| match e {
                EnvError::RecoverableSimulation { attempt, .. } => *attempt,
                other => panic!("unexpected {other}"),
            })
            .collect();
        assert_eq!(attempts, vec![1, 2]);
    }

    #[test]
    fn exhausted_retries_abort_without_advancing() {
        let mut config = test_config(10, 4);
        config.simulator.max_retries = 2;
        let sim = FaultInjector::new(bpr(&config));
        let mut env = env_with(config, sim);
        env.start().unwrap();
        let mut policy = ScriptedPolicy::new(PathIndex(0));
        env.step(&mut policy, &mut NoopObserver).unwrap();

        for _ in 0..3 {
            env.simulator_mut().push_day_fault(lost());
        }
        let before = tables(&env);
        let mut rec = Recorder::default();
        let err = env.step(&mut policy, &mut rec).unwrap_err();

        assert!(matches!(err, EnvError::FatalSimulation { completed_days: 1, .. }));
        assert_eq!(rec.retries.len(), 2);
        assert!(rec.records.is_empty());
        assert_eq!(env.day(), Day(1));
        assert_eq!(env.history().len(), 10);
        assert_eq!(tables(&env), before);
        assert_eq!(env.state(), EnvState::Stopped);
    }

    #[test]
    fn unrecoverable_failure_is_fatal_at_once() {
        let config = test_config(10, 4);
        let sim = FaultInjector::new(bpr(&config))
            .fail_days(SimulatorError::Unrecoverable("licence expired".into()), 1);
        let mut env = env_with(config, sim);
        env.start().unwrap();

        let mut rec = Recorder::default();
        let err = env.step(&mut ScriptedPolicy::new(PathIndex(0)), &mut rec).unwrap_err();
        assert!(matches!(err, EnvError::FatalSimulation { completed_days: 0, .. }));
        assert!(rec.retries.is_empty());
        assert_eq!(env.simulator().day_attempts(), 1);
        assert_eq!(env.day(), Day(0));
    }

    #[test]
    fn connect_is_retried() {
        let config = test_config(10, 4);
        let sim = FaultInjector::new(bpr(&config)).fail_connect(lost(), 1);
        let mut env = env_with(config, sim);
        env.start().unwrap();
        assert_eq!(env.simulator().connect_attempts(), 2);
        assert_eq!(env.state(), EnvState::Idle);
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let policy = RetryPolicy { max_retries: 5, backoff_ms: 100 };
        assert_eq!(policy.delay(1).as_millis(), 100);
        assert_eq!(policy.delay(2).as_millis(), 200);
        assert_eq!(policy.delay(3).as_millis(), 400);
        assert_eq!(policy.delay(30).as_secs(), 30);
    }
}

// ── Actions and observations ──────────────────────────────────────────────────

#[cfg(test)]
mod actions {
    use approx::assert_relative_eq;

    use rm_core::{AgentId, Day, ObservationKind, PathIndex};

    use super::{bpr, env_with, tables, test_config, trips_at};
    use crate::{EnvBuilder, EnvError, EnvState, NoopObserver, ScriptedPolicy};

    #[test]
    fn out_of_range_action_aborts_the_day() {
        let config = test_config(10, 4);
        let sim = bpr(&config);
        let mut env = env_with(config, sim);
        env.start().unwrap();
        env.mutate(&mut NoopObserver).unwrap();

        let before = tables(&env);
        let err = env.step(&mut ScriptedPolicy::new(PathIndex(5)), &mut NoopObserver).unwrap_err();
        assert!(matches!(err, EnvError::InvalidAction { action: PathIndex(5), n_actions: 2, .. }));
        assert_eq!(tables(&env), before);
        assert_eq!(env.day(), Day(0));
        assert!(env.history().is_empty());
        assert_eq!(env.state(), EnvState::Idle);

        // The environment is still usable.
        env.step(&mut ScriptedPolicy::new(PathIndex(1)), &mut NoopObserver).unwrap();
        assert_eq!(env.day(), Day(1));
    }

    #[test]
    fn machines_act_in_start_time_order() {
        let config = test_config(5, 5);
        let sim = bpr(&config);
        let model = rm_behavior::AnyHumanModel::from_config(&config.human);
        let mut env = EnvBuilder::new(config, model, sim)
            .trips(trips_at(&[400, 100, 300, 0, 200]))
            .build()
            .unwrap();
        env.start().unwrap();
        env.mutate(&mut NoopObserver).unwrap();

        let mut policy = ScriptedPolicy::new(PathIndex(0));
        env.step(&mut policy, &mut NoopObserver).unwrap();
        let order: Vec<AgentId> = policy.observed.iter().map(|(a, _)| *a).collect();
        assert_eq!(order, vec![AgentId(3), AgentId(1), AgentId(4), AgentId(2), AgentId(0)]);
    }

    #[test]
    fn previous_agent_start_counts_earlier_choices() {
        let mut config = test_config(5, 5);
        config.machine.observed_span_secs = 150;
        let horizon = config.simulator.horizon_secs as f64;
        let sim = bpr(&config);
        let model = rm_behavior::AnyHumanModel::from_config(&config.human);
        let mut env = EnvBuilder::new(config, model, sim)
            .trips(trips_at(&[0, 100, 200, 250, 300]))
            .build()
            .unwrap();
        env.start().unwrap();
        env.mutate(&mut NoopObserver).unwrap();

        let mut policy = ScriptedPolicy::new(PathIndex(0))
            .script(AgentId(0), [PathIndex(1)])
            .script(AgentId(1), [PathIndex(0)])
            .script(AgentId(2), [PathIndex(1)])
            .script(AgentId(3), [PathIndex(1)]);
        env.step(&mut policy, &mut NoopObserver).unwrap();

        let obs = |id: u32| policy.observed.iter().find(|(a, _)| *a == AgentId(id)).map(|(_, o)| o.clone()).unwrap();
        assert_eq!(obs(0), vec![0.0, 0.0, 0.0]);
        // Window [50, 200) holds agent 1 on path 0.
        assert_relative_eq!(obs(2)[0], 200.0 / horizon);
        assert_eq!(&obs(2)[1..], &[1.0, 0.0]);
        // Window [150, 300) holds agents 2 and 3, both on path 1.
        assert_eq!(&obs(4)[1..], &[0.0, 2.0]);
    }

    #[test]
    fn observation_length_is_paths_plus_one() {
        let mut env = super::started(test_config(10, 4));
        assert_eq!(env.observations.kind(), ObservationKind::PreviousAgentStart);
        env.mutate(&mut NoopObserver).unwrap();

        let mut policy = ScriptedPolicy::new(PathIndex(0));
        env.step(&mut policy, &mut NoopObserver).unwrap();
        let n_paths = env.catalog.num_paths(rm_core::OdPairId(0));
        assert_eq!(policy.observed.len(), 4);
        for (_, obs) in &policy.observed {
            assert_eq!(obs.len(), env.observations.len(n_paths));
        }
    }

    #[test]
    fn cost_table_observation_scales_by_horizon() {
        let mut config = test_config(1, 1);
        config.machine.observation = ObservationKind::CostTable;
        let horizon = config.simulator.horizon_secs as f64;
        let sim = bpr(&config);
        let model = rm_behavior::AnyHumanModel::from_config(&config.human);
        let mut env = EnvBuilder::new(config, model, sim).trips(trips_at(&[720])).build().unwrap();
        env.start().unwrap();
        env.mutate(&mut NoopObserver).unwrap();

        let mut policy = ScriptedPolicy::new(PathIndex(0));
        env.step(&mut policy, &mut NoopObserver).unwrap();
        let (_, obs) = &policy.observed[0];
        assert_eq!(obs.len(), 3);
        assert_relative_eq!(obs[0], 720.0 / horizon);
        assert_relative_eq!(obs[1], 600.0 / horizon);
        assert_relative_eq!(obs[2], 720.0 / horizon);
    }
}

// ── Rewards ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rewards {
    use approx::assert_relative_eq;

    use rm_core::{AgentKind, PathIndex, Strategy};

    use super::{started, test_config, Recorder};
    use crate::{NoopObserver, ScriptedPolicy};

    #[test]
    fn selfish_reward_is_own_travel_time() {
        let mut env = started(test_config(10, 4));
        env.mutate(&mut NoopObserver).unwrap();
        let mut rec = Recorder::default();
        env.step(&mut ScriptedPolicy::new(PathIndex(0)), &mut rec).unwrap();

        for r in &rec.records {
            match r.kind {
                AgentKind::Machine => assert_relative_eq!(r.reward.unwrap(), r.travel_time),
                AgentKind::Human => assert!(r.reward.is_none()),
            }
        }
        let machine = rec.records.iter().find(|r| r.kind == AgentKind::Machine).unwrap();
        let state = &env.store.machine[machine.agent.index()];
        assert_eq!(state.days_acted, 1);
        assert_eq!(state.last_action, Some(PathIndex(0)));
    }

    #[test]
    fn malicious_reward_is_minus_human_mean() {
        let mut config = test_config(10, 4);
        config.machine.behavior = Strategy::Malicious;
        let mut env = started(config);
        env.mutate(&mut NoopObserver).unwrap();
        let mut rec = Recorder::default();
        let report = env.step(&mut ScriptedPolicy::new(PathIndex(1)), &mut rec).unwrap();

        let human_mean = report.mean_human_travel_time.unwrap();
        for r in rec.records.iter().filter(|r| r.kind == AgentKind::Machine) {
            assert_relative_eq!(r.reward.unwrap(), -human_mean);
        }
        assert_relative_eq!(report.mean_machine_reward.unwrap(), -human_mean);
    }
}

// ── Builder and determinism ───────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rm_core::{NodeId, PathIndex};

    use super::{bpr, env_with, test_config, trips_at};
    use crate::{EnvBuilder, EnvError, UniformPolicy, NoopObserver};

    #[test]
    fn from_config_builds_the_configured_world() {
        let env = EnvBuilder::from_config(test_config(25, 5)).unwrap().build().unwrap();
        assert_eq!(env.store.count, 25);
        assert_eq!(env.catalog.len(), 1);
        assert_eq!(env.simulator().network().node_count(), 4);
        assert!(env.store.start_time.iter().all(|&t| t < 3_600));
    }

    #[test]
    fn empty_population_is_rejected() {
        let config = test_config(10, 4);
        let sim = bpr(&config);
        let model = rm_behavior::AnyHumanModel::from_config(&config.human);
        let err = EnvBuilder::new(config, model, sim).trips(Vec::new()).build().err().unwrap();
        assert!(matches!(err, EnvError::Config(_)));
    }

    #[test]
    fn mutation_larger_than_loaded_population_is_rejected() {
        let mut config = test_config(100, 40);
        config.run.human_learning_days = 5;
        let sim = bpr(&config);
        let model = rm_behavior::AnyHumanModel::from_config(&config.human);
        let err = EnvBuilder::new(config, model, sim).trips(trips_at(&[0; 10])).build().err().unwrap();
        match err {
            EnvError::Config(e) => assert!(e.to_string().contains("new_machines"), "got {e}"),
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn mutation_equal_to_loaded_population_is_accepted() {
        let config = test_config(100, 10);
        let sim = bpr(&config);
        let model = rm_behavior::AnyHumanModel::from_config(&config.human);
        let env = EnvBuilder::new(config, model, sim).trips(trips_at(&[0; 10])).build().unwrap();
        assert_eq!(env.store.count, 10);
    }

    #[test]
    fn unreachable_destination_is_a_path_error() {
        let config = test_config(10, 1);
        let sim = bpr(&config);
        let model = rm_behavior::AnyHumanModel::from_config(&config.human);
        let trip = rm_agent::Trip { origin: NodeId(3), destination: NodeId(0), start_time: 0 };
        let err = EnvBuilder::new(config, model, sim).trips(vec![trip]).build().err().unwrap();
        assert!(matches!(err, EnvError::Paths(_)));
    }

    #[test]
    fn invalid_config_fails_before_any_day() {
        let mut config = test_config(10, 4);
        config.human.learning_rate = 0.0;
        let sim = bpr(&config);
        let model = rm_behavior::AnyHumanModel::from_config(&config.human);
        assert!(matches!(EnvBuilder::new(config, model, sim).build(), Err(EnvError::Config(_))));
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let config = test_config(30, 10);
            let sim = bpr(&config);
            let mut env = env_with(config, sim);
            env.run(&mut UniformPolicy::new(7), &mut NoopObserver).unwrap();
            env.take_history()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.len(), 30 * 6);
        assert_eq!(a, b);
    }

    #[test]
    fn uniform_policy_stays_in_range() {
        use crate::MachinePolicy;
        let mut policy = UniformPolicy::new(3);
        for _ in 0..100 {
            assert!(policy.act(rm_core::AgentId(0), &[], 3).index() < 3);
        }
        assert_eq!(policy.act(rm_core::AgentId(0), &[], 1), PathIndex(0));
    }
}
