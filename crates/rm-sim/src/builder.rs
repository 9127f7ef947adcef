//! Fluent builder for constructing a [`RouteEnv`].

use tracing::info;

use rm_agent::{load_demand_csv, synthetic_demand, unique_od_pairs, AgentStoreBuilder, Trip};
use rm_behavior::{AnyHumanModel, HumanModel};
use rm_core::{DayClock, ExperimentConfig, SimRng};
use rm_paths::{network_from_config, PathCatalog, RoadNetwork};
use rm_traffic::{BprSimulator, SimulatorSession, TrafficSimulator};

use crate::env::EnvState;
use crate::{EnvError, EnvResult, ObservationBuilder, RetryPolicy, RouteEnv};

/// Fluent builder for [`RouteEnv<H, S>`].
///
/// # Required inputs
///
/// - [`ExperimentConfig`] — validated again in [`build`](Self::build)
/// - `H: HumanModel` — the human learning rule
/// - `S: TrafficSimulator` — the simulator the day loop talks to
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                                          |
/// |---------------------------|--------------------------------------------------|
/// | `.trips(v)`               | `population.demand_file`, else synthetic demand  |
/// | `.network(n)`             | `network_from_config(&config.network)`           |
/// | `.catalog(c)`             | generated from the network and the trips' OD pairs |
/// | `.keep_history(b)`        | `true`                                           |
/// | `.blank_cost_tables(b)`   | `false` (tables start at free-flow costs)        |
///
/// # Seeds
///
/// One `SimRng` seeded with `run.seed` derives three children: synthetic
/// demand (offset 1), path sampling (offset 2) and mutation selection
/// (offset 3).  Agent RNGs are seeded from `run.seed` directly.
pub struct EnvBuilder<H: HumanModel, S: TrafficSimulator> {
    config:       ExperimentConfig,
    model:        H,
    sim:          S,
    trips:        Option<Vec<Trip>>,
    network:      Option<RoadNetwork>,
    catalog:      Option<PathCatalog>,
    keep_history: bool,
    blank:        bool,
}

impl EnvBuilder<AnyHumanModel, BprSimulator> {
    /// Everything from configuration: the configured human model and a
    /// [`BprSimulator`] on the configured network.
    pub fn from_config(config: ExperimentConfig) -> EnvResult<Self> {
        let network = network_from_config(&config.network)?;
        let model = AnyHumanModel::from_config(&config.human);
        let sim = BprSimulator::new(network.clone(), &config.simulator);
        Ok(Self::new(config, model, sim).network(network))
    }
}

impl<H: HumanModel, S: TrafficSimulator> EnvBuilder<H, S> {
    pub fn new(config: ExperimentConfig, model: H, sim: S) -> Self {
        Self {
            config,
            model,
            sim,
            trips:        None,
            network:      None,
            catalog:      None,
            keep_history: true,
            blank:        false,
        }
    }

    /// One agent per trip, `AgentId(i)` for `trips[i]`.
    pub fn trips(mut self, trips: Vec<Trip>) -> Self {
        self.trips = Some(trips);
        self
    }

    /// Network used for path generation.
    pub fn network(mut self, network: RoadNetwork) -> Self {
        self.network = Some(network);
        self
    }

    /// Use a prepared path catalog instead of generating one.  Must contain
    /// every OD pair of the trips.
    pub fn catalog(mut self, catalog: PathCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Keep every [`TravelTimeRecord`][crate::TravelTimeRecord] in memory.
    /// Observers see the records either way.
    pub fn keep_history(mut self, keep: bool) -> Self {
        self.keep_history = keep;
        self
    }

    pub fn blank_cost_tables(mut self, blank: bool) -> Self {
        self.blank = blank;
        self
    }

    /// Validate the configuration, build population and path catalog, and
    /// return an environment ready for [`RouteEnv::start`].
    pub fn build(self) -> EnvResult<RouteEnv<H, S>> {
        let config = self.config;
        config.validate()?;

        let seed = config.run.seed;
        let mut root = SimRng::new(seed);
        let mut demand_rng = root.child(1);
        let mut path_rng = root.child(2);
        let mutation_rng = root.child(3);

        // ── Demand ────────────────────────────────────────────────────────
        let trips = match self.trips {
            Some(t) => t,
            None => match &config.population.demand_file {
                Some(path) => load_demand_csv(path)?,
                None => synthetic_demand(&config.population, &mut demand_rng),
            },
        };
        if trips.is_empty() {
            return Err(EnvError::config("population is empty"));
        }
        if config.mutation.new_machines > trips.len() {
            return Err(EnvError::config(format!(
                "mutation.new_machines ({}) exceeds the loaded population ({})",
                config.mutation.new_machines,
                trips.len()
            )));
        }

        // ── Paths ─────────────────────────────────────────────────────────
        let catalog = match self.catalog {
            Some(c) => c,
            None => {
                let network = match self.network {
                    Some(n) => n,
                    None => network_from_config(&config.network)?,
                };
                PathCatalog::generate(&network, &unique_od_pairs(&trips), &config.paths, &mut path_rng)?
            }
        };

        // ── Population ────────────────────────────────────────────────────
        let (store, rngs) = AgentStoreBuilder::new(trips, seed)
            .memory(config.human.memory)
            .blank_cost_tables(self.blank)
            .build(&catalog)?;

        let observations =
            ObservationBuilder::new(&config.machine, config.simulator.horizon_secs, &store, &catalog);

        info!(
            agents = store.count,
            od_pairs = catalog.len(),
            model = self.model.name(),
            simulator = self.sim.name(),
            "environment built"
        );

        Ok(RouteEnv {
            retry:          RetryPolicy::from_config(&config.simulator),
            clock:          DayClock::new(),
            config,
            store,
            rngs,
            catalog,
            model:          self.model,
            session:        SimulatorSession::new(self.sim),
            observations,
            mutation_rng,
            machine_order:  Vec::new(),
            order_version:  None,
            history:        Vec::new(),
            keep_history:   self.keep_history,
            state:          EnvState::Created,
            completed_days: 0,
        })
    }
}
