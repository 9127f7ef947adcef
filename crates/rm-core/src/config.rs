//! Experiment configuration.
//!
//! Loaded from TOML.  Every section rejects unknown keys, and the offending
//! key is reported as [`CoreError::UnknownKey`].  All sections have defaults,
//! so a file only needs to name what it changes:
//!
//! ```toml
//! [run]
//! seed = 7
//! human_learning_days = 100
//!
//! [population]
//! num_agents = 100
//!
//! [mutation]
//! new_machines = 40
//!
//! [machine]
//! behavior = "malicious"
//! ```
//!
//! Semantic checks (ranges, cross-section bounds) run in
//! [`ExperimentConfig::validate`], which [`ExperimentConfig::from_toml_str`]
//! calls before returning.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, Day, Phase, Strategy};

// ── Enumerated options ───────────────────────────────────────────────────────

/// Which day-to-day learning rule drives human agents.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanModelKind {
    /// Exponential smoothing of the taken path's estimate.
    #[default]
    Gawron,
    /// Running mean with the prior as one pseudo sample.
    Cumulative,
    /// Prior blended with the mean of a bounded sample window.
    WeightedAverage,
}

/// How machine observations are assembled.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// Per-path counts of same-OD agents that started shortly before.
    #[default]
    PreviousAgentStart,
    /// The agent's own cost estimates.
    CostTable,
}

/// Output backend for per-day records.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputBackend {
    #[default]
    Csv,
    Sqlite,
    Parquet,
}

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Master seed.  The same seed and configuration reproduce a run exactly.
    pub seed: u64,
    /// Days before mutation.  Mutation triggers at this day.
    pub human_learning_days: u64,
    /// Days after mutation during which machines learn.
    pub training_days: u64,
    /// Days after training during which machines act without learning.
    pub test_days: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { seed: 42, human_learning_days: 100, training_days: 200, test_days: 50 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationConfig {
    /// Number of synthetic agents.  Ignored when `demand_file` is set.
    pub num_agents: usize,
    /// CSV with `id,origin,destination,start_time` rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demand_file: Option<PathBuf>,
    /// `[origin, destination]` node pairs for synthetic demand, assigned
    /// round-robin.
    pub od_pairs: Vec<[u32; 2]>,
    /// Synthetic start times are drawn uniformly from `[0, window)`.
    pub departure_window_secs: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            num_agents:            100,
            demand_file:           None,
            od_pairs:              vec![[0, 3]],
            departure_window_secs: 3_600,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MutationConfig {
    /// Humans converted into machines when mutation triggers.
    pub new_machines: usize,
    /// Keep a mutated agent's cost table instead of resetting it to the
    /// free-flow prior.
    pub retain_cost_history: bool,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self { new_machines: 40, retain_cost_history: true }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HumanConfig {
    pub model: HumanModelKind,
    /// Smoothing weight (`gawron`) or prior weight (`weighted_average`).
    pub learning_rate: f64,
    /// Logit sensitivity on normalised costs.  0 means uniform choice.
    pub beta: f64,
    /// Probability of ignoring costs and picking uniformly.
    pub exploration: f64,
    /// Std-dev of multiplicative perception noise on costs.
    pub noise: f64,
    /// Sample window for `weighted_average`.
    pub memory: usize,
}

impl Default for HumanConfig {
    fn default() -> Self {
        Self {
            model:         HumanModelKind::Gawron,
            learning_rate: 0.2,
            beta:          8.0,
            exploration:   0.0,
            noise:         0.05,
            memory:        5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    pub behavior: Strategy,
    pub observation: ObservationKind,
    /// Look-back window for `previous_agent_start`.
    pub observed_span_secs: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            behavior:           Strategy::Selfish,
            observation:        ObservationKind::PreviousAgentStart,
            observed_span_secs: 300,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Built-in topology name, or a label when `edges_file` is set.
    pub name: String,
    /// CSV with `from,to,length_m,free_flow_secs,capacity_vph` rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges_file: Option<PathBuf>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { name: "two_route".to_owned(), edges_file: None }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Alternative paths kept per OD pair.
    pub num_paths: usize,
    /// Cost multiplier applied to edges of each path already found.
    pub penalty_factor: f64,
    /// Drop candidates slower than this multiple of the shortest path.
    pub max_detour_ratio: f64,
    /// Logit temperature when sampling among candidates.
    pub temperature: f64,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { num_paths: 3, penalty_factor: 1.5, max_detour_ratio: 2.0, temperature: 0.5 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Length of the simulated window each day.
    pub horizon_secs: u32,
    /// Width of the departure bins used to aggregate flows.
    pub bin_secs: u32,
    /// Reconnect attempts per day before the run is aborted.
    pub max_retries: u32,
    /// Base backoff, doubled on each attempt.
    pub retry_backoff_ms: u64,
    pub bpr_alpha: f64,
    pub bpr_beta: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            horizon_secs:     7_200,
            bin_secs:         300,
            max_retries:      3,
            retry_backoff_ms: 100,
            bpr_alpha:        0.15,
            bpr_beta:         4.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportingConfig {
    pub output_dir: PathBuf,
    pub backend: OutputBackend,
    /// Trailing window (days) for the smoothed travel-time column.
    pub smooth_by: usize,
    /// Labels written to summary rows for the three phases, in order.
    pub phase_names: [String; 3],
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            output_dir:  PathBuf::from("output"),
            backend:     OutputBackend::Csv,
            smooth_by:   10,
            phase_names: [
                "Human learning".to_owned(),
                "Training".to_owned(),
                "Testing".to_owned(),
            ],
        }
    }
}

impl ReportingConfig {
    pub fn phase_label(&self, phase: Phase) -> &str {
        match phase {
            Phase::HumanLearning => &self.phase_names[0],
            Phase::PostMutation  => &self.phase_names[1],
            Phase::Testing       => &self.phase_names[2],
        }
    }
}

// ── ExperimentConfig ─────────────────────────────────────────────────────────

/// Top-level experiment configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub run:        RunConfig,
    pub population: PopulationConfig,
    pub mutation:   MutationConfig,
    pub human:      HumanConfig,
    pub machine:    MachineConfig,
    pub network:    NetworkConfig,
    pub paths:      PathsConfig,
    pub simulator:  SimulatorConfig,
    pub reporting:  ReportingConfig,
}

impl ExperimentConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: ExperimentConfig = toml::from_str(text).map_err(classify_toml_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialise back to TOML, e.g. to store next to run output.
    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Parse(e.to_string()))
    }

    /// The day on which mutation triggers.
    #[inline]
    pub fn mutation_day(&self) -> Day {
        Day(self.run.human_learning_days)
    }

    #[inline]
    pub fn total_days(&self) -> u64 {
        self.run.human_learning_days + self.run.training_days + self.run.test_days
    }

    /// Range and consistency checks.  Runs before any simulation step.
    pub fn validate(&self) -> CoreResult<()> {
        let p = &self.population;
        if p.demand_file.is_none() {
            ensure(p.num_agents > 0, "population.num_agents must be > 0")?;
            ensure(!p.od_pairs.is_empty(), "population.od_pairs must not be empty")?;
            ensure(
                self.mutation.new_machines <= p.num_agents,
                "mutation.new_machines must not exceed population.num_agents",
            )?;
        }
        ensure(
            p.departure_window_secs <= self.simulator.horizon_secs,
            "population.departure_window_secs must not exceed simulator.horizon_secs",
        )?;

        let h = &self.human;
        ensure(
            h.learning_rate > 0.0 && h.learning_rate <= 1.0,
            "human.learning_rate must be in (0, 1]",
        )?;
        ensure(h.beta >= 0.0 && h.beta.is_finite(), "human.beta must be a finite value >= 0")?;
        ensure((0.0..=1.0).contains(&h.exploration), "human.exploration must be in [0, 1]")?;
        ensure(h.noise >= 0.0 && h.noise.is_finite(), "human.noise must be a finite value >= 0")?;
        ensure(h.memory >= 1, "human.memory must be >= 1")?;

        let paths = &self.paths;
        ensure(paths.num_paths >= 1, "paths.num_paths must be >= 1")?;
        ensure(paths.num_paths <= u16::MAX as usize, "paths.num_paths is too large")?;
        ensure(paths.penalty_factor > 1.0, "paths.penalty_factor must be > 1")?;
        ensure(paths.max_detour_ratio >= 1.0, "paths.max_detour_ratio must be >= 1")?;
        ensure(paths.temperature > 0.0, "paths.temperature must be > 0")?;

        let s = &self.simulator;
        ensure(s.horizon_secs > 0, "simulator.horizon_secs must be > 0")?;
        ensure(s.bin_secs > 0, "simulator.bin_secs must be > 0")?;
        ensure(s.bpr_alpha >= 0.0, "simulator.bpr_alpha must be >= 0")?;
        ensure(s.bpr_beta >= 0.0, "simulator.bpr_beta must be >= 0")?;

        ensure(!self.network.name.trim().is_empty(), "network.name must not be empty")?;
        ensure(self.reporting.smooth_by >= 1, "reporting.smooth_by must be >= 1")?;
        ensure(
            self.reporting.phase_names.iter().all(|n| !n.trim().is_empty()),
            "reporting.phase_names must not contain empty labels",
        )?;
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn ensure(cond: bool, msg: &str) -> CoreResult<()> {
    if cond { Ok(()) } else { Err(CoreError::Config(msg.to_owned())) }
}

/// Turn serde's "unknown field `x`" into a dedicated variant naming `x`.
fn classify_toml_error(err: toml::de::Error) -> CoreError {
    let msg = err.message();
    if let Some(rest) = msg.strip_prefix("unknown field `") {
        if let Some(end) = rest.find('`') {
            return CoreError::UnknownKey(rest[..end].to_owned());
        }
    }
    CoreError::Config(msg.to_owned())
}
