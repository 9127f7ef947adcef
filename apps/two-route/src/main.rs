//! two-route — run a full route-choice experiment from a TOML file.
//!
//! ```text
//! cargo run -p two-route -- --config apps/two-route/config.toml
//! RUST_LOG=rm_sim=debug cargo run -p two-route -- --seed 7 --machines 20
//! ```
//!
//! Human drivers learn for `run.human_learning_days`, a subset is mutated
//! into machines driven by a uniform random policy, then the machines train
//! and are tested.  Per-agent travel times and per-day summaries are written
//! to `reporting.output_dir`, together with the resolved configuration.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rm_agent::MutationOutcome;
use rm_core::{Day, ExperimentConfig, OutputBackend, Phase};
use rm_output::{open_writer, DayOutputObserver, OutputWriter};
use rm_sim::{DayObserver, DayReport, EnvBuilder, EnvError, TravelTimeRecord, UniformPolicy};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BackendArg {
    Csv,
    Sqlite,
    Parquet,
}

impl From<BackendArg> for OutputBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Csv     => OutputBackend::Csv,
            BackendArg::Sqlite  => OutputBackend::Sqlite,
            BackendArg::Parquet => OutputBackend::Parquet,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "two-route", about = "Mixed human/machine route-choice experiment", version)]
struct Args {
    /// Experiment configuration.  Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `run.seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Override `mutation.new_machines`.
    #[arg(long)]
    machines: Option<usize>,

    /// Override `reporting.output_dir`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override `reporting.backend`.
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Print the resolved configuration and exit.
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn resolve(&self) -> Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ExperimentConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.run.seed = seed;
        }
        if let Some(n) = self.machines {
            config.mutation.new_machines = n;
        }
        if let Some(dir) = &self.output {
            config.reporting.output_dir = dir.clone();
        }
        if let Some(backend) = self.backend {
            config.reporting.backend = backend.into();
        }
        config.validate().context("invalid configuration after overrides")?;
        Ok(config)
    }
}

// ── Observer wrapper to keep phase summaries ─────────────────────────────────

/// Forwards to the output observer and remembers the last report per phase.
struct SummaryObserver<W: OutputWriter> {
    inner:   DayOutputObserver<W>,
    last:    [Option<DayReport>; 3],
    retries: u32,
}

impl<W: OutputWriter> SummaryObserver<W> {
    fn new(inner: DayOutputObserver<W>) -> Self {
        Self { inner, last: [None, None, None], retries: 0 }
    }
}

fn slot(phase: Phase) -> usize {
    match phase {
        Phase::HumanLearning => 0,
        Phase::PostMutation  => 1,
        Phase::Testing       => 2,
    }
}

impl<W: OutputWriter> DayObserver for SummaryObserver<W> {
    fn on_day_start(&mut self, day: Day, phase: Phase) {
        self.inner.on_day_start(day, phase);
    }

    fn on_record(&mut self, record: &TravelTimeRecord) {
        self.inner.on_record(record);
    }

    fn on_day_end(&mut self, report: &DayReport) {
        self.retries += report.retries;
        self.last[slot(report.phase)] = Some(report.clone());
        self.inner.on_day_end(report);
    }

    fn on_retry(&mut self, day: Day, error: &EnvError) {
        self.inner.on_retry(day, error);
    }

    fn on_mutation(&mut self, day: Day, outcome: &MutationOutcome) {
        self.inner.on_mutation(day, outcome);
    }

    fn on_phase_change(&mut self, day: Day, phase: Phase) {
        self.inner.on_phase_change(day, phase);
    }

    fn on_run_end(&mut self, days: u64) {
        self.inner.on_run_end(days);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.resolve()?;
    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    println!("=== two-route — mixed human/machine routing ===");
    println!(
        "Agents: {}  |  Machines: {}  |  Days: {} + {} + {}  |  Seed: {}",
        config.population.num_agents,
        config.mutation.new_machines,
        config.run.human_learning_days,
        config.run.training_days,
        config.run.test_days,
        config.run.seed,
    );
    println!();

    // 1. Output directory and resolved configuration.
    let out_dir = config.reporting.output_dir.clone();
    let writer = open_writer(config.reporting.backend, &out_dir)
        .with_context(|| format!("opening output in {}", out_dir.display()))?;
    std::fs::write(out_dir.join("config.toml"), config.to_toml_string()?)?;
    let mut obs = SummaryObserver::new(DayOutputObserver::new(writer, &config.reporting));

    // 2. Environment and machine policy.
    let labels = config.reporting.phase_names.clone();
    let mut policy = UniformPolicy::new(config.run.seed ^ 0x9E37_79B9_7F4A_7C15);
    let mut env = EnvBuilder::from_config(config)?.build()?;
    info!(agents = env.store.count, "environment ready");

    // 3. Run.
    let t0 = Instant::now();
    let result = env.run(&mut policy, &mut obs);
    let elapsed = t0.elapsed();

    if let Err(e) = &result {
        // Whatever was written before the failure is still flushed.
        if let Err(flush) = obs.inner.finish() {
            warn!(error = %flush, "flushing output after failure");
        }
        if let Some(output) = obs.inner.take_error() {
            warn!(error = %output, "output error");
        }
        bail!("run aborted after {} days: {e}", env.completed_days());
    }
    let days = result?;

    if let Some(e) = obs.inner.take_error() {
        bail!("output error: {e}");
    }

    // 4. Summary.
    println!("Run complete: {days} days in {:.3} s ({} retries)", elapsed.as_secs_f64(), obs.retries);
    println!("Output: {}", out_dir.display());
    println!();
    println!("{:<16} {:>6} {:>10} {:>10} {:>10}", "Phase", "Day", "All", "Humans", "Machines");
    println!("{}", "-".repeat(56));
    let fmt = |v: Option<f64>| v.map(|x| format!("{x:.1}")).unwrap_or_else(|| "-".to_owned());
    for (label, report) in labels.iter().zip(&obs.last) {
        let Some(r) = report else { continue };
        println!(
            "{:<16} {:>6} {:>10.1} {:>10} {:>10}",
            label,
            r.day.0,
            r.mean_travel_time,
            fmt(r.mean_human_travel_time),
            fmt(r.mean_machine_travel_time),
        );
    }

    Ok(())
}
