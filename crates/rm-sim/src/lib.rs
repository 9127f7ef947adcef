//! `rm-sim` — the day driver for the route_marl workspace.
//!
//! # One day
//!
//! ```text
//! step(policy, observer):
//!   ① Humans    — every human samples a path from its cost table
//!                 (parallel with the `parallel` feature).
//!   ② Machines  — in ascending start time: observe, policy.act(..)
//!                 → out-of-range action aborts the day.
//!   ③ Dispatch  — one simulator call for all trips; recoverable failures
//!                 reconnect + retry with backoff, then FatalSimulation.
//!   ④ Learn     — cost tables absorb travel times; machine rewards
//!                 φ · (own, group, other, all); policy.learn in training.
//!   ⑤ Record    — one TravelTimeRecord per agent, DayReport, day += 1.
//! ```
//!
//! # Experiment phases
//!
//! ```text
//! HumanLearning ──mutate()──▶ PostMutation ──begin_testing()──▶ Testing
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the human choice phase on Rayon's thread pool.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rm_core::ExperimentConfig;
//! use rm_sim::{EnvBuilder, NoopObserver, UniformPolicy};
//!
//! let config = ExperimentConfig::from_file("config.toml".as_ref())?;
//! let mut policy = UniformPolicy::new(config.run.seed);
//! let mut env = EnvBuilder::from_config(config)?.build()?;
//! env.run(&mut policy, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod env;
pub mod error;
pub mod observation;
pub mod observer;
pub mod policy;
pub mod record;
pub mod retry;

#[cfg(test)]
mod tests;

pub use builder::EnvBuilder;
pub use env::{EnvState, RouteEnv};
pub use error::{EnvError, EnvResult};
pub use observation::ObservationBuilder;
pub use observer::{DayObserver, NoopObserver};
pub use policy::{MachineFeedback, MachinePolicy, ScriptedPolicy, UniformPolicy};
pub use record::{DayReport, TravelTimeRecord};
pub use retry::RetryPolicy;
