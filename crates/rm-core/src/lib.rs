//! `rm-core` — foundational types for the `route_marl` workspace.
//!
//! This crate is a dependency of every other `rm-*` crate.  It has no `rm-*`
//! dependencies and only a handful of external ones (`rand`, `serde`,
//! `thiserror`, `toml`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `AgentId`, `NodeId`, `EdgeId`, `PathIndex`, `OdPairId`  |
//! | [`day`]       | `Day`, `Phase`, `DayClock`                              |
//! | [`rng`]       | `AgentRng` (per-agent), `SimRng` (global)               |
//! | [`kind`]      | `AgentKind` (human / machine)                           |
//! | [`strategy`]  | `BehaviorVector` (φ), `Strategy` presets                |
//! | [`config`]    | `ExperimentConfig` and its sections, TOML loading       |
//! | [`error`]     | `CoreError`, `CoreResult`                               |

pub mod config;
pub mod day;
pub mod error;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod strategy;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    ExperimentConfig, HumanConfig, HumanModelKind, MachineConfig, MutationConfig,
    NetworkConfig, ObservationKind, OutputBackend, PathsConfig, PopulationConfig,
    ReportingConfig, RunConfig, SimulatorConfig,
};
pub use day::{Day, DayClock, Phase};
pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, EdgeId, NodeId, OdPairId, PathIndex};
pub use kind::AgentKind;
pub use rng::{AgentRng, SimRng};
pub use strategy::{BehaviorVector, Strategy};
