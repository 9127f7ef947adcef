//! `rm-agent` — the driver population.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`store`]     | `AgentStore` (SoA arrays), `AgentRngs`, `MachineState`    |
//! | [`cost`]      | `CostTable` (per-agent path cost estimates)               |
//! | [`demand`]    | `Trip`, demand CSV loader, synthetic demand               |
//! | [`builder`]   | `AgentStoreBuilder` (trips + path catalog → population)   |
//! | [`mutation`]  | `mutate`, `MutationRequest`, `MutationOutcome`            |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                            |

pub mod builder;
pub mod cost;
pub mod demand;
pub mod error;
pub mod mutation;
pub mod store;


pub use builder::AgentStoreBuilder;
pub use cost::CostTable;
pub use demand::{load_demand_csv, load_demand_reader, synthetic_demand, unique_od_pairs, Trip};
pub use error::{AgentError, AgentResult};
pub use mutation::{mutate, MutationOutcome, MutationRequest};
pub use store::{AgentRngs, AgentStore, MachineState};
