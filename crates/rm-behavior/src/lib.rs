//! `rm-behavior` — how drivers learn and what machines are rewarded for.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                       |
//! |------------|----------------------------------------------------------------|
//! | [`model`]  | `HumanModel` trait                                             |
//! | [`choice`] | `LogitChoice` (logit over normalised costs, noise, exploration)|
//! | [`models`] | `Gawron`, `Cumulative`, `WeightedAverage`, `AnyHumanModel`     |
//! | [`reward`] | `TravelTimeStats`, `GroupStats`, `reward`                      |
//! | [`error`]  | `BehaviorError`, `BehaviorResult<T>`                           |
//!
//! # Design notes
//!
//! Models are stateless: every per-agent quantity lives in the agent's
//! `CostTable` and every random draw comes from the agent's own `AgentRng`.
//! A model can therefore be shared by reference across Rayon workers during
//! the choice phase, and results do not depend on visiting order.

pub mod choice;
pub mod error;
pub mod model;
pub mod models;
pub mod reward;


pub use choice::LogitChoice;
pub use error::{BehaviorError, BehaviorResult};
pub use model::HumanModel;
pub use models::{AnyHumanModel, Cumulative, Gawron, WeightedAverage};
pub use reward::{reward, GroupStats, TravelTimeStats};
