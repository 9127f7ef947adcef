//! `rm-traffic` — the boundary to the traffic simulator.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`trip`]    | `TripRequest`, `TripResult`                                   |
//! | [`simulator`]| `TrafficSimulator` trait                                     |
//! | [`session`] | `SimulatorSession<S>` — connection held for a run, closed on drop |
//! | [`bpr`]     | `BprSimulator` — link-performance stand-in                    |
//! | [`fault`]   | `FaultInjector<S>` — scripted failures around any simulator   |
//! | [`error`]   | `SimulatorError`, `SimulatorResult<T>`                        |
//!
//! # Simulation model
//!
//! A day is simulated in one call: the environment hands over every trip
//! (start time plus the edge list of the chosen path) and receives one travel
//! time per trip.  Whatever happens inside is the simulator's business.  The
//! bundled [`BprSimulator`] bins link entries by time and prices each link
//! with the BPR volume-delay function; an external microsimulator plugs in
//! through the same trait.

pub mod bpr;
pub mod error;
pub mod fault;
pub mod session;
pub mod simulator;
pub mod trip;


pub use bpr::BprSimulator;
pub use error::{SimulatorError, SimulatorResult};
pub use fault::FaultInjector;
pub use session::SimulatorSession;
pub use simulator::TrafficSimulator;
pub use trip::{TripRequest, TripResult};
