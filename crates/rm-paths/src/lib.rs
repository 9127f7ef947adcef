//! `rm-paths` — road network, routing, and the path catalog.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`network`]  | `RoadNetwork` (CSR), `RoadNetworkBuilder`, `EdgeAttrs`    |
//! | [`topology`] | built-in networks (`two_route`, `braess`), edge CSV loader|
//! | [`router`]   | `Route`, Dijkstra over caller-supplied edge costs        |
//! | [`catalog`]  | `Path`, `PathCatalog` (alternatives per OD pair)          |
//! | [`error`]    | `PathError`, `PathResult<T>`                              |

pub mod catalog;
pub mod error;
pub mod network;
pub mod router;
pub mod topology;


pub use catalog::{Path, PathCatalog};
pub use error::{PathError, PathResult};
pub use network::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};
pub use router::{shortest_path, Route};
pub use topology::{builtin, load_edges_csv, load_edges_reader, network_from_config};
