//! Fluent builder for constructing `AgentStore` + `AgentRngs` in one step.
//!
//! ```rust
//! use rm_agent::{AgentStoreBuilder, Trip};
//! use rm_core::{NodeId, PathsConfig, SimRng};
//! use rm_paths::{builtin, PathCatalog};
//!
//! let net = builtin("two_route").unwrap();
//! let trip = Trip { origin: NodeId(0), destination: NodeId(3), start_time: 0 };
//! let catalog = PathCatalog::generate(
//!     &net, &[(trip.origin, trip.destination)], &PathsConfig::default(), &mut SimRng::new(1),
//! ).unwrap();
//!
//! let (store, rngs) = AgentStoreBuilder::new(vec![trip; 10], 42).build(&catalog).unwrap();
//! assert_eq!(store.count, 10);
//! assert_eq!(rngs.len(), 10);
//! assert_eq!(store.human_count(), 10);
//! ```

use rm_paths::PathCatalog;

use crate::{AgentError, AgentResult, AgentRngs, AgentStore, CostTable, Trip};

/// Every agent starts as a human with a cost table seeded from the
/// free-flow costs of its OD pair.
pub struct AgentStoreBuilder {
    trips:  Vec<Trip>,
    seed:   u64,
    memory: usize,
    blank:  bool,
}

impl AgentStoreBuilder {
    /// One agent per trip, `AgentId(i)` for `trips[i]`.
    pub fn new(trips: Vec<Trip>, seed: u64) -> Self {
        Self { trips, seed, memory: 1, blank: false }
    }

    /// Sample window kept per path in each cost table.
    pub fn memory(mut self, memory: usize) -> Self {
        self.memory = memory;
        self
    }

    /// Start every cost table without a free-flow prior.
    pub fn blank_cost_tables(mut self, blank: bool) -> Self {
        self.blank = blank;
        self
    }

    pub fn build(self, catalog: &PathCatalog) -> AgentResult<(AgentStore, AgentRngs)> {
        let count = self.trips.len();
        let mut store = AgentStore::new(count);

        for (i, trip) in self.trips.iter().enumerate() {
            let od = catalog.od_id(trip.origin, trip.destination).ok_or(
                AgentError::UnknownOdPair { origin: trip.origin, destination: trip.destination },
            )?;
            store.origin[i] = trip.origin;
            store.destination[i] = trip.destination;
            store.start_time[i] = trip.start_time;
            store.od[i] = od;
            store.cost_tables.push(if self.blank {
                CostTable::blank(catalog.num_paths(od), self.memory)
            } else {
                CostTable::new(catalog.free_flow_costs(od), self.memory)
            });
        }

        let rngs = AgentRngs::new(count, self.seed);
        Ok((store, rngs))
    }
}
