//! Dijkstra over the CSR road graph with caller-supplied edge costs.
//!
//! Costs are whole milliseconds (`u64`) so the heap key is totally ordered.
//! The path generator calls this repeatedly with penalised copies of the
//! free-flow costs; nothing here knows about penalties.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rm_core::{EdgeId, NodeId};

use crate::network::RoadNetwork;
use crate::{PathError, PathResult};

/// An ordered list of edges and its cost under the weights used to find it.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub edges: Vec<EdgeId>,
    pub cost_ms: u64,
}

impl Route {
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Least-cost route from `from` to `to` where edge `e` costs `costs[e]`.
///
/// Ties are broken by node id, so the result is deterministic.
pub fn shortest_path(
    network: &RoadNetwork,
    from: NodeId,
    to: NodeId,
    costs: &[u64],
) -> PathResult<Route> {
    if !network.contains(from) {
        return Err(PathError::NodeNotFound(from));
    }
    if !network.contains(to) {
        return Err(PathError::NodeNotFound(to));
    }
    if from == to {
        return Ok(Route { edges: vec![], cost_ms: 0 });
    }
    debug_assert_eq!(costs.len(), network.edge_count());

    let n = network.node_count();
    let mut dist      = vec![u64::MAX; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    dist[from.index()] = 0;

    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(network, &prev_edge, to, cost));
        }
        if cost > dist[node.index()] {
            continue;
        }
        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost.saturating_add(costs[edge.index()]);
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    Err(PathError::NoRoute { from, to })
}

fn reconstruct(network: &RoadNetwork, prev_edge: &[EdgeId], to: NodeId, cost_ms: u64) -> Route {
    let mut edges = Vec::new();
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();
    Route { edges, cost_ms }
}
