//! Precomputed alternative paths per origin-destination pair.
//!
//! # Generation
//!
//! Candidates come from an iterative penalty method: find the least-cost
//! route under the current edge costs, multiply the cost of every edge on it
//! by `penalty_factor`, repeat.  Each round pushes the next search away from
//! edges already used, which yields distinct but still plausible routes.
//!
//! Candidates whose free-flow time exceeds `max_detour_ratio` times the
//! shortest are dropped.  The free-flow shortest path is always kept; the
//! other `num_paths - 1` slots are filled by sampling without replacement
//! with weight `exp(-(cost / shortest - 1) / temperature)`.
//!
//! Paths inside a pair are sorted by ascending free-flow time, so
//! `PathIndex(0)` is always the free-flow shortest path.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use rm_core::{EdgeId, NodeId, OdPairId, PathIndex, PathsConfig, SimRng};

use crate::network::RoadNetwork;
use crate::router::shortest_path;
use crate::PathResult;

/// Candidates searched per requested path.
const CANDIDATES_PER_PATH: usize = 3;
/// Penalty rounds per requested candidate before giving up on finding more.
const ROUNDS_PER_CANDIDATE: usize = 4;

/// One route option inside an OD pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub edges: Vec<EdgeId>,
    pub free_flow_secs: f64,
    pub length_m: f32,
}

/// Alternatives for every OD pair of a run, fixed for the whole run.
#[derive(Clone, Debug, Default)]
pub struct PathCatalog {
    od_pairs: Vec<(NodeId, NodeId)>,
    index:    FxHashMap<(NodeId, NodeId), OdPairId>,
    paths:    Vec<Vec<Path>>,
}

impl PathCatalog {
    /// Generate up to `config.num_paths` paths for each distinct pair in
    /// `od_pairs`.  Pair ids follow first appearance in the input.
    pub fn generate(
        network: &RoadNetwork,
        od_pairs: &[(NodeId, NodeId)],
        config: &PathsConfig,
        rng: &mut SimRng,
    ) -> PathResult<Self> {
        let mut catalog = PathCatalog::default();
        for &(from, to) in od_pairs {
            if catalog.index.contains_key(&(from, to)) {
                continue;
            }
            let paths = select(candidates(network, from, to, config)?, config, rng);
            debug!(%from, %to, paths = paths.len(), "path set generated");
            catalog.insert(from, to, paths);
        }
        Ok(catalog)
    }

    /// Assemble a catalog from explicit path sets, sorted as generation
    /// would sort them.  Useful when paths come from outside.
    pub fn from_paths(sets: Vec<((NodeId, NodeId), Vec<Path>)>) -> Self {
        let mut catalog = PathCatalog::default();
        for ((from, to), mut paths) in sets {
            sort_paths(&mut paths);
            catalog.insert(from, to, paths);
        }
        catalog
    }

    fn insert(&mut self, from: NodeId, to: NodeId, paths: Vec<Path>) {
        let id = OdPairId(self.od_pairs.len() as u32);
        self.index.insert((from, to), id);
        self.od_pairs.push((from, to));
        self.paths.push(paths);
    }

    pub fn od_id(&self, from: NodeId, to: NodeId) -> Option<OdPairId> {
        self.index.get(&(from, to)).copied()
    }

    pub fn od_pair(&self, od: OdPairId) -> (NodeId, NodeId) {
        self.od_pairs[od.index()]
    }

    pub fn paths(&self, od: OdPairId) -> &[Path] {
        &self.paths[od.index()]
    }

    pub fn path(&self, od: OdPairId, idx: PathIndex) -> Option<&Path> {
        self.paths[od.index()].get(idx.index())
    }

    /// Size of the action space for agents travelling on `od`.
    #[inline]
    pub fn num_paths(&self, od: OdPairId) -> usize {
        self.paths[od.index()].len()
    }

    /// Free-flow seconds per path, the prior for a fresh cost table.
    pub fn free_flow_costs(&self, od: OdPairId) -> Vec<f64> {
        self.paths[od.index()].iter().map(|p| p.free_flow_secs).collect()
    }

    /// Number of OD pairs.
    pub fn len(&self) -> usize {
        self.od_pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.od_pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OdPairId, (NodeId, NodeId), &[Path])> + '_ {
        self.od_pairs
            .iter()
            .zip(&self.paths)
            .enumerate()
            .map(|(i, (&od, paths))| (OdPairId(i as u32), od, paths.as_slice()))
    }
}

// ── Generation internals ──────────────────────────────────────────────────────

fn candidates(
    network: &RoadNetwork,
    from: NodeId,
    to: NodeId,
    config: &PathsConfig,
) -> PathResult<Vec<Path>> {
    let wanted = config.num_paths * CANDIDATES_PER_PATH;
    let mut costs = network.free_flow_ms();
    let mut seen: FxHashSet<Vec<EdgeId>> = FxHashSet::default();
    let mut found = Vec::with_capacity(wanted);

    for _ in 0..wanted * ROUNDS_PER_CANDIDATE {
        let route = shortest_path(network, from, to, &costs)?;
        if route.is_trivial() {
            found.push(make_path(network, route.edges));
            break;
        }
        for e in &route.edges {
            let c = &mut costs[e.index()];
            *c = ((*c as f64 * config.penalty_factor).ceil() as u64).max(*c + 1);
        }
        if seen.insert(route.edges.clone()) {
            found.push(make_path(network, route.edges));
            if found.len() >= wanted {
                break;
            }
        }
    }
    Ok(found)
}

fn make_path(network: &RoadNetwork, edges: Vec<EdgeId>) -> Path {
    Path {
        free_flow_secs: network.free_flow_secs(&edges),
        length_m:       network.length_m(&edges),
        edges,
    }
}

fn select(mut found: Vec<Path>, config: &PathsConfig, rng: &mut SimRng) -> Vec<Path> {
    sort_paths(&mut found);
    let Some(shortest) = found.first().map(|p| p.free_flow_secs) else {
        return found;
    };
    if shortest <= 0.0 {
        found.truncate(1);
        return found;
    }

    let limit = shortest * config.max_detour_ratio;
    let mut rest: Vec<Path> = found.drain(1..).filter(|p| p.free_flow_secs <= limit).collect();
    let mut chosen = found;

    while chosen.len() < config.num_paths && !rest.is_empty() {
        let weights: Vec<f64> = rest
            .iter()
            .map(|p| (-(p.free_flow_secs / shortest - 1.0) / config.temperature).exp())
            .collect();
        // Underflowing weights fall back to the cheapest remaining candidate.
        let pick = rng.pick_weighted(&weights).unwrap_or(0);
        chosen.push(rest.swap_remove(pick));
        sort_paths(&mut rest);
    }

    sort_paths(&mut chosen);
    chosen
}

fn sort_paths(paths: &mut [Path]) {
    paths.sort_by(|a, b| {
        a.free_flow_secs
            .total_cmp(&b.free_flow_secs)
            .then_with(|| a.edges.cmp(&b.edges))
    });
}
