//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the EdgeId range
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All edge arrays are sorted by source node and indexed by `EdgeId`.  Within
//! one source node, edges keep insertion order, so a network built from the
//! same edge list always assigns the same ids.

use rm_core::{EdgeId, NodeId};

/// Static attributes of one directed link.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeAttrs {
    pub length_m: f32,
    /// Travel time on an empty road.
    pub free_flow_secs: f64,
    /// Practical capacity in vehicles per hour.
    pub capacity_vph: f64,
}

impl EdgeAttrs {
    pub fn new(length_m: f32, free_flow_secs: f64, capacity_vph: f64) -> Self {
        Self { length_m, free_flow_secs, capacity_vph }
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format.
///
/// Fields are `pub` for direct indexed access on hot paths.  Construct with
/// [`RoadNetworkBuilder`].
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    node_count: usize,

    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source node of each edge, used to walk predecessor edges back.
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    pub edge_length_m: Vec<f32>,
    pub edge_free_flow_secs: Vec<f64>,
    pub edge_capacity_vph: Vec<f64>,
}

impl RoadNetwork {
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count
    }

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Free-flow cost of every edge in whole milliseconds, the unit the
    /// router works in.
    pub fn free_flow_ms(&self) -> Vec<u64> {
        self.edge_free_flow_secs
            .iter()
            .map(|&s| (s * 1_000.0).round().max(0.0) as u64)
            .collect()
    }

    /// Sum of free-flow seconds along `edges`.
    pub fn free_flow_secs(&self, edges: &[EdgeId]) -> f64 {
        edges.iter().map(|e| self.edge_free_flow_secs[e.index()]).sum()
    }

    pub fn length_m(&self, edges: &[EdgeId]) -> f32 {
        edges.iter().map(|e| self.edge_length_m[e.index()]).sum()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// ```
/// use rm_paths::{EdgeAttrs, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node();
/// let c = b.add_node();
/// b.add_road(a, c, EdgeAttrs::new(1_200.0, 90.0, 1_800.0));
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
#[derive(Default)]
pub struct RoadNetworkBuilder {
    node_count: usize,
    raw_edges:  Vec<RawEdge>,
}

struct RawEdge {
    from:  NodeId,
    to:    NodeId,
    attrs: EdgeAttrs,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(edges: usize) -> Self {
        Self { node_count: 0, raw_edges: Vec::with_capacity(edges) }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.node_count as u32);
        self.node_count += 1;
        id
    }

    /// Grow the node set so that `node` exists.  Used by loaders that name
    /// nodes by number rather than creating them in order.
    pub fn ensure_node(&mut self, node: NodeId) {
        self.node_count = self.node_count.max(node.index() + 1);
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, attrs: EdgeAttrs) {
        self.ensure_node(from);
        self.ensure_node(to);
        self.raw_edges.push(RawEdge { from, to, attrs });
    }

    /// Add edges in both directions with the same attributes.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, attrs: EdgeAttrs) {
        self.add_directed_edge(a, b, attrs);
        self.add_directed_edge(b, a, attrs);
    }

    pub fn node_count(&self) -> usize { self.node_count }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    pub fn build(self) -> RoadNetwork {
        let node_count = self.node_count;
        let edge_count = self.raw_edges.len();

        // Stable sort keeps insertion order among edges of the same source.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        RoadNetwork {
            node_count,
            node_out_start,
            edge_from:           raw.iter().map(|e| e.from).collect(),
            edge_to:             raw.iter().map(|e| e.to).collect(),
            edge_length_m:       raw.iter().map(|e| e.attrs.length_m).collect(),
            edge_free_flow_secs: raw.iter().map(|e| e.attrs.free_flow_secs).collect(),
            edge_capacity_vph:   raw.iter().map(|e| e.attrs.capacity_vph).collect(),
        }
    }
}
