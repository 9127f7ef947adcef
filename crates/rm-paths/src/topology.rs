//! Network sources: built-in topologies and the edge-list CSV loader.
//!
//! # Edge CSV format
//!
//! One directed link per row.  Nodes are numbered from 0 and created on
//! first mention.
//!
//! ```csv
//! from,to,length_m,free_flow_secs,capacity_vph
//! 0,1,5000,300,1800
//! 1,3,5000,300,1800
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use rm_core::{NetworkConfig, NodeId};

use crate::network::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};
use crate::{PathError, PathResult};

/// Build the network named by `config`: the edge file when one is given,
/// otherwise the built-in topology of that name.
pub fn network_from_config(config: &NetworkConfig) -> PathResult<RoadNetwork> {
    let network = match &config.edges_file {
        Some(path) => load_edges_csv(path)?,
        None => builtin(&config.name)?,
    };
    info!(
        name = %config.name,
        nodes = network.node_count(),
        edges = network.edge_count(),
        "road network ready"
    );
    Ok(network)
}

/// Look up a built-in topology.
///
/// Both networks route from node 0 to node 3.
///
/// - `two_route`: a short low-capacity route `0→1→3` and a longer
///   high-capacity route `0→2→3`.
/// - `braess`: the classic paradox network.  Two congestible links
///   (`0→1`, `2→3`), two fixed links (`1→3`, `0→2`) and a fast connector
///   `1→2`.
pub fn builtin(name: &str) -> PathResult<RoadNetwork> {
    match name {
        "two_route" => Ok(two_route()),
        "braess" => Ok(braess()),
        other => Err(PathError::UnknownTopology(other.to_owned())),
    }
}

fn two_route() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::with_capacity(4);
    let (o, short, long, d) = (b.add_node(), b.add_node(), b.add_node(), b.add_node());
    b.add_directed_edge(o, short, EdgeAttrs::new(5_000.0, 300.0, 1_800.0));
    b.add_directed_edge(short, d, EdgeAttrs::new(5_000.0, 300.0, 1_800.0));
    b.add_directed_edge(o, long, EdgeAttrs::new(7_000.0, 420.0, 3_600.0));
    b.add_directed_edge(long, d, EdgeAttrs::new(5_000.0, 300.0, 3_600.0));
    b.build()
}

fn braess() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::with_capacity(5);
    let (o, a, c, d) = (b.add_node(), b.add_node(), b.add_node(), b.add_node());
    b.add_directed_edge(o, a, EdgeAttrs::new(1_000.0, 60.0, 1_000.0));
    b.add_directed_edge(a, d, EdgeAttrs::new(7_500.0, 450.0, 10_000.0));
    b.add_directed_edge(o, c, EdgeAttrs::new(7_500.0, 450.0, 10_000.0));
    b.add_directed_edge(c, d, EdgeAttrs::new(1_000.0, 60.0, 1_000.0));
    b.add_directed_edge(a, c, EdgeAttrs::new(100.0, 5.0, 10_000.0));
    b.build()
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct EdgeRecord {
    from:           u32,
    to:             u32,
    length_m:       f32,
    free_flow_secs: f64,
    capacity_vph:   f64,
}

pub fn load_edges_csv(path: &Path) -> PathResult<RoadNetwork> {
    let file = std::fs::File::open(path)?;
    load_edges_reader(file)
}

/// Like [`load_edges_csv`] but accepts any `Read` source.
pub fn load_edges_reader<R: Read>(reader: R) -> PathResult<RoadNetwork> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut b = RoadNetworkBuilder::new();

    for (line, result) in csv_reader.deserialize::<EdgeRecord>().enumerate() {
        let row = result.map_err(|e| PathError::Parse(e.to_string()))?;
        if !(row.free_flow_secs > 0.0) || !(row.capacity_vph > 0.0) {
            return Err(PathError::Parse(format!(
                "row {}: free_flow_secs and capacity_vph must be positive",
                line + 1
            )));
        }
        b.add_directed_edge(
            NodeId(row.from),
            NodeId(row.to),
            EdgeAttrs::new(row.length_m, row.free_flow_secs, row.capacity_vph),
        );
    }

    if b.edge_count() == 0 {
        return Err(PathError::Parse("edge file contains no rows".to_owned()));
    }
    Ok(b.build())
}
