//! Path-subsystem error type.

use thiserror::Error;

use rm_core::NodeId;

/// Errors produced by `rm-paths`.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("unknown built-in topology `{0}` (expected `two_route` or `braess`)")]
    UnknownTopology(String),

    #[error("edge file parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PathResult<T> = Result<T, PathError>;
