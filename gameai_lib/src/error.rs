use thiserror::Error;

use crate::graph::NodeIndex;

/// Failures raised by graph construction and path queries.
///
/// An unreachable goal is never one of these, searches report it through
/// [`crate::pathfinding::SearchOutcome::Nearest`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("invalid node reference {index}, graph has {node_count} nodes")]
    InvalidNode { index: NodeIndex, node_count: usize },

    #[error("connection {from} -> {to} has invalid cost {cost}")]
    InvalidCost {
        from: NodeIndex,
        to: NodeIndex,
        cost: f32,
    },

    #[error("no connection from {from} to {to}")]
    MissingConnection { from: NodeIndex, to: NodeIndex },

    #[error("jump point search needs unweighted terrain and a diagonal cost between one and two orthogonal steps")]
    NonUniformGrid,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("can't parse options: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid grid dimensions {columns}x{rows}")]
    InvalidDimensions { columns: usize, rows: usize },

    #[error("option `{name}` must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
}
