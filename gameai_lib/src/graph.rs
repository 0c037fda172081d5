use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

pub mod grid_graph;

pub use grid_graph::{GridGraph, GridSettings, TerrainType};

/// Dense node identity, assigned at construction and stable for the graph's lifetime.
pub type NodeIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub index: NodeIndex,
    pub position: Vec2,
}

/// Directed weighted edge between two node indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub cost: f32,
}

impl Connection {
    pub fn new(from: NodeIndex, to: NodeIndex, cost: f32) -> Self {
        Connection { from, to, cost }
    }
}

/// Read-only view the search algorithms need from a graph.
pub trait NavGraph {
    fn node_count(&self) -> usize;

    fn node(&self, index: NodeIndex) -> Result<&Node, GraphError>;

    /// Outgoing connections of `from`, in a fixed per-node order.
    fn connections(&self, from: NodeIndex) -> Result<&[Connection], GraphError>;

    fn connection(&self, from: NodeIndex, to: NodeIndex) -> Result<Option<&Connection>, GraphError> {
        self.node(to)?;
        Ok(self.connections(from)?.iter().find(|c| c.to == to))
    }

    fn node_position(&self, index: NodeIndex) -> Result<Vec2, GraphError> {
        Ok(self.node(index)?.position)
    }

    /// Absolute (dx, dy) fed into a [`crate::heuristic::Heuristic`].
    fn heuristic_span(&self, from: NodeIndex, to: NodeIndex) -> Result<Vec2, GraphError> {
        Ok((self.node_position(to)? - self.node_position(from)?).abs())
    }

    fn check_node(&self, index: NodeIndex) -> Result<(), GraphError> {
        self.node(index).map(|_| ())
    }
}

/// General node/connection graph stored as dense arenas: one `Vec` of nodes
/// and one `Vec` of outgoing connections per node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    directed: bool,
    nodes: Vec<Node>,
    connections: Vec<Vec<Connection>>,
}

impl Graph {
    pub fn new(directed: bool) -> Self {
        Graph {
            directed,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn with_capacity(directed: bool, nodes: usize) -> Self {
        Graph {
            directed,
            nodes: Vec::with_capacity(nodes),
            connections: Vec::with_capacity(nodes),
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn add_node(&mut self, position: Vec2) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node { index, position });
        self.connections.push(Vec::new());
        index
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(Vec::len).sum()
    }

    /// Adds `from -> to`, and `to -> from` on undirected graphs.
    ///
    /// An existing connection between the same endpoints gets its cost replaced,
    /// keeping its place in the enumeration order.
    pub fn add_connection(&mut self, from: NodeIndex, to: NodeIndex, cost: f32) -> Result<(), GraphError> {
        self.check_node(from)?;
        self.check_node(to)?;
        if !cost.is_finite() || cost < 0. {
            return Err(GraphError::InvalidCost { from, to, cost });
        }

        self.upsert(Connection::new(from, to, cost));
        if !self.directed && from != to {
            self.upsert(Connection::new(to, from, cost));
        }
        Ok(())
    }

    fn upsert(&mut self, connection: Connection) {
        let outgoing = &mut self.connections[connection.from];
        match outgoing.iter_mut().find(|c| c.to == connection.to) {
            Some(existing) => existing.cost = connection.cost,
            None => outgoing.push(connection),
        }
    }

    /// Removes `from -> to` (and the mirror on undirected graphs), returns whether anything was removed.
    pub fn remove_connection(&mut self, from: NodeIndex, to: NodeIndex) -> Result<bool, GraphError> {
        self.check_node(from)?;
        self.check_node(to)?;

        let before = self.connection_count();
        self.connections[from].retain(|c| c.to != to);
        if !self.directed {
            self.connections[to].retain(|c| c.to != from);
        }
        Ok(self.connection_count() != before)
    }

    /// Drops every connection into and out of `index`.
    pub fn isolate_node(&mut self, index: NodeIndex) -> Result<(), GraphError> {
        self.check_node(index)?;
        self.connections[index].clear();
        for outgoing in self.connections.iter_mut() {
            outgoing.retain(|c| c.to != index);
        }
        Ok(())
    }

    pub fn is_isolated(&self, index: NodeIndex) -> Result<bool, GraphError> {
        self.check_node(index)?;
        Ok(self.connections[index].is_empty()
            && self.connections.iter().flatten().all(|c| c.to != index))
    }

    /// Node whose position lies closest to `position`, if the graph has nodes.
    pub fn closest_node(&self, position: Vec2) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance_squared(position)
                    .total_cmp(&b.position.distance_squared(position))
            })
            .map(|n| n.index)
    }
}

impl NavGraph for Graph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, index: NodeIndex) -> Result<&Node, GraphError> {
        self.nodes.get(index).ok_or(GraphError::InvalidNode {
            index,
            node_count: self.nodes.len(),
        })
    }

    fn connections(&self, from: NodeIndex) -> Result<&[Connection], GraphError> {
        self.check_node(from)?;
        Ok(&self.connections[from])
    }
}

/// Sums the connection costs along `path`.
pub fn path_cost<G: NavGraph + ?Sized>(graph: &G, path: &[NodeIndex]) -> Result<f32, GraphError> {
    path.windows(2).try_fold(0., |total, pair| {
        let (from, to) = (pair[0], pair[1]);
        graph
            .connection(from, to)?
            .map(|c| total + c.cost)
            .ok_or(GraphError::MissingConnection { from, to })
    })
}
