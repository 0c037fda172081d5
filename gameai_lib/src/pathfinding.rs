use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{GridGraph, NavGraph, NodeIndex};
use crate::heuristic::Heuristic;

pub mod astar;
pub mod bfs;
pub mod jps;
pub mod planner;
mod records;

pub use astar::AStar;
pub use bfs::BreadthFirst;
pub use jps::JumpPointSearch;
pub use planner::{Endpoint, PathPlanner};
pub use records::NodeRecord;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// Path ends at the goal.
    Reached,
    /// Goal unreachable, path ends at the explored node closest to it.
    Nearest,
}

/// Nodes in the order they entered the open and closed lists, for overlays.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchTrace {
    pub opened: Vec<NodeIndex>,
    pub closed: Vec<NodeIndex>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub path: Vec<NodeIndex>,
    pub outcome: SearchOutcome,
    pub trace: SearchTrace,
}

impl PathResult {
    pub(crate) fn single(node: NodeIndex) -> Self {
        PathResult {
            path: vec![node],
            outcome: SearchOutcome::Reached,
            trace: SearchTrace::default(),
        }
    }

    pub fn is_reached(&self) -> bool {
        self.outcome == SearchOutcome::Reached
    }

    pub fn last(&self) -> Option<NodeIndex> {
        self.path.last().copied()
    }
}

pub trait PathFinder<G: NavGraph + ?Sized> {
    /// Path from `start` to `goal`, both inclusive.
    ///
    /// An unreachable goal is not an error: the result then carries
    /// [`SearchOutcome::Nearest`] and ends at the explored node with the lowest
    /// heuristic distance to the goal.
    fn find_path(&self, graph: &G, start: NodeIndex, goal: NodeIndex) -> Result<PathResult, GraphError>;
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Algorithm {
    Bfs,
    #[default]
    AStar,
    Jps,
}

impl Algorithm {
    pub fn find_path(
        &self,
        grid: &GridGraph,
        heuristic: Heuristic,
        start: NodeIndex,
        goal: NodeIndex,
    ) -> Result<PathResult, GraphError> {
        match self {
            Algorithm::Bfs => BreadthFirst::new(heuristic).find_path(grid, start, goal),
            Algorithm::AStar => AStar::new(heuristic).find_path(grid, start, goal),
            Algorithm::Jps => JumpPointSearch::new(heuristic).find_path(grid, start, goal),
        }
    }
}

pub(crate) fn heuristic_cost<G: NavGraph + ?Sized>(
    graph: &G,
    heuristic: Heuristic,
    from: NodeIndex,
    to: NodeIndex,
) -> Result<f32, GraphError> {
    let span = graph.heuristic_span(from, to)?;
    Ok(heuristic.cost(span.x, span.y))
}

/// First explored node with strictly minimal heuristic distance to `goal`.
///
/// `explored` must be in closed-list order, it decides ties. Falls back to
/// `start` when nothing but the goal was explored.
pub(crate) fn nearest_to_goal<G, I>(
    graph: &G,
    heuristic: Heuristic,
    explored: I,
    start: NodeIndex,
    goal: NodeIndex,
) -> Result<NodeIndex, GraphError>
where
    G: NavGraph + ?Sized,
    I: IntoIterator<Item = NodeIndex>,
{
    let mut nearest: Option<(NodeIndex, f32)> = None;
    for node in explored.into_iter().filter(|&n| n != goal) {
        let h = heuristic_cost(graph, heuristic, node, goal)?;
        if nearest.map_or(true, |(_, best)| h < best) {
            nearest = Some((node, h));
        }
    }
    let node = nearest.map_or(start, |(n, _)| n);
    debug!("goal {goal} unreachable from {start}, settling for node {node}");
    Ok(node)
}

pub(crate) fn check_endpoints<G: NavGraph + ?Sized>(
    graph: &G,
    start: NodeIndex,
    goal: NodeIndex,
) -> Result<(), GraphError> {
    graph.check_node(start)?;
    graph.check_node(goal)
}

#[cfg(test)]
pub(crate) mod test_grids {
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    use crate::graph::{GridGraph, GridSettings, NavGraph, NodeIndex};

    pub fn open_grid(columns: usize, rows: usize, diagonal: bool, diagonal_cost: f32) -> GridGraph {
        let mut settings = GridSettings::new(columns, rows, 1.);
        settings.diagonal = diagonal;
        settings.diagonal_cost = diagonal_cost;
        GridGraph::new(settings).unwrap()
    }

    /// `#` is water, anything else ground. First line is the top row.
    pub fn from_ascii(map: &str, diagonal: bool) -> GridGraph {
        let lines: Vec<&str> = map.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let mut grid = open_grid(lines[0].len(), lines.len(), diagonal, 1.5);
        let rows = lines.len();
        for (i, line) in lines.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                if c == '#' {
                    let index = grid.index_at(col as isize, (rows - 1 - i) as isize).unwrap();
                    grid.isolate_node(index).unwrap();
                }
            }
        }
        grid
    }

    pub fn scattered(columns: usize, rows: usize, diagonal: bool, density: f64, seed: u64) -> GridGraph {
        scattered_with_cost(columns, rows, diagonal, 1.5, density, seed)
    }

    /// Same obstacles as [`scattered`] for the same seed, with a custom diagonal cost.
    pub fn scattered_with_cost(
        columns: usize,
        rows: usize,
        diagonal: bool,
        diagonal_cost: f32,
        density: f64,
        seed: u64,
    ) -> GridGraph {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut grid = open_grid(columns, rows, diagonal, diagonal_cost);
        for index in 0..grid.node_count() {
            if rng.gen_bool(density) {
                grid.isolate_node(index).unwrap();
            }
        }
        grid
    }

    /// Plain Dijkstra over the node table, used as the optimality reference.
    pub fn dijkstra(graph: &impl NavGraph, start: NodeIndex) -> Vec<f32> {
        let mut dist = vec![f32::INFINITY; graph.node_count()];
        let mut done = vec![false; graph.node_count()];
        dist[start] = 0.;
        loop {
            let next = (0..dist.len())
                .filter(|&n| !done[n] && dist[n].is_finite())
                .min_by(|&a, &b| dist[a].total_cmp(&dist[b]));
            let Some(current) = next else { break };
            done[current] = true;
            for c in graph.connections(current).unwrap() {
                let d = dist[current] + c.cost;
                if d < dist[c.to] {
                    dist[c.to] = d;
                }
            }
        }
        dist
    }

    pub fn assert_valid_path(graph: &impl NavGraph, path: &[NodeIndex], start: NodeIndex, end: NodeIndex) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        for pair in path.windows(2) {
            assert!(
                graph.connection(pair[0], pair[1]).unwrap().is_some(),
                "no connection {} -> {} in {path:?}",
                pair[0],
                pair[1]
            );
        }
    }
}
