use std::collections::VecDeque;

use log::debug;

use super::{check_endpoints, nearest_to_goal, PathFinder, PathResult, SearchOutcome, SearchTrace};
use crate::error::GraphError;
use crate::graph::{NavGraph, NodeIndex};
use crate::heuristic::Heuristic;

/// Hop-minimal search, connection costs are ignored.
///
/// The heuristic only ranks discovered nodes when the goal turns out unreachable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BreadthFirst {
    pub heuristic: Heuristic,
}

impl BreadthFirst {
    pub fn new(heuristic: Heuristic) -> Self {
        BreadthFirst { heuristic }
    }
}

impl<G: NavGraph + ?Sized> PathFinder<G> for BreadthFirst {
    fn find_path(&self, graph: &G, start: NodeIndex, goal: NodeIndex) -> Result<PathResult, GraphError> {
        check_endpoints(graph, start, goal)?;
        if start == goal {
            return Ok(PathResult::single(start));
        }

        // first discovery is final, the start has no predecessor
        let mut came_from: Vec<Option<NodeIndex>> = vec![None; graph.node_count()];
        let mut discovered = vec![false; graph.node_count()];
        let mut queue = VecDeque::from([start]);
        let mut trace = SearchTrace::default();
        discovered[start] = true;
        trace.opened.push(start);

        let mut reached = false;
        while let Some(current) = queue.pop_front() {
            trace.closed.push(current);
            if current == goal {
                reached = true;
                break;
            }
            for connection in graph.connections(current)? {
                if !discovered[connection.to] {
                    discovered[connection.to] = true;
                    came_from[connection.to] = Some(current);
                    queue.push_back(connection.to);
                    trace.opened.push(connection.to);
                }
            }
        }

        let (end, outcome) = if reached {
            (goal, SearchOutcome::Reached)
        } else {
            let nearest = nearest_to_goal(graph, self.heuristic, trace.opened.iter().copied(), start, goal)?;
            (nearest, SearchOutcome::Nearest)
        };

        let mut path = vec![end];
        let mut current = end;
        while let Some(previous) = came_from[current] {
            path.push(previous);
            current = previous;
        }
        path.reverse();

        debug!(
            "bfs {start} -> {goal}: {:?} in {} hops, {} discovered",
            outcome,
            path.len() - 1,
            trace.opened.len()
        );
        Ok(PathResult { path, outcome, trace })
    }
}
