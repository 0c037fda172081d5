use log::debug;

use super::records::{backtrack, relax, ClosedList, NodeRecord, OpenList};
use super::{check_endpoints, heuristic_cost, nearest_to_goal, PathFinder, PathResult, SearchOutcome, SearchTrace};
use crate::error::GraphError;
use crate::graph::{NavGraph, NodeIndex};
use crate::heuristic::Heuristic;

/// Best-first search on f = g + h.
///
/// Optimal while `heuristic` never overestimates the remaining cost on the graph it runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AStar {
    pub heuristic: Heuristic,
}

impl AStar {
    pub fn new(heuristic: Heuristic) -> Self {
        AStar { heuristic }
    }
}

impl<G: NavGraph + ?Sized> PathFinder<G> for AStar {
    fn find_path(&self, graph: &G, start: NodeIndex, goal: NodeIndex) -> Result<PathResult, GraphError> {
        check_endpoints(graph, start, goal)?;
        if start == goal {
            return Ok(PathResult::single(start));
        }

        let mut open = OpenList::default();
        let mut closed = ClosedList::new(graph.node_count());
        let mut trace = SearchTrace::default();

        open.push(NodeRecord::start(start, heuristic_cost(graph, self.heuristic, start, goal)?));
        trace.opened.push(start);

        let mut reached = false;
        while let Some(current) = open.pop_cheapest() {
            closed.insert(current);
            trace.closed.push(current.node);
            if current.node == goal {
                reached = true;
                break;
            }

            for connection in graph.connections(current.node)? {
                let cost_so_far = current.cost_so_far + connection.cost;
                let h = heuristic_cost(graph, self.heuristic, connection.to, goal)?;
                let candidate = NodeRecord {
                    node: connection.to,
                    connection: Some(*connection),
                    cost_so_far,
                    estimated_total_cost: cost_so_far + h,
                };
                if relax(&mut open, &mut closed, candidate) {
                    trace.opened.push(connection.to);
                }
            }
        }

        let (end, outcome) = if reached {
            (goal, SearchOutcome::Reached)
        } else {
            let nearest = nearest_to_goal(graph, self.heuristic, closed.order().iter().copied(), start, goal)?;
            (nearest, SearchOutcome::Nearest)
        };
        let path = backtrack(&closed, &open, end);
        debug!(
            "a* {start} -> {goal}: {:?} in {} steps, {} opened, {} closed",
            outcome,
            path.len(),
            trace.opened.len(),
            trace.closed.len()
        );
        Ok(PathResult { path, outcome, trace })
    }
}
