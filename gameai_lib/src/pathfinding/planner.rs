use std::time::{Duration, Instant};

use glam::Vec2;
use log::{info, warn};

use super::PathResult;
use crate::error::GraphError;
use crate::graph::{GridGraph, NodeIndex};
use crate::options::PathOptions;

/// Which end of the path the next pick moves.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum Endpoint {
    #[default]
    Start,
    Goal,
}

impl Endpoint {
    pub fn toggled(self) -> Self {
        match self {
            Endpoint::Start => Endpoint::Goal,
            Endpoint::Goal => Endpoint::Start,
        }
    }
}

/// Interactive path session over a grid: endpoints picked from world positions,
/// recomputed lazily whenever something marked it dirty.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    start: NodeIndex,
    goal: NodeIndex,
    pub selecting: Endpoint,
    dirty: bool,
    last: Option<PathResult>,
    elapsed: Duration,
}

impl Default for PathPlanner {
    fn default() -> Self {
        PathPlanner::new(0, 4)
    }
}

impl PathPlanner {
    pub fn new(start: NodeIndex, goal: NodeIndex) -> Self {
        PathPlanner {
            start,
            goal,
            selecting: Endpoint::Start,
            dirty: true,
            last: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn start(&self) -> NodeIndex {
        self.start
    }

    pub fn goal(&self) -> NodeIndex {
        self.goal
    }

    pub fn set_endpoint(&mut self, endpoint: Endpoint, node: NodeIndex) {
        match endpoint {
            Endpoint::Start => self.start = node,
            Endpoint::Goal => self.goal = node,
        }
        self.dirty = true;
    }

    /// Moves the currently selected endpoint to the node under `position`.
    /// Picks outside the grid are ignored.
    pub fn select_at(&mut self, grid: &GridGraph, position: Vec2) -> Option<NodeIndex> {
        let node = grid.node_from_world_pos(position)?;
        self.set_endpoint(self.selecting, node);
        Some(node)
    }

    /// Call after editing the grid, or after changing the algorithm or heuristic.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reruns the search if anything changed since the last run.
    ///
    /// Algorithm and heuristic are read from `options` on every call. A failed
    /// search clears the last result and is not retried until marked dirty again.
    pub fn update(&mut self, grid: &GridGraph, options: &PathOptions) -> Result<Option<&PathResult>, GraphError> {
        if !self.dirty {
            return Ok(self.last.as_ref());
        }
        self.dirty = false;
        self.last = None;

        let started = Instant::now();
        let result = options
            .algorithm
            .find_path(grid, options.heuristic, self.start, self.goal)
            .map_err(|e| {
                warn!("path {} -> {} failed: {e}", self.start, self.goal);
                e
            })?;
        self.elapsed = started.elapsed();
        info!(
            "{:?} with {:?}: {} -> {} in {:?}, {} nodes",
            options.algorithm,
            options.heuristic,
            self.start,
            self.goal,
            self.elapsed,
            result.path.len()
        );

        self.last = Some(result);
        Ok(self.last.as_ref())
    }

    pub fn last_result(&self) -> Option<&PathResult> {
        self.last.as_ref()
    }

    pub fn last_elapsed(&self) -> Duration {
        self.elapsed
    }
}
