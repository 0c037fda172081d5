use log::{debug, trace};

use super::records::{backtrack, relax, ClosedList, NodeRecord, OpenList};
use super::{check_endpoints, heuristic_cost, nearest_to_goal, PathFinder, PathResult, SearchOutcome, SearchTrace};
use crate::error::GraphError;
use crate::graph::grid_graph::DIRECTIONS;
use crate::graph::{Connection, GridGraph, NavGraph, NodeIndex};
use crate::heuristic::Heuristic;

type Direction = (isize, isize);

/// Jump point search over a [`GridGraph`].
///
/// Expands jump points instead of single cells: straight and diagonal runs are
/// skipped over until they hit the goal, a dead end, or a cell with a forced
/// neighbour. Costs stay A*-optimal as long as every walkable cell costs the same,
/// so grids carrying [`crate::graph::TerrainType::Mud`] are refused.
///
/// On diagonal grids diagonal moves may cut corners, matching how the grid
/// connects its nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpPointSearch {
    pub heuristic: Heuristic,
}

impl JumpPointSearch {
    pub fn new(heuristic: Heuristic) -> Self {
        JumpPointSearch { heuristic }
    }
}

impl PathFinder<GridGraph> for JumpPointSearch {
    fn find_path(&self, grid: &GridGraph, start: NodeIndex, goal: NodeIndex) -> Result<PathResult, GraphError> {
        check_endpoints(grid, start, goal)?;
        let settings = grid.settings();
        let jumpable_costs = !settings.diagonal
            || (settings.diagonal_cost >= settings.orthogonal_cost
                && settings.diagonal_cost <= 2. * settings.orthogonal_cost);
        if !grid.has_uniform_costs() || !jumpable_costs {
            return Err(GraphError::NonUniformGrid);
        }
        if start == goal {
            return Ok(PathResult::single(start));
        }

        let jumper = Jumper { grid, goal };
        let mut open = OpenList::default();
        let mut closed = ClosedList::new(grid.node_count());
        let mut trace = SearchTrace::default();

        open.push(NodeRecord::start(start, heuristic_cost(grid, self.heuristic, start, goal)?));
        trace.opened.push(start);

        let mut reached = false;
        while let Some(current) = open.pop_cheapest() {
            closed.insert(current);
            trace.closed.push(current.node);
            if current.node == goal {
                reached = true;
                break;
            }

            for direction in jumper.prune(&current)? {
                let Some((jump_point, cost)) = jumper.jump(current.node, direction)? else {
                    continue;
                };
                trace!("jump {} -> {jump_point} along {direction:?}", current.node);
                let cost_so_far = current.cost_so_far + cost;
                let h = heuristic_cost(grid, self.heuristic, jump_point, goal)?;
                let candidate = NodeRecord {
                    node: jump_point,
                    connection: Some(Connection::new(current.node, jump_point, cost)),
                    cost_so_far,
                    estimated_total_cost: cost_so_far + h,
                };
                if relax(&mut open, &mut closed, candidate) {
                    trace.opened.push(jump_point);
                }
            }
        }

        let (end, outcome) = if reached {
            (goal, SearchOutcome::Reached)
        } else {
            let nearest = nearest_to_goal(grid, self.heuristic, closed.order().iter().copied(), start, goal)?;
            (nearest, SearchOutcome::Nearest)
        };
        let jump_points = backtrack(&closed, &open, end);
        let path = jumper.expand(&jump_points)?;
        debug!(
            "jps {start} -> {goal}: {:?} via {} jump points, {} cells, {} opened, {} closed",
            outcome,
            jump_points.len(),
            path.len(),
            trace.opened.len(),
            trace.closed.len()
        );
        Ok(PathResult { path, outcome, trace })
    }
}

struct Jumper<'a> {
    grid: &'a GridGraph,
    goal: NodeIndex,
}

impl<'a> Jumper<'a> {
    fn walkable(&self, (col, row): (isize, isize)) -> bool {
        self.grid.is_walkable(col, row)
    }

    fn blocked(&self, cell: (isize, isize)) -> bool {
        !self.walkable(cell)
    }

    /// Directions worth jumping in from `record`'s node, given where it was reached from.
    fn prune(&self, record: &NodeRecord) -> Result<Vec<Direction>, GraphError> {
        let Some(parent) = record.parent() else {
            return Ok(DIRECTIONS
                .iter()
                .copied()
                .filter(|&(dx, dy)| self.grid.allows_diagonals() || dx == 0 || dy == 0)
                .collect());
        };

        let (x, y) = self.grid.coordinates(record.node)?;
        let (px, py) = self.grid.coordinates(parent)?;
        let (dx, dy) = ((x - px).signum(), (y - py).signum());
        let mut directions = Vec::with_capacity(5);

        if self.grid.allows_diagonals() {
            if dx != 0 && dy != 0 {
                directions.extend([(0, dy), (dx, 0), (dx, dy)]);
                if self.blocked((x - dx, y)) {
                    directions.push((-dx, dy));
                }
                if self.blocked((x, y - dy)) {
                    directions.push((dx, -dy));
                }
            } else if dx == 0 {
                directions.push((0, dy));
                for side in [1, -1] {
                    if self.blocked((x + side, y)) {
                        directions.push((side, dy));
                    }
                }
            } else {
                directions.push((dx, 0));
                for side in [1, -1] {
                    if self.blocked((x, y + side)) {
                        directions.push((dx, side));
                    }
                }
            }
        } else if dx != 0 {
            directions.extend([(0, 1), (0, -1), (dx, 0)]);
        } else {
            directions.extend([(1, 0), (-1, 0), (0, dy)]);
        }
        Ok(directions)
    }

    fn has_forced_neighbour(&self, (x, y): (isize, isize), (dx, dy): Direction) -> bool {
        if self.grid.allows_diagonals() {
            if dx != 0 && dy != 0 {
                (self.walkable((x - dx, y + dy)) && self.blocked((x - dx, y)))
                    || (self.walkable((x + dx, y - dy)) && self.blocked((x, y - dy)))
            } else if dx != 0 {
                (self.walkable((x + dx, y + 1)) && self.blocked((x, y + 1)))
                    || (self.walkable((x + dx, y - 1)) && self.blocked((x, y - 1)))
            } else {
                (self.walkable((x + 1, y + dy)) && self.blocked((x + 1, y)))
                    || (self.walkable((x - 1, y + dy)) && self.blocked((x - 1, y)))
            }
        } else if dx != 0 {
            (self.walkable((x, y + 1)) && self.blocked((x - dx, y + 1)))
                || (self.walkable((x, y - 1)) && self.blocked((x - dx, y - 1)))
        } else {
            (self.walkable((x + 1, y)) && self.blocked((x + 1, y - dy)))
                || (self.walkable((x - 1, y)) && self.blocked((x - 1, y - dy)))
        }
    }

    /// Walks from `from` along `direction` until a jump point, returning it with
    /// the accumulated connection cost. `None` when the run dead-ends first.
    fn jump(&self, from: NodeIndex, (dx, dy): Direction) -> Result<Option<(NodeIndex, f32)>, GraphError> {
        let (mut x, mut y) = self.grid.coordinates(from)?;
        let mut node = from;
        let mut cost = 0.;

        loop {
            let Some(next) = self.grid.index_at(x + dx, y + dy) else {
                return Ok(None);
            };
            let Some(step) = self.grid.connection(node, next)? else {
                return Ok(None);
            };
            cost += step.cost;
            node = next;
            x += dx;
            y += dy;

            if node == self.goal || self.has_forced_neighbour((x, y), (dx, dy)) {
                return Ok(Some((node, cost)));
            }
            if dx != 0 && dy != 0 {
                if self.jump(node, (dx, 0))?.is_some() || self.jump(node, (0, dy))?.is_some() {
                    return Ok(Some((node, cost)));
                }
            } else if dy != 0 && !self.grid.allows_diagonals() {
                if self.jump(node, (1, 0))?.is_some() || self.jump(node, (-1, 0))?.is_some() {
                    return Ok(Some((node, cost)));
                }
            }
        }
    }

    /// Fills in the cells each straight or diagonal jump segment passes over.
    fn expand(&self, jump_points: &[NodeIndex]) -> Result<Vec<NodeIndex>, GraphError> {
        let mut path = Vec::with_capacity(jump_points.len());
        if let Some(&first) = jump_points.first() {
            path.push(first);
        }
        for segment in jump_points.windows(2) {
            let (mut x, mut y) = self.grid.coordinates(segment[0])?;
            let (tx, ty) = self.grid.coordinates(segment[1])?;
            let (dx, dy) = ((tx - x).signum(), (ty - y).signum());
            while (x, y) != (tx, ty) {
                x += dx;
                y += dy;
                let index = self.grid.index_at(x, y).ok_or(GraphError::MissingConnection {
                    from: segment[0],
                    to: segment[1],
                })?;
                path.push(index);
            }
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::JumpPointSearch;
    use crate::error::GraphError;
    use crate::graph::{path_cost, NavGraph, TerrainType};
    use crate::heuristic::Heuristic;
    use crate::pathfinding::test_grids::{assert_valid_path, dijkstra, from_ascii, open_grid, scattered};
    use crate::pathfinding::{AStar, PathFinder, SearchOutcome};

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f32)
        };
    }

    #[test]
    fn diagonal_run_is_a_single_jump() {
        let grid = open_grid(10, 10, true, 1.4);
        let result = JumpPointSearch::new(Heuristic::Chebyshev).find_path(&grid, 0, 99).unwrap();
        assert_eq!(result.path.len(), 10);
        assert_valid_path(&grid, &result.path, 0, 99);
        assert_eq!(result.trace.closed, vec![0, 99]);
    }

    #[test]
    fn straight_run_expands_every_cell() {
        let grid = open_grid(8, 1, true, 1.5);
        let result = JumpPointSearch::default().find_path(&grid, 0, 7).unwrap();
        assert_eq!(result.path, (0..8).collect::<Vec<_>>());
    }

    #[rstest]
    #[case(true, Heuristic::Chebyshev)]
    #[case(true, Heuristic::Octile)]
    #[case(false, Heuristic::Manhattan)]
    fn costs_match_a_star_on_scattered_grids(#[case] diagonal: bool, #[case] heuristic: Heuristic) {
        for seed in 0..10 {
            let grid = scattered(18, 14, diagonal, 0.3, seed);
            let start = grid.index_at(1, 1).unwrap();
            let reference = dijkstra(&grid, start);
            for goal in (0..grid.node_count()).step_by(5) {
                let jps = JumpPointSearch::new(heuristic).find_path(&grid, start, goal).unwrap();
                let astar = AStar::new(Heuristic::Chebyshev).find_path(&grid, start, goal).unwrap();
                assert_eq!(jps.outcome, astar.outcome, "seed {seed} goal {goal}");
                if jps.is_reached() {
                    assert_valid_path(&grid, &jps.path, start, goal);
                    let cost = path_cost(&grid, &jps.path).unwrap();
                    assert_eqf32!(cost, reference[goal]);
                    assert_eqf32!(cost, path_cost(&grid, &astar.path).unwrap());
                }
            }
        }
    }

    #[test]
    fn squeezes_through_a_gap() {
        let grid = from_ascii(
            "
            ....#....
            ....#....
            .........
            ....#....
            ....#....
            ",
            true,
        );
        let start = grid.index_at(0, 4).unwrap();
        let goal = grid.index_at(8, 0).unwrap();
        let result = JumpPointSearch::new(Heuristic::Octile).find_path(&grid, start, goal).unwrap();
        assert_eq!(result.outcome, SearchOutcome::Reached);
        assert_valid_path(&grid, &result.path, start, goal);
        assert!(result.path.contains(&grid.index_at(4, 2).unwrap()));
        // four diagonal and four straight steps
        assert_eqf32!(path_cost(&grid, &result.path).unwrap(), 10.);
    }

    #[test]
    fn unreachable_goal_ends_on_a_closed_jump_point() {
        let grid = from_ascii(
            "
            ...#...
            ...#...
            ...#...
            ",
            true,
        );
        let start = grid.index_at(0, 1).unwrap();
        let goal = grid.index_at(6, 1).unwrap();
        let result = JumpPointSearch::new(Heuristic::Chebyshev).find_path(&grid, start, goal).unwrap();
        assert_eq!(result.outcome, SearchOutcome::Nearest);
        let end = result.last().unwrap();
        assert!(result.trace.closed.contains(&end));
        assert_ne!(end, goal);
        assert_valid_path(&grid, &result.path, start, end);
    }

    #[test]
    fn weighted_terrain_is_refused() {
        let mut grid = open_grid(4, 4, true, 1.5);
        grid.set_terrain(5, TerrainType::Mud).unwrap();
        assert_eq!(
            JumpPointSearch::default().find_path(&grid, 0, 15),
            Err(GraphError::NonUniformGrid)
        );
    }
}
