use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Connection, NavGraph, Node, NodeIndex};
use crate::error::{ConfigError, GraphError};

/// Outgoing connection order of every grid node, orthogonal first.
pub(crate) const DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TerrainType {
    #[default]
    Ground,
    Mud,
    /// Not walkable, nodes carrying it have no connections.
    Water,
}

impl TerrainType {
    pub fn cost_factor(&self) -> Option<f32> {
        match self {
            TerrainType::Ground => Some(1.),
            TerrainType::Mud => Some(2.),
            TerrainType::Water => None,
        }
    }

    pub fn is_walkable(&self) -> bool {
        self.cost_factor().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub columns: usize,
    pub rows: usize,
    pub cell_size: f32,
    pub diagonal: bool,
    pub orthogonal_cost: f32,
    pub diagonal_cost: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            columns: 20,
            rows: 10,
            cell_size: 15.,
            diagonal: true,
            orthogonal_cost: 1.,
            diagonal_cost: 1.5,
        }
    }
}

impl GridSettings {
    pub fn new(columns: usize, rows: usize, cell_size: f32) -> Self {
        Self {
            columns,
            rows,
            cell_size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::InvalidDimensions {
                columns: self.columns,
                rows: self.rows,
            });
        }
        for (name, value) in [
            ("cell_size", self.cell_size),
            ("orthogonal_cost", self.orthogonal_cost),
            ("diagonal_cost", self.diagonal_cost),
        ] {
            if !(value > 0.) || !value.is_finite() {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        Ok(())
    }
}

/// Rectangular grid of terrain nodes, row-major from the bottom-left corner at the origin.
///
/// Node `row * columns + column` sits at the centre of its cell. Connections are
/// always mirrored and are derived from the terrain of both endpoints, so editing
/// terrain rewires the affected node and its ring of neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGraph {
    settings: GridSettings,
    nodes: Vec<Node>,
    terrain: Vec<TerrainType>,
    connections: Vec<Vec<Connection>>,
}

impl GridGraph {
    pub fn new(settings: GridSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let count = settings.columns * settings.rows;
        let nodes = (0..count)
            .map(|index| {
                let (col, row) = (index % settings.columns, index / settings.columns);
                Node {
                    index,
                    position: Vec2::new(col as f32 + 0.5, row as f32 + 0.5) * settings.cell_size,
                }
            })
            .collect();

        let mut grid = GridGraph {
            settings,
            nodes,
            terrain: vec![TerrainType::Ground; count],
            connections: vec![Vec::new(); count],
        };
        for index in 0..count {
            grid.rebuild_connections(index);
        }
        Ok(grid)
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn columns(&self) -> usize {
        self.settings.columns
    }

    pub fn rows(&self) -> usize {
        self.settings.rows
    }

    pub fn allows_diagonals(&self) -> bool {
        self.settings.diagonal
    }

    /// Node at `(col, row)`, `None` outside the grid.
    pub fn index_at(&self, col: isize, row: isize) -> Option<NodeIndex> {
        let (columns, rows) = (self.settings.columns as isize, self.settings.rows as isize);
        if col < 0 || row < 0 || col >= columns || row >= rows {
            return None;
        }
        Some((row * columns + col) as usize)
    }

    pub fn coordinates(&self, index: NodeIndex) -> Result<(isize, isize), GraphError> {
        self.check_node(index)?;
        let columns = self.settings.columns;
        Ok(((index % columns) as isize, (index / columns) as isize))
    }

    /// Floor division on cell size. Positions outside the grid give `None`.
    pub fn node_from_world_pos(&self, position: Vec2) -> Option<NodeIndex> {
        let cell = (position / self.settings.cell_size).floor();
        if !cell.is_finite() {
            return None;
        }
        self.index_at(cell.x as isize, cell.y as isize)
    }

    pub fn terrain(&self, index: NodeIndex) -> Result<TerrainType, GraphError> {
        self.check_node(index)?;
        Ok(self.terrain[index])
    }

    pub fn is_walkable(&self, col: isize, row: isize) -> bool {
        self.index_at(col, row)
            .map_or(false, |index| self.terrain[index].is_walkable())
    }

    pub fn set_terrain(&mut self, index: NodeIndex, terrain: TerrainType) -> Result<(), GraphError> {
        self.check_node(index)?;
        if self.terrain[index] == terrain {
            return Ok(());
        }
        self.terrain[index] = terrain;

        let (col, row) = self.coordinates(index)?;
        self.rebuild_connections(index);
        for (dx, dy) in DIRECTIONS {
            if let Some(neighbour) = self.index_at(col + dx, row + dy) {
                self.rebuild_connections(neighbour);
            }
        }
        Ok(())
    }

    /// Turns the node into an obstacle, same as painting it with [`TerrainType::Water`].
    pub fn isolate_node(&mut self, index: NodeIndex) -> Result<(), GraphError> {
        self.set_terrain(index, TerrainType::Water)
    }

    /// True when every connection between walkable nodes has its plain base cost.
    pub fn has_uniform_costs(&self) -> bool {
        !self.terrain.contains(&TerrainType::Mud)
    }

    fn rebuild_connections(&mut self, index: NodeIndex) {
        let columns = self.settings.columns;
        let (col, row) = ((index % columns) as isize, (index / columns) as isize);

        let mut outgoing = Vec::with_capacity(8);
        if let Some(factor) = self.terrain[index].cost_factor() {
            for (dx, dy) in DIRECTIONS {
                let diagonal = dx != 0 && dy != 0;
                if diagonal && !self.settings.diagonal {
                    continue;
                }
                let Some(to) = self.index_at(col + dx, row + dy) else {
                    continue;
                };
                let Some(other) = self.terrain[to].cost_factor() else {
                    continue;
                };
                let base = if diagonal {
                    self.settings.diagonal_cost
                } else {
                    self.settings.orthogonal_cost
                };
                outgoing.push(Connection::new(index, to, base * (factor + other) * 0.5));
            }
        }
        self.connections[index] = outgoing;
    }
}

impl NavGraph for GridGraph {
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

    /// Measured in cells, so heuristics stay comparable with per-step costs
    /// whatever the cell size.
    fn heuristic_span(&self, from: NodeIndex, to: NodeIndex) -> Result<Vec2, GraphError> {
        let (fc, fr) = self.coordinates(from)?;
        let (tc, tr) = self.coordinates(to)?;
        Ok(Vec2::new((tc - fc).abs() as f32, (tr - fr).abs() as f32))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;
    use rstest::{fixture, rstest};

    use super::{GridGraph, GridSettings, TerrainType};
    use crate::error::ConfigError;
    use crate::graph::NavGraph;

    #[fixture]
    fn grid() -> GridGraph {
        GridGraph::new(GridSettings::new(3, 3, 10.)).unwrap()
    }

    #[rstest]
    fn nodes_sit_at_cell_centres(grid: GridGraph) {
        assert_eq!(grid.node_count(), 9);
        assert_eq!(grid.node_position(0).unwrap(), Vec2::new(5., 5.));
        assert_eq!(grid.node_position(5).unwrap(), Vec2::new(25., 15.));
        assert_eq!(grid.coordinates(7).unwrap(), (1, 2));
    }

    #[rstest]
    #[case(Vec2::new(0., 0.), Some(0))]
    #[case(Vec2::new(29.9, 0.1), Some(2))]
    #[case(Vec2::new(15., 25.), Some(7))]
    #[case(Vec2::new(30., 5.), None)]
    #[case(Vec2::new(-0.1, 5.), None)]
    fn world_position_maps_to_node(grid: GridGraph, #[case] position: Vec2, #[case] expected: Option<usize>) {
        assert_eq!(grid.node_from_world_pos(position), expected);
    }

    #[rstest]
    fn connection_counts_follow_diagonal_flag(grid: GridGraph) {
        assert_eq!(grid.connections(4).unwrap().len(), 8);
        assert_eq!(grid.connections(0).unwrap().len(), 3);

        let mut settings = GridSettings::new(3, 3, 10.);
        settings.diagonal = false;
        let straight = GridGraph::new(settings).unwrap();
        assert_eq!(straight.connections(4).unwrap().len(), 4);
        assert_eq!(straight.connections(0).unwrap().len(), 2);
    }

    #[rstest]
    fn base_costs_apply(grid: GridGraph) {
        assert_eq!(grid.connection(4, 5).unwrap().unwrap().cost, 1.);
        assert_eq!(grid.connection(4, 8).unwrap().unwrap().cost, 1.5);
        assert!(grid.connection(0, 8).unwrap().is_none());
    }

    #[rstest]
    fn mud_averages_endpoint_factors(mut grid: GridGraph) {
        grid.set_terrain(4, TerrainType::Mud).unwrap();
        assert_relative_eq!(grid.connection(3, 4).unwrap().unwrap().cost, 1.5);
        assert_relative_eq!(grid.connection(4, 0).unwrap().unwrap().cost, 2.25);
        assert!(!grid.has_uniform_costs());
    }

    #[rstest]
    fn water_isolates_and_ground_restores(mut grid: GridGraph) {
        grid.isolate_node(4).unwrap();
        assert!(grid.connections(4).unwrap().is_empty());
        assert!((0..9).all(|n| grid.connection(n, 4).unwrap().is_none()));
        assert!(!grid.is_walkable(1, 1));
        assert!(grid.has_uniform_costs());

        grid.set_terrain(4, TerrainType::Ground).unwrap();
        assert_eq!(grid, GridGraph::new(GridSettings::new(3, 3, 10.)).unwrap());
    }

    #[rstest]
    fn heuristic_span_is_in_cells(grid: GridGraph) {
        assert_eq!(grid.heuristic_span(0, 7).unwrap(), Vec2::new(1., 2.));
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(matches!(
            GridGraph::new(GridSettings::new(0, 4, 1.)),
            Err(ConfigError::InvalidDimensions { columns: 0, rows: 4 })
        ));
        assert!(matches!(
            GridGraph::new(GridSettings::new(4, 4, 0.)),
            Err(ConfigError::NotPositive { name: "cell_size", .. })
        ));
    }
}
