use glam::Vec2;
use itertools::Itertools;
use log::{trace, warn};

use super::tracker::{is_neighbour, Tracker};
use super::Neighbourhood;
use crate::agent::Agent;
use crate::error::ConfigError;
use crate::math_helpers::wrap_index;

/// Uniform grid over a world centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSpaceSettings {
    /// environment x half range
    pub half_width: f32,
    /// environment y half range
    pub half_height: f32,
    /// grid y range
    pub rows: usize,
    /// grid x range
    pub cols: usize,
    /// environment x units per grid x cell
    pub cell_width: f32,
    /// environment y units per grid y cell
    pub cell_height: f32,
}

impl CellSpaceSettings {
    pub fn new(half_width: f32, half_height: f32, rows: usize, cols: usize) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::InvalidDimensions { columns: cols, rows });
        }
        for (name, value) in [("half_width", half_width), ("half_height", half_height)] {
            if !(value > 0. && value.is_finite()) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        Ok(CellSpaceSettings {
            half_width,
            half_height,
            rows,
            cols,
            cell_width: 2. * half_width / cols as f32,
            cell_height: 2. * half_height / rows as f32,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Unwrapped column and row of `position`, may fall outside the grid.
    fn raw_coordinates(&self, position: Vec2) -> (i64, i64) {
        (
            ((position.x + self.half_width) / self.cell_width).floor() as i64,
            ((position.y + self.half_height) / self.cell_height).floor() as i64,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub bottom_left: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// bottom left, top left, top right, bottom right
    pub fn corners(&self) -> [Vec2; 4] {
        let Rect {
            bottom_left: bl,
            width,
            height,
        } = *self;
        [
            bl,
            bl + Vec2::new(0., height),
            bl + Vec2::new(width, height),
            bl + Vec2::new(width, 0.),
        ]
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let top_right = self.bottom_left + Vec2::new(self.width, self.height);
        point.x >= self.bottom_left.x && point.y >= self.bottom_left.y && point.x < top_right.x && point.y < top_right.y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub bounds: Rect,
    agents: Vec<usize>,
}

impl Cell {
    pub fn agents(&self) -> &[usize] {
        &self.agents
    }
}

/// Spatial index bucketing agent ids into static cells.
///
/// Cells are laid out column-major, cell `col * rows + row`. Positions outside
/// the world wrap around to the opposite side, so every position maps to a cell.
/// The index stores ids only, agents themselves stay with the caller and are
/// handed to every query.
#[derive(Debug, Clone)]
pub struct CellSpace {
    settings: CellSpaceSettings,
    cells: Vec<Cell>,
    capacity: usize,
}

impl CellSpace {
    pub fn new(settings: CellSpaceSettings, max_agents: usize) -> Self {
        let CellSpaceSettings {
            half_width,
            half_height,
            rows,
            cols,
            cell_width,
            cell_height,
        } = settings;

        let cells = (0..cols)
            .cartesian_product(0..rows)
            .map(|(col, row)| Cell {
                bounds: Rect {
                    bottom_left: Vec2::new(
                        -half_width + cell_width * col as f32,
                        -half_height + cell_height * row as f32,
                    ),
                    width: cell_width,
                    height: cell_height,
                },
                agents: Vec::new(),
            })
            .collect();

        CellSpace {
            settings,
            cells,
            capacity: max_agents,
        }
    }

    pub fn settings(&self) -> &CellSpaceSettings {
        &self.settings
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell rectangles with their agent counts, for partition overlays.
    pub fn cell_counts(&self) -> impl Iterator<Item = (Rect, usize)> + '_ {
        self.cells.iter().map(|c| (c.bounds, c.agents.len()))
    }

    /// Buffer sized for the largest neighbourhood this space was built for.
    pub fn neighbourhood(&self) -> Neighbourhood {
        Neighbourhood::with_capacity(self.capacity)
    }

    pub fn position_to_index(&self, position: Vec2) -> usize {
        let (col, row) = self.settings.raw_coordinates(position);
        self.index(col, row)
    }

    fn index(&self, col: i64, row: i64) -> usize {
        wrap_index(col, self.settings.cols) * self.settings.rows + wrap_index(row, self.settings.rows)
    }

    pub fn add_agent(&mut self, id: usize, position: Vec2) {
        let index = self.position_to_index(position);
        self.cells[index].agents.push(id);
    }

    /// Removes `id` from the cell `position` maps to, returns whether it was there.
    pub fn remove_agent(&mut self, id: usize, position: Vec2) -> bool {
        let index = self.position_to_index(position);
        let agents = &mut self.cells[index].agents;
        match agents.iter().position(|&a| a == id) {
            Some(i) => {
                agents.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Moves `id` if its cell changed between `old_position` and `position`.
    /// Returns whether it moved.
    pub fn update_agent_cell(&mut self, id: usize, old_position: Vec2, position: Vec2) -> bool {
        let from = self.position_to_index(old_position);
        let to = self.position_to_index(position);
        if from == to {
            return false;
        }
        let Some(i) = self.cells[from].agents.iter().position(|&a| a == id) else {
            warn!("agent {id} is not indexed in cell {from}, leaving it in place");
            return false;
        };
        trace!("agent {id} moves from cell {from} to {to}");
        self.cells[from].agents.swap_remove(i);
        self.cells[to].agents.push(id);
        true
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| c.agents.clear());
    }

    /// Wrapped first column and row of the window covering `[p - radius, p + radius]`,
    /// with spans capped at the grid extent so wrapping never visits a cell twice.
    fn query_window(&self, position: Vec2, radius: f32) -> ((usize, usize), (usize, usize)) {
        let (c0, r0) = self.settings.raw_coordinates(position - Vec2::splat(radius));
        let (c1, r1) = self.settings.raw_coordinates(position + Vec2::splat(radius));
        // coordinates saturate for huge positions or radii
        let span = |lo: i64, hi: i64, count: usize| {
            hi.saturating_sub(lo).saturating_add(1).clamp(0, count as i64) as usize
        };
        (
            (wrap_index(c0, self.settings.cols), span(c0, c1, self.settings.cols)),
            (wrap_index(r0, self.settings.rows), span(r0, r1, self.settings.rows)),
        )
    }
}

impl Tracker for CellSpace {
    fn register_neighbours<A: Agent>(&self, agents: &[A], position: Vec2, radius: f32, out: &mut Neighbourhood) {
        out.clear();
        let radius_sq = radius * radius;
        let ((c0, cols), (r0, rows)) = self.query_window(position, radius);

        let (n_cols, n_rows) = (self.settings.cols, self.settings.rows);

        for (k, l) in (0..cols).cartesian_product(0..rows) {
            let index = (c0 + k) % n_cols * n_rows + (r0 + l) % n_rows;
            for &id in &self.cells[index].agents {
                if is_neighbour(agents[id].position(), position, radius_sq) {
                    out.push(id);
                }
            }
        }
    }
}
