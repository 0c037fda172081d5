use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::GridSettings;
use crate::heuristic::Heuristic;
use crate::pathfinding::Algorithm;

/// Flock run options. Every field has a default, so option files only need the
/// values they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub flock_size: usize,
    /// Half of the world's side, the world spans `[-world_size, world_size)` on both axes.
    pub world_size: f32,
    pub cell_rows: usize,
    pub cell_cols: usize,
    pub neighbourhood_radius: f32,
    pub use_partitioning: bool,

    pub max_linear_speed: f32,
    pub mass: f32,
    pub agent_radius: f32,
    pub boundary: Boundary,

    pub weights: BehaviourWeights,
    pub wander: WanderOptions,
    /// Numerator of separation's inverse-square falloff.
    pub separation_decay: f32,

    /// Fixed seed for reproducible runs, entropy when `None`.
    pub seed: Option<u64>,
    pub sample_rate: u64,
    /// Agent whose neighbourhood is kept for debug overlays, the last agent when `None`.
    pub focused_agent: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        let flock_size = 50;
        let world_size = 100.;

        RunOptions {
            flock_size,
            world_size,
            cell_rows: 25,
            cell_cols: 25,
            neighbourhood_radius: 15.,
            use_partitioning: true,
            max_linear_speed: 20.,
            mass: 1.,
            agent_radius: 1.,
            boundary: Boundary::Toroidal,
            weights: BehaviourWeights::default(),
            wander: WanderOptions::default(),
            separation_decay: 500.,
            seed: None,
            sample_rate: 1,
            focused_agent: None,
        }
    }
}

impl RunOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_rows == 0 || self.cell_cols == 0 {
            return Err(ConfigError::InvalidDimensions {
                columns: self.cell_cols,
                rows: self.cell_rows,
            });
        }
        positive("world_size", self.world_size)?;
        positive("neighbourhood_radius", self.neighbourhood_radius)?;
        positive("max_linear_speed", self.max_linear_speed)?;
        positive("mass", self.mass)?;
        if self.sample_rate == 0 {
            return Err(ConfigError::NotPositive {
                name: "sample_rate",
                value: 0.,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourWeights {
    pub seek: f32,
    pub wander: f32,
    pub cohesion: f32,
    pub separation: f32,
    pub alignment: f32,
}

impl Default for BehaviourWeights {
    fn default() -> Self {
        BehaviourWeights {
            seek: 0.2,
            wander: 0.2,
            cohesion: 0.2,
            separation: 0.2,
            alignment: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderOptions {
    /// distance of the wander circle ahead of the agent
    pub offset: f32,
    pub radius: f32,
    /// max change of the wander angle per tick, radians
    pub angle_change: f32,
}

impl Default for WanderOptions {
    fn default() -> Self {
        WanderOptions {
            offset: 6.,
            radius: 4.,
            angle_change: 45. * PI / 180.,
        }
    }
}

#[derive(Debug, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "Reflective"}
pub enum Boundary {
    /// leaving one edge re-enters through the opposite one
    #[default]
    Toroidal,
    /// stops at the edge, losing the outward velocity
    Absorbing,
    /// bounces back off the edge
    Reflective,
}

/// Options for the grid the path planner works on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    pub grid: GridSettings,
    pub heuristic: Heuristic,
    pub algorithm: Algorithm,
}

impl PathOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()
    }
}

/// Everything a sandbox session reads on start-up.
///
/// ```toml
/// [flock]
/// flock_size = 120
/// boundary = { type = "Reflective" }
///
/// [pathfinding]
/// heuristic = { type = "Octile" }
/// algorithm = { type = "Jps" }
///
/// [pathfinding.grid]
/// columns = 40
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxOptions {
    pub flock: RunOptions,
    pub pathfinding: PathOptions,
}

impl SandboxOptions {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let options: SandboxOptions = toml::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flock.validate()?;
        self.pathfinding.validate()
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0. && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}
