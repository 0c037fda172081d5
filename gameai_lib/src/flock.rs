use std::f32::consts::TAU;

use glam::Vec2;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::agent::SteeringAgent;
use crate::error::ConfigError;
use crate::options::RunOptions;
use crate::steering::{self, SteeringInput};

mod cell_space;
mod neighbourhood;
pub mod tracker;

pub use cell_space::{Cell, CellSpace, CellSpaceSettings, Rect};
pub use neighbourhood::Neighbourhood;
use tracker::{BruteForce, Tracker};

/// Per-agent debug data refreshed every tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AgentMetadata {
    pub n_neighbours: usize,
    pub cell: usize,
    /// whether the agent is in the focused agent's neighbourhood
    pub focused_neighbour: bool,
}

/// Owns a group of steering agents and the cell space indexing them.
///
/// Agent ids equal their index in [`Flock::agents`] at all times.
pub struct Flock {
    agents: Vec<SteeringAgent>,
    // position each agent was indexed at in the cell space
    old_positions: Vec<Vec2>,
    wander_angles: Vec<f32>,
    desired: Vec<Vec2>,
    metadata: Vec<AgentMetadata>,
    cell_space: CellSpace,
    neighbourhood: Neighbourhood,
    focused: Option<usize>,
    focused_neighbourhood: Neighbourhood,
    rng: Xoshiro256PlusPlus,
    tick: u64,
}

impl Flock {
    pub fn new(run_options: &RunOptions) -> Result<Self, ConfigError> {
        run_options.validate()?;
        let settings = CellSpaceSettings::new(
            run_options.world_size,
            run_options.world_size,
            run_options.cell_rows,
            run_options.cell_cols,
        )?;
        let cell_space = CellSpace::new(settings, run_options.flock_size);
        let rng = match run_options.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let mut flock = Flock {
            agents: Vec::with_capacity(run_options.flock_size),
            old_positions: Vec::with_capacity(run_options.flock_size),
            wander_angles: Vec::with_capacity(run_options.flock_size),
            desired: Vec::with_capacity(run_options.flock_size),
            metadata: Vec::with_capacity(run_options.flock_size),
            neighbourhood: cell_space.neighbourhood(),
            focused_neighbourhood: cell_space.neighbourhood(),
            cell_space,
            focused: None,
            rng,
            tick: 0,
        };

        let w = run_options.world_size;
        for _ in 0..run_options.flock_size {
            let position = Vec2::new(flock.rng.gen_range(-w..w), flock.rng.gen_range(-w..w));
            flock.insert_agent(position, run_options);
        }
        flock.focused = flock.focused_index(run_options);

        debug!(
            "flock of {} agents over {}x{} cells",
            flock.agents.len(),
            run_options.cell_cols,
            run_options.cell_rows
        );
        Ok(flock)
    }

    /// Advances the flock by `dt` seconds, seeking `target` when there is one.
    pub fn update(&mut self, run_options: &RunOptions, dt: f32, target: Option<Vec2>) {
        // cell membership first, every query below sees this tick's positions
        for (id, agent) in self.agents.iter().enumerate() {
            self.cell_space
                .update_agent_cell(id, self.old_positions[id], agent.position);
            self.old_positions[id] = agent.position;
        }

        self.focused = self.focused_index(run_options);
        self.focused_neighbourhood.clear();

        // calculation loop
        for id in 0..self.agents.len() {
            let position = self.agents[id].position;
            if run_options.use_partitioning {
                self.cell_space.register_neighbours(
                    &self.agents,
                    position,
                    run_options.neighbourhood_radius,
                    &mut self.neighbourhood,
                );
            } else {
                BruteForce.register_neighbours(
                    &self.agents,
                    position,
                    run_options.neighbourhood_radius,
                    &mut self.neighbourhood,
                );
            }

            let input = SteeringInput {
                neighbours: &self.neighbourhood,
                agents: &self.agents,
                target,
            };
            self.desired[id] = steering::blended(
                &self.agents[id],
                &input,
                &mut self.wander_angles[id],
                run_options,
                &mut self.rng,
            );

            self.metadata[id] = AgentMetadata {
                n_neighbours: self.neighbourhood.len(),
                cell: self.cell_space.position_to_index(position),
                focused_neighbour: false,
            };
            if self.focused == Some(id) {
                self.focused_neighbourhood.clone_from(&self.neighbourhood);
            }
        }
        for &id in self.focused_neighbourhood.members() {
            self.metadata[id].focused_neighbour = true;
        }

        // update loop
        for (agent, &desired) in self.agents.iter_mut().zip(self.desired.iter()) {
            agent.integrate(desired, dt);
            agent.trim_to_world(run_options.world_size);
        }

        self.tick += 1;
    }

    /// Neighbours of agent `id` at its current position, `None` for an unknown id.
    pub fn neighbours_of(&self, id: usize, run_options: &RunOptions) -> Option<Neighbourhood> {
        let position = self.agents.get(id)?.position;
        let mut neighbourhood = self.cell_space.neighbourhood();
        BruteForce.register_neighbours(
            &self.agents,
            position,
            run_options.neighbourhood_radius,
            &mut neighbourhood,
        );
        Some(neighbourhood)
    }

    /// Adds an agent with a random heading, returns its id.
    pub fn insert_agent(&mut self, position: Vec2, run_options: &RunOptions) -> usize {
        let id = self.agents.len();
        let orientation = self.rng.gen_range(0.0..TAU);
        let mut agent = SteeringAgent::from_options(id, position, orientation, run_options);
        agent.velocity = agent.heading() * self.rng.gen_range(0.0..=agent.max_linear_speed);

        self.cell_space.add_agent(id, position);
        self.agents.push(agent);
        self.old_positions.push(position);
        self.wander_angles.push(orientation);
        self.desired.push(Vec2::ZERO);
        self.metadata.push(AgentMetadata::default());
        id
    }

    /// Removes agent `id`, the last agent takes over its id.
    pub fn remove_agent(&mut self, id: usize) -> Option<SteeringAgent> {
        let last = self.agents.len().checked_sub(1)?;
        if id > last {
            return None;
        }

        self.cell_space.remove_agent(id, self.old_positions[id]);
        if id != last {
            self.cell_space.remove_agent(last, self.old_positions[last]);
            self.cell_space.add_agent(id, self.old_positions[last]);
        }

        let removed = self.agents.swap_remove(id);
        self.old_positions.swap_remove(id);
        self.wander_angles.swap_remove(id);
        self.desired.swap_remove(id);
        self.metadata.swap_remove(id);
        if let Some(moved) = self.agents.get_mut(id) {
            moved.id = id;
        }

        // stale ids until the next update
        self.focused_neighbourhood.clear();
        self.metadata.iter_mut().for_each(|m| m.focused_neighbour = false);
        self.focused = None;
        Some(removed)
    }

    pub fn delete_last(&mut self) -> Option<SteeringAgent> {
        let last = self.agents.len().checked_sub(1)?;
        self.remove_agent(last)
    }

    pub fn agents(&self) -> &[SteeringAgent] {
        &self.agents
    }

    pub fn metadata(&self) -> &[AgentMetadata] {
        &self.metadata
    }

    /// Agent whose neighbourhood the last update kept.
    pub fn focused_agent(&self) -> Option<usize> {
        self.focused
    }

    pub fn focused_neighbourhood(&self) -> &Neighbourhood {
        &self.focused_neighbourhood
    }

    pub fn cell_space(&self) -> &CellSpace {
        &self.cell_space
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn focused_index(&self, run_options: &RunOptions) -> Option<usize> {
        let n = self.agents.len();
        run_options
            .focused_agent
            .filter(|&id| id < n)
            .or_else(|| n.checked_sub(1))
    }
}
