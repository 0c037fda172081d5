use glam::Vec2;

use super::Neighbourhood;
use crate::agent::Agent;

// a tracker answers radius queries over agents it does not own, agents are
// referred to by their index in the slice handed to every query

pub trait Tracker {
    /// Fills `out` with the ids of agents strictly closer than `radius` to
    /// `position`, skipping agents sitting exactly on `position`.
    fn register_neighbours<A: Agent>(&self, agents: &[A], position: Vec2, radius: f32, out: &mut Neighbourhood);
}

#[inline]
pub(crate) fn is_neighbour(candidate: Vec2, position: Vec2, radius_sq: f32) -> bool {
    candidate != position && candidate.distance_squared(position) < radius_sq
}

/// O(n) scan over every agent, the reference the partitioned trackers must agree with.
#[derive(Debug, Default, Clone, Copy)]
pub struct BruteForce;

impl Tracker for BruteForce {
    fn register_neighbours<A: Agent>(&self, agents: &[A], position: Vec2, radius: f32, out: &mut Neighbourhood) {
        out.clear();
        let radius_sq = radius * radius;
        agents
            .iter()
            .enumerate()
            .filter(|(_, a)| is_neighbour(a.position(), position, radius_sq))
            .for_each(|(id, _)| out.push(id));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{BruteForce, Tracker};
    use crate::agent::SteeringAgent;
    use crate::flock::Neighbourhood;

    #[test]
    fn finds_within_radius_and_skips_self() {
        let agents: Vec<SteeringAgent> = [Vec2::ZERO, Vec2::new(5., 5.), Vec2::new(-3., 0.)]
            .into_iter()
            .enumerate()
            .map(|(id, p)| SteeringAgent::new(id, p))
            .collect();
        let mut out = Neighbourhood::default();

        BruteForce.register_neighbours(&agents, Vec2::ZERO, 10., &mut out);
        assert_eq!(out.members(), &[1, 2]);

        BruteForce.register_neighbours(&agents, Vec2::ZERO, 3., &mut out);
        assert!(out.is_empty());
    }
}
