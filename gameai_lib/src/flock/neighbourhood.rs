use glam::Vec2;

use crate::agent::Agent;

/// Agent ids found by a single neighbour query.
///
/// Owned by whoever asks, every query starts by clearing it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Neighbourhood {
    members: Vec<usize>,
}

impl Neighbourhood {
    pub fn with_capacity(capacity: usize) -> Self {
        Neighbourhood {
            members: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn push(&mut self, id: usize) {
        self.members.push(id);
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.members.contains(&id)
    }

    pub fn iter<'a, A: Agent>(&'a self, agents: &'a [A]) -> impl Iterator<Item = &'a A> + 'a {
        self.members.iter().map(move |&id| &agents[id])
    }

    /// Mean position of the neighbours.
    ///
    /// # Panics
    ///
    /// Panics when the neighbourhood is empty, use [`Self::try_average_position`]
    /// when that can happen.
    pub fn average_position<A: Agent>(&self, agents: &[A]) -> Vec2 {
        match self.try_average_position(agents) {
            Some(average) => average,
            None => panic!("average neighbour position of an empty neighbourhood"),
        }
    }

    pub fn try_average_position<A: Agent>(&self, agents: &[A]) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        let total = self.iter(agents).fold(Vec2::ZERO, |acc, a| acc + a.position());
        Some(total / self.len() as f32)
    }

    /// Mean velocity of the neighbours, zero for an empty neighbourhood.
    pub fn average_velocity<A: Agent>(&self, agents: &[A]) -> Vec2 {
        if self.is_empty() {
            return Vec2::ZERO;
        }
        let total = self.iter(agents).fold(Vec2::ZERO, |acc, a| acc + a.velocity());
        total / self.len() as f32
    }
}
