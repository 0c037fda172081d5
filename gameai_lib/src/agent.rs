use glam::Vec2;

use crate::math_helpers::{orientation_to_vector, wrap_component};
use crate::options::{Boundary, RunOptions};

/// What the partitioning layer needs to know about an agent.
pub trait Agent {
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2;
}

/// Kinematic agent driven by a desired velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringAgent {
    // sequential id starting from 0, equal to the agent's index in its flock
    pub id: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    /// radians, follows the velocity while the agent moves
    pub orientation: f32,
    pub max_linear_speed: f32,
    pub mass: f32,
    pub radius: f32,
    pub boundary: Boundary,
}

impl SteeringAgent {
    pub fn new(id: usize, position: Vec2) -> Self {
        SteeringAgent {
            id,
            position,
            velocity: Vec2::ZERO,
            orientation: 0.,
            max_linear_speed: 20.,
            mass: 1.,
            radius: 1.,
            boundary: Boundary::Toroidal,
        }
    }

    pub fn from_options(id: usize, position: Vec2, orientation: f32, run_options: &RunOptions) -> Self {
        SteeringAgent {
            orientation,
            max_linear_speed: run_options.max_linear_speed,
            mass: run_options.mass,
            radius: run_options.agent_radius,
            boundary: run_options.boundary,
            ..SteeringAgent::new(id, position)
        }
    }

    pub fn heading(&self) -> Vec2 {
        orientation_to_vector(self.orientation)
    }

    /// Accelerates towards `desired` with a force of `desired - velocity` scaled by
    /// the inverse mass, then moves.
    pub fn integrate(&mut self, desired: Vec2, dt: f32) {
        let acceleration = (desired - self.velocity) / self.mass;
        self.velocity = (self.velocity + acceleration * dt).clamp_length_max(self.max_linear_speed);
        if !self.velocity.is_finite() {
            self.velocity = Vec2::ZERO;
        }
        self.position += self.velocity * dt;

        if self.velocity.length_squared() > f32::EPSILON {
            self.orientation = self.velocity.y.atan2(self.velocity.x);
        }
    }

    /// Keeps the agent inside `[-half_extent, half_extent)` on both axes.
    pub fn trim_to_world(&mut self, half_extent: f32) {
        match self.boundary {
            Boundary::Toroidal => {
                self.position.x = wrap_component(self.position.x, half_extent);
                self.position.y = wrap_component(self.position.y, half_extent);
            }
            Boundary::Absorbing => {
                if self.position.x.abs() > half_extent {
                    self.position.x = self.position.x.clamp(-half_extent, half_extent);
                    self.velocity.x = 0.;
                }
                if self.position.y.abs() > half_extent {
                    self.position.y = self.position.y.clamp(-half_extent, half_extent);
                    self.velocity.y = 0.;
                }
            }
            Boundary::Reflective => {
                // flip velocity if it is going beyond the edge
                if (self.position.x < -half_extent && self.velocity.x < 0.)
                    || (self.position.x > half_extent && self.velocity.x > 0.)
                {
                    self.velocity.x = -self.velocity.x;
                }
                if (self.position.y < -half_extent && self.velocity.y < 0.)
                    || (self.position.y > half_extent && self.velocity.y > 0.)
                {
                    self.velocity.y = -self.velocity.y;
                }
                self.position = self.position.clamp(Vec2::splat(-half_extent), Vec2::splat(half_extent));
            }
        }
    }
}

impl Agent for SteeringAgent {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;
    use rstest::rstest;

    use super::SteeringAgent;
    use crate::options::Boundary;

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f32)
        };
    }

    #[test]
    fn integration_is_mass_scaled() {
        let mut agent = SteeringAgent::new(0, Vec2::ZERO);
        agent.mass = 2.;
        agent.integrate(Vec2::new(10., 0.), 0.5);
        // a = 10 / 2, v = 5 * 0.5
        assert_eqf32!(agent.velocity.x, 2.5);
        assert_eqf32!(agent.position.x, 1.25);
        assert_eqf32!(agent.orientation, 0.);
    }

    #[test]
    fn speed_is_clamped() {
        let mut agent = SteeringAgent::new(0, Vec2::ZERO);
        agent.integrate(Vec2::new(0., 500.), 1.);
        assert_eqf32!(agent.velocity.length(), 20.);
        assert_eqf32!(agent.orientation, std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn standing_still_keeps_orientation() {
        let mut agent = SteeringAgent::new(0, Vec2::ZERO);
        agent.orientation = 1.;
        agent.integrate(Vec2::ZERO, 0.1);
        assert_eq!(agent.orientation, 1.);
        assert_eq!(agent.position, Vec2::ZERO);
    }

    #[rstest]
    #[case(Boundary::Toroidal, Vec2::new(-98., 50.), Vec2::new(3., 1.))]
    #[case(Boundary::Absorbing, Vec2::new(100., 50.), Vec2::new(0., 1.))]
    #[case(Boundary::Reflective, Vec2::new(100., 50.), Vec2::new(-3., 1.))]
    fn boundary_policies(#[case] boundary: Boundary, #[case] position: Vec2, #[case] velocity: Vec2) {
        let mut agent = SteeringAgent::new(0, Vec2::new(102., 50.));
        agent.velocity = Vec2::new(3., 1.);
        agent.boundary = boundary;
        agent.trim_to_world(100.);
        assert_eqf32!(agent.position.x, position.x);
        assert_eqf32!(agent.position.y, position.y);
        assert_eq!(agent.velocity, velocity);
    }

    #[test]
    fn inside_the_world_nothing_changes() {
        for boundary in [Boundary::Toroidal, Boundary::Absorbing, Boundary::Reflective] {
            let mut agent = SteeringAgent::new(0, Vec2::new(-40., 99.));
            agent.velocity = Vec2::new(-1., 1.);
            agent.boundary = boundary;
            agent.trim_to_world(100.);
            assert_eq!(agent.position, Vec2::new(-40., 99.));
            assert_eq!(agent.velocity, Vec2::new(-1., 1.));
        }
    }
}
