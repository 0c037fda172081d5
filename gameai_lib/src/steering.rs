use glam::Vec2;
use rand::Rng;

use crate::agent::{Agent, SteeringAgent};
use crate::flock::Neighbourhood;
use crate::math_helpers::normalize_or_zero;
use crate::options::{BehaviourWeights, RunOptions, WanderOptions};

// every behaviour returns a desired linear velocity, the agent integrates
// towards the weighted sum of them

/// Full speed towards `target`.
pub fn seek(agent: &SteeringAgent, target: Vec2) -> Vec2 {
    normalize_or_zero(target - agent.position) * agent.max_linear_speed
}

/// Seeks a point on a circle held `offset` ahead of the agent, the point
/// drifting by a random angle every call.
pub fn wander<R: Rng>(agent: &SteeringAgent, wander_angle: &mut f32, options: &WanderOptions, rng: &mut R) -> Vec2 {
    let circle = agent.position + agent.heading() * options.offset;

    let change = options.angle_change.abs();
    *wander_angle += rng.gen_range(-change..=change);

    let target = circle + Vec2::new(wander_angle.cos(), wander_angle.sin()) * options.radius;
    seek(agent, target)
}

/// Pushes away from every neighbour with an inverse-square falloff, each push
/// capped at the agent's max speed.
pub fn separation<A: Agent>(agent: &SteeringAgent, neighbours: &Neighbourhood, agents: &[A], decay: f32) -> Vec2 {
    neighbours.iter(agents).fold(Vec2::ZERO, |acc, other| {
        let away = agent.position - other.position();
        let distance_sq = away.length_squared();
        if distance_sq <= f32::EPSILON {
            return acc;
        }
        let strength = (decay / distance_sq).min(agent.max_linear_speed);
        acc + normalize_or_zero(away) * strength
    })
}

/// Full speed towards the neighbours' centre, nothing without neighbours.
pub fn cohesion<A: Agent>(agent: &SteeringAgent, neighbours: &Neighbourhood, agents: &[A]) -> Vec2 {
    match neighbours.try_average_position(agents) {
        Some(centre) => seek(agent, centre),
        None => Vec2::ZERO,
    }
}

pub fn alignment<A: Agent>(neighbours: &Neighbourhood, agents: &[A]) -> Vec2 {
    neighbours.average_velocity(agents)
}

/// Per-tick inputs of [`blended`] that are not part of the agent.
pub struct SteeringInput<'a, A: Agent> {
    pub neighbours: &'a Neighbourhood,
    pub agents: &'a [A],
    pub target: Option<Vec2>,
}

/// Weighted sum of all behaviours. Seek contributes only while there is a target.
pub fn blended<A: Agent, R: Rng>(
    agent: &SteeringAgent,
    input: &SteeringInput<A>,
    wander_angle: &mut f32,
    run_options: &RunOptions,
    rng: &mut R,
) -> Vec2 {
    let BehaviourWeights {
        seek: w_seek,
        wander: w_wander,
        cohesion: w_cohesion,
        separation: w_separation,
        alignment: w_alignment,
    } = run_options.weights;

    let mut desired = Vec2::ZERO;
    if let Some(target) = input.target {
        desired += seek(agent, target) * w_seek;
    }
    desired += wander(agent, wander_angle, &run_options.wander, rng) * w_wander;
    desired += cohesion(agent, input.neighbours, input.agents) * w_cohesion;
    desired += separation(agent, input.neighbours, input.agents, run_options.separation_decay) * w_separation;
    desired += alignment(input.neighbours, input.agents) * w_alignment;
    desired
}
