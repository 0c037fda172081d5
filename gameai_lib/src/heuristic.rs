use std::f32::consts::SQRT_2;

use serde::{Deserialize, Serialize};

/// Distance estimates used to rank open-list records.
///
/// All variants take the absolute axis deltas between two nodes. On a grid the
/// deltas are measured in cells, see [`crate::graph::NavGraph::heuristic_span`].
///
/// Admissibility depends on the connection costs:
/// - `Chebyshev` never overestimates while orthogonal and diagonal steps cost at least 1
/// - `Octile` needs diagonal steps to cost at least √2
/// - `Euclidean` needs diagonal steps to cost at least √2
/// - `Manhattan` only holds on 4-connected grids
/// - `SquaredEuclidean` is not admissible beyond a single step and trades optimality for speed
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "Octile"}
pub enum Heuristic {
    Manhattan,
    Euclidean,
    SquaredEuclidean,
    Octile,
    #[default]
    Chebyshev,
}

impl Heuristic {
    pub const ALL: [Heuristic; 5] = [
        Heuristic::Manhattan,
        Heuristic::Euclidean,
        Heuristic::SquaredEuclidean,
        Heuristic::Octile,
        Heuristic::Chebyshev,
    ];

    #[inline]
    pub fn cost(&self, dx: f32, dy: f32) -> f32 {
        let (dx, dy) = (dx.abs(), dy.abs());
        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Euclidean => (dx * dx + dy * dy).sqrt(),
            Heuristic::SquaredEuclidean => dx * dx + dy * dy,
            Heuristic::Octile => {
                // straight moves for the difference, diagonal moves for the overlap
                let f = SQRT_2 - 1.;
                if dx < dy {
                    f * dx + dy
                } else {
                    f * dy + dx
                }
            }
            Heuristic::Chebyshev => dx.max(dy),
        }
    }
}
