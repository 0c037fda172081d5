use std::mem;

use serde::Serialize;

use crate::flock::Flock;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct AgentSample {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub n_neighbours: usize,
    pub cell: usize,
    /// sample number, not the flock tick
    pub time: u64,
}

/// Accumulates agent samples every `sample_rate` watched ticks.
pub struct FlockObserver {
    samples: Vec<AgentSample>,
    ticker: u64,
    sample_rate: u64,
}

impl FlockObserver {
    pub fn new(sample_rate: u64) -> Self {
        FlockObserver {
            samples: Vec::new(),
            ticker: 0,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Triggers data collection
    pub fn watch(&mut self, flock: &Flock) {
        if !self.should_sample() {
            return;
        }

        let time = self.ticker / self.sample_rate;
        self.samples
            .extend(flock.agents().iter().zip(flock.metadata()).map(|(a, m)| AgentSample {
                id: a.id,
                x: a.position.x,
                y: a.position.y,
                vx: a.velocity.x,
                vy: a.velocity.y,
                n_neighbours: m.n_neighbours,
                cell: m.cell,
                time,
            }));
    }

    pub fn restart(&mut self) {
        self.samples.clear();
        self.ticker = 0;
    }

    /// Returns everything sampled so far, leaving the observer empty.
    pub fn pop_data(&mut self) -> Vec<AgentSample> {
        mem::take(&mut self.samples)
    }

    fn should_sample(&mut self) -> bool {
        self.ticker += 1;
        self.ticker % self.sample_rate == 0
    }
}
