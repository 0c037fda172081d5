use error::ConfigError;
use flock::Flock;
use observer::{AgentSample, FlockObserver};
use options::RunOptions;

pub mod agent;
pub mod error;
pub mod flock;
pub mod graph;
pub mod heuristic;
pub mod pathfinding;
pub mod steering;

pub mod math_helpers;
pub mod observer;
pub mod options;

/// Fixed step used by headless runs, one frame at 60 fps.
pub const HEADLESS_DT: f32 = 1. / 60.;

/// Runs a flock for `no_iter` ticks without a target and returns what the
/// observer sampled.
pub fn flock_base(no_iter: u64, run_options: &RunOptions) -> Result<Vec<AgentSample>, ConfigError> {
    let mut flock = Flock::new(run_options)?;
    let mut observer = FlockObserver::new(run_options.sample_rate);

    (0..no_iter).for_each(|_| {
        flock.update(run_options, HEADLESS_DT, None);
        observer.watch(&flock);
    });

    Ok(observer.pop_data())
}

#[cfg(test)]
mod tests {
    use super::flock_base;
    use crate::options::RunOptions;

    #[test]
    fn headless_run_samples_every_agent() {
        let options = RunOptions {
            flock_size: 30,
            sample_rate: 5,
            seed: Some(9),
            ..Default::default()
        };
        let data = flock_base(20, &options).unwrap();
        assert_eq!(data.len(), 4 * 30);
        assert!(data.iter().all(|s| s.time >= 1 && s.time <= 4));
        assert_eq!(data, flock_base(20, &options).unwrap());
    }

    #[test]
    fn headless_run_rejects_bad_options() {
        let options = RunOptions {
            world_size: 0.,
            ..Default::default()
        };
        assert!(flock_base(1, &options).is_err());
    }
}
