//! Random load balancing strategies.

use rand::seq::SliceRandom;

use crate::error::BalancerResult;
use crate::load_balancer::registry::Registry;
use crate::load_balancer::Selector;
use crate::transport::Transport;

/// Uniform random selector. Stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformRandom;

impl UniformRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Selector for UniformRandom {
    fn select(&self, candidates: &[usize]) -> Option<usize> {
        candidates.choose(&mut rand::thread_rng()).copied()
    }
}

/// Uniform random selection restricted to healthy endpoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthyRandom;

impl HealthyRandom {
    pub fn new() -> Self {
        Self
    }

    /// Pick a healthy endpoint of `registry`, or `None` if none is healthy.
    pub fn select_from<T: Transport>(&self, registry: &Registry<T>) -> BalancerResult<Option<usize>> {
        let healthy = registry.healthy_ids()?;
        Ok(UniformRandom.select(&healthy))
    }
}

impl Selector for HealthyRandom {
    /// Candidates are expected to be pre-filtered to healthy ids.
    fn select(&self, candidates: &[usize]) -> Option<usize> {
        UniformRandom.select(candidates)
    }
}
