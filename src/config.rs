//! Configuration parameters for the tabu search.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Candidate selection policy for one tabu iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Scan all admissible candidates and pick the minimum delta-cost,
    /// ties broken by generation order.
    BestImprovement,
    /// Pick the first candidate that improves the current cost, falling
    /// back to the best admissible candidate when none improves.
    FirstImprovement,
}

/// Configuration settings for the SD-VRP tabu search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hard cap on search iterations
    pub max_iterations: u64,
    /// Optional wall-clock budget for the search
    pub time_limit: Option<Duration>,
    /// Iterations without improvement to best before diversification
    pub stagnation_threshold: u32,
    /// Lower tabu tenure bound (iterations)
    pub tenure_min: u64,
    /// Upper tabu tenure bound, approached as stagnation grows
    pub tenure_max: u64,
    /// Number of nearest neighbors considered per customer when
    /// enumerating cross-route candidates
    pub granularity: usize,
    /// Candidate selection policy
    pub policy: SelectionPolicy,
    /// Number of randomized perturbations applied per diversification
    pub diversification_strength: usize,
    /// Seed for the search's random source
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_iterations: 10_000,
            time_limit: None,
            stagnation_threshold: 50,
            tenure_min: 8,
            tenure_max: 20,
            granularity: 20,
            policy: SelectionPolicy::BestImprovement,
            diversification_strength: 6,
            seed: 0,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the wall-clock budget.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Set the stagnation threshold.
    pub fn with_stagnation_threshold(mut self, iterations: u32) -> Self {
        self.stagnation_threshold = iterations;
        self
    }

    /// Set the tabu tenure bounds.
    pub fn with_tenure_range(mut self, min: u64, max: u64) -> Self {
        self.tenure_min = min;
        self.tenure_max = max.max(min);
        self
    }

    /// Set the granularity parameter.
    pub fn with_granularity(mut self, g: usize) -> Self {
        self.granularity = g;
        self
    }

    /// Set the candidate selection policy.
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the diversification batch size.
    pub fn with_diversification_strength(mut self, moves: usize) -> Self {
        self.diversification_strength = moves;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
