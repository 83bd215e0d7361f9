//! # SD-VRP Tabu Search
//!
//! A Rust implementation of tabu search for the Split Delivery Vehicle
//! Routing Problem (SD-VRP): a fleet of capacity-limited vehicles serves
//! customers whose demand may be split across several visits.
//!
//! The solver builds a greedy initial solution, then walks the solution
//! space with four feasibility-preserving move families (relocate, split,
//! merge, exchange) under tabu-list control with aspiration and
//! stagnation-triggered diversification. It returns the best feasible
//! solution found within the iteration or wall-clock budget.

pub mod config;
pub mod construction;
pub mod error;
pub mod moves;
pub mod problem;
pub mod solution;
pub mod tabu;
pub mod utils;

use crate::config::Config;
use crate::error::SolverError;
use crate::moves::MoveGenerator;
use crate::problem::Problem;
use crate::solution::Solution;
use crate::tabu::{SearchState, TabuController};
use crate::utils::{SearchStatistics, TerminationReason};

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// The main structure that orchestrates one tabu search run.
///
/// Each value owns its full search state, so independent solves can run
/// concurrently without sharing anything.
pub struct TabuSearch {
    pub problem: Problem,
    pub config: Config,
    pub best_solution: Option<Solution>,
    pub stats: Option<SearchStatistics>,
    controller: TabuController,
    generator: MoveGenerator,
    rng: ChaCha8Rng,
}

impl TabuSearch {
    /// Create a new search for the given problem and configuration.
    pub fn new(problem: Problem, config: Config) -> Self {
        let generator = MoveGenerator::new(&problem, config.granularity);
        let controller = TabuController::new(&config);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        TabuSearch {
            problem,
            config,
            best_solution: None,
            stats: None,
            controller,
            generator,
            rng,
        }
    }

    /// Run the search until the budget is exhausted.
    pub fn run(&mut self) -> Result<&Solution, SolverError> {
        let never = AtomicBool::new(false);
        self.run_until(&never)
    }

    /// Run the search, additionally stopping as soon as `stop` is raised.
    ///
    /// The flag is checked at the top of each iteration; cancellation
    /// returns the best-known solution rather than failing.
    pub fn run_until(&mut self, stop: &AtomicBool) -> Result<&Solution, SolverError> {
        let start_time = Instant::now();

        let initial = construction::build_initial(&self.problem)?;
        let mut state = SearchState::new(initial);
        info!(
            "initial solution: {} routes, cost {:.2}",
            state.current.get_route_count(),
            state.best_cost
        );

        let mut termination = TerminationReason::IterationLimit;

        while state.iteration < self.config.max_iterations {
            if stop.load(Ordering::Relaxed) {
                termination = TerminationReason::Cancelled;
                break;
            }
            if let Some(limit) = self.config.time_limit {
                if start_time.elapsed() >= limit {
                    termination = TerminationReason::TimeLimit;
                    break;
                }
            }

            let outcome =
                self.controller
                    .step(&mut state, &self.generator, &self.problem, &mut self.rng);

            if outcome.improved_best {
                info!(
                    "iteration {}: new best cost {:.2}",
                    state.iteration, state.best_cost
                );
            }

            // A solution with no candidate moves can never change again.
            if outcome.applied.is_none() && !outcome.diversified {
                debug!("iteration {}: neighborhood exhausted", state.iteration);
                break;
            }
        }

        self.stats = Some(SearchStatistics {
            iterations: state.iteration,
            runtime: start_time.elapsed(),
            best_cost: state.best_cost,
            best_route_count: state.best.get_route_count(),
            termination,
        });

        Ok(self.best_solution.insert(state.best))
    }
}

/// Solve an SD-VRP instance, returning the best feasible solution found
/// within the configured budget.
pub fn solve(problem: Problem, config: Config) -> Result<Solution, SolverError> {
    let mut search = TabuSearch::new(problem, config);
    search.run()?;
    let best = search
        .best_solution
        .take()
        .unwrap_or_default();
    Ok(best)
}
