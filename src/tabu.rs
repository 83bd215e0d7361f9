//! Tabu list, search state, and the iteration controller.

use crate::config::{Config, SelectionPolicy};
use crate::moves::{Candidate, Move, MoveGenerator, MoveSignature};
use crate::problem::Problem;
use crate::solution::{Solution, EPS};
use log::{debug, warn};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Expired entries are swept this often; lookups ignore them either way.
const PURGE_INTERVAL: u64 = 64;

/// Short-term memory of recently applied moves.
///
/// Entries map a move signature to the iteration at which the ban expires.
/// Expired entries are removed lazily.
#[derive(Debug, Default)]
pub struct TabuList {
    entries: HashMap<MoveSignature, u64>,
}

impl TabuList {
    pub fn new() -> Self {
        TabuList {
            entries: HashMap::new(),
        }
    }

    /// Whether `signature` is banned at `iteration`.
    pub fn is_tabu(&self, signature: &MoveSignature, iteration: u64) -> bool {
        self.entries
            .get(signature)
            .is_some_and(|&expiry| expiry > iteration)
    }

    /// Ban `signature` until `expiry`.
    pub fn insert(&mut self, signature: MoveSignature, expiry: u64) {
        self.entries.insert(signature, expiry);
    }

    /// Drop entries whose ban has passed.
    pub fn purge_expired(&mut self, iteration: u64) {
        self.entries.retain(|_, &mut expiry| expiry > iteration);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Mutable state of one search run. `best` never aliases `current`: it is
/// replaced by a deep clone on every improvement.
#[derive(Debug)]
pub struct SearchState {
    pub current: Solution,
    pub best: Solution,
    pub best_cost: f64,
    pub iteration: u64,
    pub stagnation: u32,
}

impl SearchState {
    /// Start a search from an initial feasible solution.
    pub fn new(initial: Solution) -> Self {
        let best = initial.clone();
        let best_cost = best.cost();
        SearchState {
            current: initial,
            best,
            best_cost,
            iteration: 0,
            stagnation: 0,
        }
    }
}

/// What one controller step did, for the driver's bookkeeping and logs.
#[derive(Debug, Clone, Copy)]
pub struct StepOutcome {
    pub applied: Option<MoveSignature>,
    pub improved_best: bool,
    pub diversified: bool,
}

/// Drives one tabu iteration: generate, filter with aspiration, select,
/// apply, remember, and diversify on prolonged stagnation.
pub struct TabuController {
    pub tabu_list: TabuList,
    policy: SelectionPolicy,
    tenure_min: u64,
    tenure_max: u64,
    stagnation_threshold: u32,
    diversification_strength: usize,
}

impl TabuController {
    pub fn new(config: &Config) -> Self {
        TabuController {
            tabu_list: TabuList::new(),
            policy: config.policy,
            tenure_min: config.tenure_min,
            tenure_max: config.tenure_max,
            stagnation_threshold: config.stagnation_threshold,
            diversification_strength: config.diversification_strength,
        }
    }

    /// Run one search iteration over `state`.
    pub fn step(
        &mut self,
        state: &mut SearchState,
        generator: &MoveGenerator,
        problem: &Problem,
        rng: &mut ChaCha8Rng,
    ) -> StepOutcome {
        state.iteration += 1;
        if state.iteration % PURGE_INTERVAL == 0 {
            self.tabu_list.purge_expired(state.iteration);
        }

        let mut outcome = StepOutcome {
            applied: None,
            improved_best: false,
            diversified: false,
        };

        let candidates = generator.generate(&state.current, problem);
        if candidates.is_empty() {
            warn!(
                "iteration {}: no candidate moves for {} routes",
                state.iteration,
                state.current.get_route_count()
            );
        } else if let Some(candidate) = self.select(&candidates, state) {
            let mv = candidate.mv;
            mv.apply(&mut state.current, problem);

            let tenure = self.sample_tenure(state.stagnation, rng);
            self.tabu_list
                .insert(mv.reverse_signature(), state.iteration + tenure);
            outcome.applied = Some(mv.signature());

            if state.current.cost() < state.best_cost - EPS {
                state.best = state.current.clone();
                state.best_cost = state.best.cost();
                state.stagnation = 0;
                outcome.improved_best = true;
            } else {
                state.stagnation += 1;
            }
        } else {
            state.stagnation += 1;
        }

        if state.stagnation > self.stagnation_threshold {
            self.diversify(state, problem, rng);
            state.stagnation = 0;
            outcome.diversified = true;
        }

        outcome
    }

    /// Pick a candidate under the configured policy. Tabu moves are
    /// admissible only when they would beat the best-known cost
    /// (aspiration); if every candidate is tabu without aspiring, the
    /// overall best is taken to keep the walk moving.
    fn select<'a>(&self, candidates: &'a [Candidate], state: &SearchState) -> Option<&'a Candidate> {
        let current_cost = state.current.cost();
        let mut best_admissible: Option<&Candidate> = None;
        let mut best_overall: Option<&Candidate> = None;

        for candidate in candidates {
            if best_overall.is_none_or(|b| candidate.delta < b.delta) {
                best_overall = Some(candidate);
            }

            let tabu = self
                .tabu_list
                .is_tabu(&candidate.mv.signature(), state.iteration);
            let aspires = current_cost + candidate.delta < state.best_cost - EPS;
            if tabu && !aspires {
                continue;
            }

            if self.policy == SelectionPolicy::FirstImprovement && candidate.delta < -EPS {
                return Some(candidate);
            }
            if best_admissible.is_none_or(|b| candidate.delta < b.delta) {
                best_admissible = Some(candidate);
            }
        }

        best_admissible.or(best_overall)
    }

    /// Sample a tenure from the dynamic range: near `tenure_min` while
    /// the search is improving, widening toward `tenure_max` as the
    /// stagnation counter approaches the diversification threshold.
    fn sample_tenure(&self, stagnation: u32, rng: &mut ChaCha8Rng) -> u64 {
        let span = self.tenure_max - self.tenure_min;
        let frac = if self.stagnation_threshold == 0 {
            1.0
        } else {
            (stagnation as f64 / self.stagnation_threshold as f64).min(1.0)
        };
        let hi = self.tenure_min + (span as f64 * frac).round() as u64;
        rng.gen_range(self.tenure_min..=hi.max(self.tenure_min))
    }

    /// Escape a local-optimum basin with a batch of randomized,
    /// feasibility-preserving perturbations. Tabu filtering is bypassed;
    /// each perturbation is itself tabu-tagged at the widest tenure so
    /// the batch is not immediately undone.
    fn diversify(&mut self, state: &mut SearchState, problem: &Problem, rng: &mut ChaCha8Rng) {
        debug!(
            "iteration {}: diversifying after stagnation ({} moves)",
            state.iteration, self.diversification_strength
        );

        for _ in 0..self.diversification_strength {
            let Some(mv) = random_perturbation(&state.current, problem, rng) else {
                continue;
            };
            mv.apply(&mut state.current, problem);
            self.tabu_list
                .insert(mv.reverse_signature(), state.iteration + self.tenure_max);
        }

        // A perturbation chain can stumble into new territory worth keeping.
        if state.current.cost() < state.best_cost - EPS {
            state.best = state.current.clone();
            state.best_cost = state.best.cost();
        }
    }
}

/// Build one random relocate/split perturbation that keeps the solution
/// feasible, or `None` when the solution offers no degree of freedom.
fn random_perturbation(
    solution: &Solution,
    problem: &Problem,
    rng: &mut ChaCha8Rng,
) -> Option<Move> {
    if solution.routes.is_empty() {
        return None;
    }

    let from_route = rng.gen_range(0..solution.routes.len());
    let source = &solution.routes[from_route];
    if source.is_empty() {
        return None;
    }
    let from_pos = rng.gen_range(0..source.stops.len());
    let stop = source.stops[from_pos];

    let split_allowed = match problem.max_splits {
        Some(max_splits) => solution.split_count(stop.customer) < max_splits as usize,
        None => true,
    };

    // Prefer a cross-route relocate; degrade to a split-relocate, then to
    // a fresh-route split, then to a same-route shuffle.
    let mut targets: Vec<usize> = (0..solution.routes.len())
        .filter(|&r| r != from_route && !solution.routes[r].serves(stop.customer))
        .collect();
    if !targets.is_empty() {
        let to_route = targets.remove(rng.gen_range(0..targets.len()));
        let target = &solution.routes[to_route];
        let spare = target.spare_capacity(problem.vehicle_capacity);
        let to_pos = rng.gen_range(0..=target.stops.len());

        if spare + EPS >= stop.quantity {
            return Some(Move::Relocate {
                customer: stop.customer,
                from_route,
                from_pos,
                to_route,
                to_pos,
                quantity: stop.quantity,
            });
        }
        if spare > EPS && split_allowed {
            return Some(Move::Relocate {
                customer: stop.customer,
                from_route,
                from_pos,
                to_route,
                to_pos,
                quantity: spare,
            });
        }
    }

    let fleet_open = problem
        .max_vehicles
        .map_or(true, |cap| solution.routes.len() < cap);
    if split_allowed && fleet_open && stop.quantity / 2.0 > EPS {
        return Some(Move::Split {
            customer: stop.customer,
            route: from_route,
            pos: from_pos,
            to_route: None,
            to_pos: 0,
            quantity: stop.quantity / 2.0,
        });
    }

    if source.stops.len() > 1 {
        let to_pos = rng.gen_range(0..source.stops.len());
        return Some(Move::Relocate {
            customer: stop.customer,
            from_route,
            from_pos,
            to_route: from_route,
            to_pos,
            quantity: stop.quantity,
        });
    }

    None
}
