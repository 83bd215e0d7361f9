//! Candidate move generation for the tabu search.
//!
//! Four move families transform a solution while preserving demand
//! coverage by construction: relocate (with split-relocate degradation),
//! split, merge, and exchange. Rejected preconditions simply produce no
//! candidate; they are never errors.

pub mod exchange;
pub mod merge;
pub mod relocate;
pub mod split;
pub mod utils;

use crate::problem::Problem;
use crate::solution::{Route, Solution, Stop, EPS};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A local transformation of a solution, fully specified so it can be
/// applied without re-deriving positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Move {
    /// Move `quantity` of the stop at `(from_route, from_pos)` to
    /// `(to_route, to_pos)`. A quantity below the stop's full amount is a
    /// split-relocate: the remainder stays on the source route. For
    /// same-route moves `to_pos` indexes the sequence after removal.
    Relocate {
        customer: usize,
        from_route: usize,
        from_pos: usize,
        to_route: usize,
        to_pos: usize,
        quantity: f64,
    },
    /// Carve `quantity` out of the stop at `(route, pos)` into another
    /// route, or into a fresh route when `to_route` is `None`.
    Split {
        customer: usize,
        route: usize,
        pos: usize,
        to_route: Option<usize>,
        to_pos: usize,
        quantity: f64,
    },
    /// Fold the stop at `(from_route, from_pos)` into the same customer's
    /// stop at `(into_route, into_pos)`.
    Merge {
        customer: usize,
        from_route: usize,
        from_pos: usize,
        into_route: usize,
        into_pos: usize,
    },
    /// Swap the stops at `(route_a, pos_a)` and `(route_b, pos_b)`.
    Exchange {
        customer_a: usize,
        customer_b: usize,
        route_a: usize,
        pos_a: usize,
        route_b: usize,
        pos_b: usize,
    },
}

/// Short-term memory key for a move. Signatures are keyed by the customers
/// touched rather than route indices, so they survive route pruning and
/// creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveSignature {
    Relocate(usize),
    Split(usize),
    Merge(usize),
    Exchange(usize, usize),
}

impl Move {
    /// The signature under which this move is checked against the tabu
    /// list.
    pub fn signature(&self) -> MoveSignature {
        match *self {
            Move::Relocate { customer, .. } => MoveSignature::Relocate(customer),
            Move::Split { customer, .. } => MoveSignature::Split(customer),
            Move::Merge { customer, .. } => MoveSignature::Merge(customer),
            Move::Exchange {
                customer_a,
                customer_b,
                ..
            } => MoveSignature::Exchange(customer_a.min(customer_b), customer_a.max(customer_b)),
        }
    }

    /// Signature of the move that would undo this one; it is the entry
    /// inserted into the tabu list after application.
    pub fn reverse_signature(&self) -> MoveSignature {
        match *self {
            Move::Relocate { customer, .. } => MoveSignature::Relocate(customer),
            Move::Split { customer, .. } => MoveSignature::Merge(customer),
            Move::Merge { customer, .. } => MoveSignature::Split(customer),
            Move::Exchange {
                customer_a,
                customer_b,
                ..
            } => MoveSignature::Exchange(customer_a.min(customer_b), customer_a.max(customer_b)),
        }
    }

    /// Apply the move to `solution`, refresh touched route caches, and
    /// drop any route the move emptied.
    pub fn apply(&self, solution: &mut Solution, problem: &Problem) {
        match *self {
            Move::Relocate {
                customer,
                from_route,
                from_pos,
                to_route,
                to_pos,
                quantity,
            } => {
                let source_qty = solution.routes[from_route].stops[from_pos].quantity;
                if quantity + EPS >= source_qty {
                    solution.routes[from_route].stops.remove(from_pos);
                } else {
                    solution.routes[from_route].stops[from_pos].quantity -= quantity;
                }
                solution.routes[from_route].modified = true;

                solution.routes[to_route]
                    .stops
                    .insert(to_pos, Stop::new(customer, quantity.min(source_qty)));
                solution.routes[to_route].modified = true;
            }
            Move::Split {
                customer,
                route,
                pos,
                to_route,
                to_pos,
                quantity,
            } => {
                solution.routes[route].stops[pos].quantity -= quantity;
                solution.routes[route].modified = true;

                match to_route {
                    Some(target) => {
                        solution.routes[target]
                            .stops
                            .insert(to_pos, Stop::new(customer, quantity));
                        solution.routes[target].modified = true;
                    }
                    None => {
                        let depot_leg =
                            problem.get_distance(problem.depot_index, customer);
                        solution
                            .routes
                            .push(Route::with_stop(customer, quantity, depot_leg));
                    }
                }
            }
            Move::Merge {
                from_route,
                from_pos,
                into_route,
                into_pos,
                ..
            } => {
                let folded = solution.routes[from_route].stops.remove(from_pos);
                solution.routes[from_route].modified = true;

                solution.routes[into_route].stops[into_pos].quantity += folded.quantity;
                solution.routes[into_route].modified = true;
            }
            Move::Exchange {
                route_a,
                pos_a,
                route_b,
                pos_b,
                ..
            } => {
                let stop_a = solution.routes[route_a].stops[pos_a];
                let stop_b = solution.routes[route_b].stops[pos_b];
                solution.routes[route_a].stops[pos_a] = stop_b;
                solution.routes[route_b].stops[pos_b] = stop_a;
                solution.routes[route_a].modified = true;
                solution.routes[route_b].modified = true;
            }
        }

        solution.prune_empty_routes();
        solution.evaluate(problem);
    }
}

/// A move paired with the total-distance change it would cause.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub mv: Move,
    pub delta: f64,
}

/// Enumerates candidate moves over a solution snapshot.
///
/// Neighbor lists are precomputed once per problem (granularity pruning);
/// per-stop expansion is independent, so candidates for all stops are
/// evaluated in parallel against the immutable snapshot and collected in
/// generation order to keep selection deterministic.
pub struct MoveGenerator {
    neighbors: Vec<Vec<usize>>,
}

impl MoveGenerator {
    /// Create a generator for `problem`, precomputing each customer's
    /// granularity-nearest neighbors.
    pub fn new(problem: &Problem, granularity: usize) -> Self {
        let neighbors = (0..problem.nodes.len())
            .map(|i| {
                if i == problem.depot_index {
                    Vec::new()
                } else {
                    utils::get_neighbors(i, problem, granularity)
                }
            })
            .collect();

        MoveGenerator { neighbors }
    }

    /// Precomputed neighbor list for a customer.
    pub(crate) fn neighbors_of(&self, customer: usize) -> &[usize] {
        &self.neighbors[customer]
    }

    /// Generate the full candidate set for the current solution.
    pub fn generate(&self, solution: &Solution, problem: &Problem) -> Vec<Candidate> {
        let positions: Vec<(usize, usize)> = solution
            .routes
            .iter()
            .enumerate()
            .flat_map(|(r, route)| (0..route.stops.len()).map(move |p| (r, p)))
            .collect();

        let per_stop: Vec<Vec<Candidate>> = positions
            .par_iter()
            .map(|&(route, pos)| {
                let mut out = Vec::new();
                self.relocate_candidates(route, pos, solution, problem, &mut out);
                self.split_candidates(route, pos, solution, problem, &mut out);
                self.merge_candidates(route, pos, solution, problem, &mut out);
                self.exchange_candidates(route, pos, solution, problem, &mut out);
                out
            })
            .collect();

        per_stop.into_iter().flatten().collect()
    }

    /// Routes other than `from_route` that serve one of `customer`'s
    /// granularity neighbors, in neighbor order without duplicates.
    pub(crate) fn neighbor_routes(
        &self,
        customer: usize,
        from_route: usize,
        solution: &Solution,
    ) -> Vec<usize> {
        let mut targets: Vec<usize> = Vec::new();

        for &neighbor in self.neighbors_of(customer) {
            for (r, route) in solution.routes.iter().enumerate() {
                if r != from_route && route.serves(neighbor) && !targets.contains(&r) {
                    targets.push(r);
                }
            }
        }

        targets
    }
}
