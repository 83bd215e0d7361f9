//! Exchange family: swap two stops of different customers between two
//! routes.

use super::utils::replacement_legs;
use super::{Candidate, Move, MoveGenerator};
use crate::problem::Problem;
use crate::solution::{Solution, EPS};

impl MoveGenerator {
    /// Emit exchange candidates pairing the stop at `(route_a, pos_a)`
    /// with near-neighbor stops in later routes.
    ///
    /// Pairs are generated once, from the lexicographically smaller stop
    /// position, and only when both post-swap loads stay within capacity.
    pub(crate) fn exchange_candidates(
        &self,
        route_a: usize,
        pos_a: usize,
        solution: &Solution,
        problem: &Problem,
        out: &mut Vec<Candidate>,
    ) {
        let a = &solution.routes[route_a];
        let stop_a = a.stops[pos_a];

        for &neighbor in self.neighbors_of(stop_a.customer) {
            // Later routes only, so each unordered pair is generated once.
            for (route_b, b) in solution.routes.iter().enumerate().skip(route_a + 1) {
                let Some(pos_b) = b.position_of(neighbor) else {
                    continue;
                };
                let stop_b = b.stops[pos_b];
                if stop_b.customer == stop_a.customer {
                    continue;
                }
                // Swapping must not duplicate a customer within a route.
                if b.serves(stop_a.customer) || a.serves(stop_b.customer) {
                    continue;
                }

                let load_a = a.load - stop_a.quantity + stop_b.quantity;
                let load_b = b.load - stop_b.quantity + stop_a.quantity;
                if load_a > problem.vehicle_capacity + EPS
                    || load_b > problem.vehicle_capacity + EPS
                {
                    continue;
                }

                let delta = replacement_legs(&a.stops, pos_a, stop_b.customer, problem)
                    + replacement_legs(&b.stops, pos_b, stop_a.customer, problem);

                out.push(Candidate {
                    mv: Move::Exchange {
                        customer_a: stop_a.customer,
                        customer_b: stop_b.customer,
                        route_a,
                        pos_a,
                        route_b,
                        pos_b,
                    },
                    delta,
                });
            }
        }
    }
}
