//! Merge family: the inverse of split. Two stops serving the same
//! customer on different routes collapse into one.

use super::utils::removal_legs;
use super::{Candidate, Move, MoveGenerator};
use crate::problem::Problem;
use crate::solution::{Solution, EPS};

impl MoveGenerator {
    /// Emit merge candidates folding the stop at `(from_route, from_pos)`
    /// into each other route that serves the same customer.
    ///
    /// A merge whose receiving route lacks the spare capacity is rejected
    /// outright, never degraded.
    pub(crate) fn merge_candidates(
        &self,
        from_route: usize,
        from_pos: usize,
        solution: &Solution,
        problem: &Problem,
        out: &mut Vec<Candidate>,
    ) {
        let stop = solution.routes[from_route].stops[from_pos];
        let removal = removal_legs(&solution.routes[from_route].stops, from_pos, problem);

        for (into_route, target) in solution.routes.iter().enumerate() {
            if into_route == from_route {
                continue;
            }
            let Some(into_pos) = target.position_of(stop.customer) else {
                continue;
            };
            if target.spare_capacity(problem.vehicle_capacity) + EPS < stop.quantity {
                continue;
            }

            // The receiving stop's legs are untouched; only the donor
            // route's distance changes.
            out.push(Candidate {
                mv: Move::Merge {
                    customer: stop.customer,
                    from_route,
                    from_pos,
                    into_route,
                    into_pos,
                },
                delta: removal,
            });
        }
    }
}
