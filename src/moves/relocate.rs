//! Relocate family: move a stop to a new position in the same or another
//! route, degrading to a split-relocate when the full quantity does not
//! fit the target.

use super::utils::{best_insertion, insertion_legs, removal_legs};
use super::{Candidate, Move, MoveGenerator};
use crate::problem::Problem;
use crate::solution::{sequence_distance, Solution, EPS};

impl MoveGenerator {
    /// Emit relocate candidates for the stop at `(from_route, from_pos)`.
    pub(crate) fn relocate_candidates(
        &self,
        from_route: usize,
        from_pos: usize,
        solution: &Solution,
        problem: &Problem,
        out: &mut Vec<Candidate>,
    ) {
        let source = &solution.routes[from_route];
        let stop = source.stops[from_pos];

        // Same-route repositioning. The reduced sequence is re-priced once;
        // insertion deltas are then leg-local.
        if source.stops.len() > 1 {
            let mut reduced = source.stops.clone();
            reduced.remove(from_pos);
            let removal_delta = sequence_distance(&reduced, problem) - source.distance;

            for to_pos in 0..=reduced.len() {
                if to_pos == from_pos {
                    continue; // re-inserting where the stop came from is a no-op
                }
                let delta =
                    removal_delta + insertion_legs(&reduced, stop.customer, to_pos, problem);
                out.push(Candidate {
                    mv: Move::Relocate {
                        customer: stop.customer,
                        from_route,
                        from_pos,
                        to_route: from_route,
                        to_pos,
                        quantity: stop.quantity,
                    },
                    delta,
                });
            }
        }

        // Cross-route moves toward routes serving a near neighbor.
        let source_removal = removal_legs(&source.stops, from_pos, problem);

        for to_route in self.neighbor_routes(stop.customer, from_route, solution) {
            let target = &solution.routes[to_route];
            if target.serves(stop.customer) {
                continue;
            }

            let spare = target.spare_capacity(problem.vehicle_capacity);
            if spare + EPS >= stop.quantity {
                // Full relocate.
                let (to_pos, legs) = best_insertion(&target.stops, stop.customer, problem);
                out.push(Candidate {
                    mv: Move::Relocate {
                        customer: stop.customer,
                        from_route,
                        from_pos,
                        to_route,
                        to_pos,
                        quantity: stop.quantity,
                    },
                    delta: source_removal + legs,
                });
            } else if spare > EPS && self.split_allowed(stop.customer, solution, problem) {
                // Split-relocate: only the portion that fits moves, the
                // remainder stays on the source route.
                let (to_pos, legs) = best_insertion(&target.stops, stop.customer, problem);
                out.push(Candidate {
                    mv: Move::Relocate {
                        customer: stop.customer,
                        from_route,
                        from_pos,
                        to_route,
                        to_pos,
                        quantity: spare,
                    },
                    delta: legs,
                });
            }
        }
    }

    /// Whether the customer may gain one more visit under the split cap.
    pub(crate) fn split_allowed(
        &self,
        customer: usize,
        solution: &Solution,
        problem: &Problem,
    ) -> bool {
        match problem.max_splits {
            Some(max_splits) => solution.split_count(customer) < max_splits as usize,
            None => true,
        }
    }
}
