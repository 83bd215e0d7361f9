//! Split family: divide one stop into two stops on different routes.

use super::utils::best_insertion;
use super::{Candidate, Move, MoveGenerator};
use crate::problem::Problem;
use crate::solution::{Solution, EPS};

impl MoveGenerator {
    /// Emit split candidates for the stop at `(route, pos)`.
    ///
    /// The stop is halved: one half stays in place, the other goes to the
    /// best position of a route with enough spare capacity, or to a fresh
    /// route when no open route can take it and the fleet cap allows.
    pub(crate) fn split_candidates(
        &self,
        route: usize,
        pos: usize,
        solution: &Solution,
        problem: &Problem,
        out: &mut Vec<Candidate>,
    ) {
        let stop = solution.routes[route].stops[pos];
        let half = stop.quantity / 2.0;
        if half <= EPS {
            return;
        }
        if !self.split_allowed(stop.customer, solution, problem) {
            return;
        }

        let mut placed = false;
        for (to_route, target) in solution.routes.iter().enumerate() {
            if to_route == route || target.serves(stop.customer) {
                continue;
            }
            if target.spare_capacity(problem.vehicle_capacity) + EPS < half {
                continue;
            }

            let (to_pos, legs) = best_insertion(&target.stops, stop.customer, problem);
            out.push(Candidate {
                mv: Move::Split {
                    customer: stop.customer,
                    route,
                    pos,
                    to_route: Some(to_route),
                    to_pos,
                    quantity: half,
                },
                delta: legs,
            });
            placed = true;
        }

        // Fresh route only when no existing route has the spare capacity.
        if !placed {
            if let Some(max_vehicles) = problem.max_vehicles {
                if solution.routes.len() >= max_vehicles {
                    return;
                }
            }
            let depot_leg = problem.get_distance(problem.depot_index, stop.customer);
            out.push(Candidate {
                mv: Move::Split {
                    customer: stop.customer,
                    route,
                    pos,
                    to_route: None,
                    to_pos: 0,
                    quantity: half,
                },
                delta: depot_leg * 2.0,
            });
        }
    }
}
