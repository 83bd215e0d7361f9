//! Greedy construction of the initial feasible solution.

use crate::error::SolverError;
use crate::moves::utils::insertion_legs;
use crate::problem::Problem;
use crate::solution::{Route, Solution, Stop, EPS};
use log::debug;

/// Where one greedy step places a delivery.
#[derive(Debug, Clone, Copy)]
enum Placement {
    Existing {
        route: usize,
        pos: usize,
        quantity: f64,
    },
    Fresh {
        quantity: f64,
    },
}

/// Build an initial solution by repeatedly applying the cheapest feasible
/// insertion over all (customer, remaining-demand) pairs.
///
/// Each step delivers as much of the chosen customer's remaining demand
/// as the receiving route can hold, at the position with the smallest leg
/// increase; ties break toward the customer nearer the depot. A fresh
/// route is opened when that is the cheapest option left or no open route
/// can accept any quantity. Fails with `InfeasibleInstance` when demand
/// cannot be covered under the capacity and fleet configuration.
pub fn build_initial(problem: &Problem) -> Result<Solution, SolverError> {
    if let Some(max_vehicles) = problem.max_vehicles {
        let coverable = problem.vehicle_capacity * max_vehicles as f64;
        let total = problem.total_demand();
        if total > coverable + EPS {
            return Err(SolverError::infeasible(format!(
                "total demand {} exceeds capacity {} x {} vehicles",
                total, problem.vehicle_capacity, max_vehicles
            )));
        }
    }

    let mut remaining: Vec<f64> = problem.nodes.iter().map(|n| n.demand).collect();
    remaining[problem.depot_index] = 0.0;
    let mut stops_placed: Vec<u32> = vec![0; problem.nodes.len()];
    let mut solution = Solution::new();

    loop {
        let mut chosen: Option<(f64, f64, usize, Placement)> = None;

        for customer in problem.customer_indices() {
            if remaining[customer] <= EPS {
                continue;
            }
            let Some((cost, placement)) = best_placement(
                problem,
                &solution,
                customer,
                remaining[customer],
                stops_placed[customer],
            ) else {
                return Err(SolverError::infeasible(format!(
                    "customer {} has {} undelivered demand and no route can take it",
                    customer, remaining[customer]
                )));
            };

            let depot_leg = problem.get_distance(problem.depot_index, customer);
            let better = match &chosen {
                None => true,
                Some((best_cost, best_leg, _, _)) => {
                    cost < best_cost - EPS || (cost < best_cost + EPS && depot_leg < *best_leg)
                }
            };
            if better {
                chosen = Some((cost, depot_leg, customer, placement));
            }
        }

        let Some((_, _, customer, placement)) = chosen else {
            break; // every demand covered
        };

        match placement {
            Placement::Existing {
                route,
                pos,
                quantity,
            } => {
                solution.routes[route]
                    .stops
                    .insert(pos, Stop::new(customer, quantity));
                solution.routes[route].modified = true;
                remaining[customer] -= quantity;
            }
            Placement::Fresh { quantity } => {
                let depot_leg = problem.get_distance(problem.depot_index, customer);
                solution
                    .routes
                    .push(Route::with_stop(customer, quantity, depot_leg));
                remaining[customer] -= quantity;
            }
        }
        stops_placed[customer] += 1;
        solution.evaluate(problem);
    }

    solution.evaluate(problem);
    debug!(
        "greedy construction: {} routes, cost {:.2}",
        solution.get_route_count(),
        solution.cost()
    );
    Ok(solution)
}

/// Whether delivering `take` of the outstanding `quantity` now leaves a
/// remainder the split budget can still cover.
fn remainder_coverable(problem: &Problem, placed: u32, quantity: f64, take: f64) -> bool {
    let remainder = quantity - take;
    if remainder <= EPS {
        return true;
    }
    match problem.max_splits {
        None => true,
        Some(max_splits) => {
            let visits_left = max_splits.saturating_sub(placed + 1);
            remainder <= problem.vehicle_capacity * visits_left as f64 + EPS
        }
    }
}

/// The cheapest feasible placement of (part of) `quantity` for `customer`,
/// with its leg cost.
fn best_placement(
    problem: &Problem,
    solution: &Solution,
    customer: usize,
    quantity: f64,
    placed: u32,
) -> Option<(f64, Placement)> {
    let mut best: Option<(f64, Placement)> = None;

    for (r, route) in solution.routes.iter().enumerate() {
        if route.serves(customer) {
            continue;
        }
        let spare = route.spare_capacity(problem.vehicle_capacity);
        if spare <= EPS {
            continue;
        }
        let take = spare.min(quantity);
        if !remainder_coverable(problem, placed, quantity, take) {
            continue;
        }

        for pos in 0..=route.stops.len() {
            let legs = insertion_legs(&route.stops, customer, pos, problem);
            if best.as_ref().is_none_or(|(cost, _)| legs < *cost) {
                best = Some((
                    legs,
                    Placement::Existing {
                        route: r,
                        pos,
                        quantity: take,
                    },
                ));
            }
        }
    }

    let fleet_open = problem
        .max_vehicles
        .map_or(true, |cap| solution.routes.len() < cap);
    if fleet_open {
        let take = quantity.min(problem.vehicle_capacity);
        if remainder_coverable(problem, placed, quantity, take) {
            let legs = problem.get_distance(problem.depot_index, customer) * 2.0;
            if best.as_ref().is_none_or(|(cost, _)| legs < *cost) {
                best = Some((legs, Placement::Fresh { quantity: take }));
            }
        }
    }

    best
}
