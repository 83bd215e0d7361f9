//! Solution representation for the SD-VRP.

use crate::problem::Problem;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::once;

/// Tolerance for floating-point quantity and cost comparisons.
pub const EPS: f64 = 1e-9;

/// A single delivery: a customer visit carrying a strictly positive
/// quantity. The same customer may be visited by several routes, each
/// visit with its own quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub customer: usize,
    pub quantity: f64,
}

impl Stop {
    pub fn new(customer: usize, quantity: f64) -> Self {
        Stop { customer, quantity }
    }
}

/// Represents a route in an SD-VRP solution.
///
/// The route starts and ends at the depot; only customer stops are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// The ordered sequence of stops (excluding the depot)
    pub stops: Vec<Stop>,
    /// The total quantity delivered by the route
    pub load: f64,
    /// The total distance of the route including both depot legs
    pub distance: f64,
    /// Has this route been modified since last evaluation
    pub modified: bool,
}

impl Route {
    /// Create a new, empty route.
    pub fn new() -> Self {
        Route {
            stops: Vec::new(),
            load: 0.0,
            distance: 0.0,
            modified: true,
        }
    }

    /// Create a route with a single stop.
    pub fn with_stop(customer: usize, quantity: f64, distance_from_depot: f64) -> Self {
        let mut route = Route::new();
        route.stops.push(Stop::new(customer, quantity));
        route.load = quantity;
        route.distance = distance_from_depot * 2.0; // From depot to customer and back
        route.modified = true;
        route
    }

    /// Refresh the cached distance and load if the route was modified.
    pub fn refresh(&mut self, problem: &Problem) {
        if !self.modified {
            return;
        }

        self.load = self.stops.iter().map(|s| s.quantity).sum();
        self.distance = sequence_distance(&self.stops, problem);
        self.modified = false;
    }

    /// Check if the route is empty.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Remaining capacity under the vehicle limit.
    pub fn spare_capacity(&self, capacity: f64) -> f64 {
        (capacity - self.load).max(0.0)
    }

    /// Check if the route exceeds the vehicle capacity.
    pub fn exceeds_capacity(&self, capacity: f64) -> bool {
        self.load > capacity + EPS
    }

    /// Position of the stop serving `customer`, if the route visits it.
    pub fn position_of(&self, customer: usize) -> Option<usize> {
        self.stops.iter().position(|s| s.customer == customer)
    }

    /// Whether the route already serves `customer`.
    pub fn serves(&self, customer: usize) -> bool {
        self.position_of(customer).is_some()
    }
}

impl Default for Route {
    fn default() -> Self {
        Route::new()
    }
}

/// Total distance of a depot -> stops -> depot sequence.
pub fn sequence_distance(stops: &[Stop], problem: &Problem) -> f64 {
    if stops.is_empty() {
        return 0.0;
    }

    once(problem.depot_index)
        .chain(stops.iter().map(|s| s.customer))
        .chain(once(problem.depot_index))
        .tuple_windows()
        .map(|(from, to)| problem.get_distance(from, to))
        .sum()
}

/// Represents a complete solution to an SD-VRP instance.
///
/// Cost equals total distance: moves are constructed to preserve
/// feasibility, so there is no penalty term.
#[derive(Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The list of routes
    pub routes: Vec<Route>,
    /// The cached total distance of the solution
    pub distance: f64,
}

impl Solution {
    /// Create a new, empty solution.
    pub fn new() -> Self {
        Solution {
            routes: Vec::new(),
            distance: 0.0,
        }
    }

    /// Cached total cost of the solution.
    pub fn cost(&self) -> f64 {
        self.distance
    }

    /// Evaluate the solution, refreshing only routes touched since the
    /// last evaluation and re-summing the total.
    pub fn evaluate(&mut self, problem: &Problem) {
        let mut total_distance = 0.0;

        for route in &mut self.routes {
            route.refresh(problem);
            total_distance += route.distance;
        }

        self.distance = total_distance;
    }

    /// Quantity delivered to every node, summed across all routes.
    pub fn delivered_quantities(&self, problem: &Problem) -> Vec<f64> {
        let mut delivered = vec![0.0; problem.nodes.len()];
        for route in &self.routes {
            for stop in &route.stops {
                delivered[stop.customer] += stop.quantity;
            }
        }
        delivered
    }

    /// Number of stops across all routes serving `customer`.
    pub fn split_count(&self, customer: usize) -> usize {
        self.routes
            .iter()
            .filter(|route| route.serves(customer))
            .count()
    }

    /// Check the solution invariants: every customer's demand is covered
    /// exactly, no route exceeds capacity, every stop quantity is strictly
    /// positive, and no route is empty.
    pub fn is_feasible(&self, problem: &Problem) -> bool {
        for route in &self.routes {
            if route.is_empty() {
                return false;
            }
            if route.exceeds_capacity(problem.vehicle_capacity) {
                return false;
            }
            for stop in &route.stops {
                if stop.quantity <= EPS || stop.customer == problem.depot_index {
                    return false;
                }
            }
        }

        let delivered = self.delivered_quantities(problem);
        for node in &problem.nodes {
            if node.is_depot {
                continue;
            }
            if (delivered[node.id] - node.demand).abs() > 1e-6 {
                return false;
            }
        }

        if let Some(max_splits) = problem.max_splits {
            for customer in problem.customer_indices() {
                if self.split_count(customer) > max_splits as usize {
                    return false;
                }
            }
        }

        true
    }

    /// Drop routes left without stops by a destructive move.
    pub fn prune_empty_routes(&mut self) {
        self.routes.retain(|route| !route.is_empty());
    }

    /// Get the number of routes.
    pub fn get_route_count(&self) -> usize {
        self.routes.len()
    }

    /// Total number of deliveries (stops) across all routes.
    pub fn delivery_count(&self) -> usize {
        self.routes.iter().map(|route| route.stops.len()).sum()
    }
}

impl Default for Solution {
    fn default() -> Self {
        Solution::new()
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        writeln!(f, "  Cost: {:.2}", self.distance)?;
        writeln!(f, "  Routes: {}", self.routes.len())?;

        for (i, route) in self.routes.iter().enumerate() {
            let stops: Vec<String> = route
                .stops
                .iter()
                .map(|s| format!("{} ({})", s.customer, s.quantity))
                .collect();
            writeln!(
                f,
                "  Route {}: [{}] (Load: {:.2}, Distance: {:.2})",
                i,
                stops.join(", "),
                route.load,
                route.distance
            )?;
        }

        Ok(())
    }
}
