//! Leg-cost helpers shared by the move families.
//!
//! All deltas are computed from the affected legs only, so evaluating a
//! candidate stays proportional to the touched route's length.

use crate::problem::Problem;
use crate::solution::Stop;

/// Node index at `pos` in a depot-bracketed stop sequence; out-of-range
/// positions resolve to the depot.
fn location_at(stops: &[Stop], pos: Option<usize>, problem: &Problem) -> usize {
    match pos {
        Some(p) if p < stops.len() => stops[p].customer,
        _ => problem.depot_index,
    }
}

/// Distance added by inserting `customer` before position `pos` of `stops`.
pub fn insertion_legs(stops: &[Stop], customer: usize, pos: usize, problem: &Problem) -> f64 {
    let prev = location_at(stops, pos.checked_sub(1), problem);
    let next = location_at(stops, Some(pos), problem);

    problem.get_distance(prev, customer) + problem.get_distance(customer, next)
        - problem.get_distance(prev, next)
}

/// Distance change from removing the stop at `pos` (non-positive under
/// the triangle inequality).
pub fn removal_legs(stops: &[Stop], pos: usize, problem: &Problem) -> f64 {
    let prev = location_at(stops, pos.checked_sub(1), problem);
    let curr = stops[pos].customer;
    let next = location_at(stops, Some(pos + 1), problem);

    problem.get_distance(prev, next)
        - problem.get_distance(prev, curr)
        - problem.get_distance(curr, next)
}

/// Distance change from replacing the customer at `pos` with
/// `new_customer`, keeping the rest of the sequence fixed.
pub fn replacement_legs(
    stops: &[Stop],
    pos: usize,
    new_customer: usize,
    problem: &Problem,
) -> f64 {
    let prev = location_at(stops, pos.checked_sub(1), problem);
    let curr = stops[pos].customer;
    let next = location_at(stops, Some(pos + 1), problem);

    problem.get_distance(prev, new_customer) + problem.get_distance(new_customer, next)
        - problem.get_distance(prev, curr)
        - problem.get_distance(curr, next)
}

/// Generate a list of neighbors for a customer based on granularity.
pub fn get_neighbors(customer: usize, problem: &Problem, granularity: usize) -> Vec<usize> {
    let mut distances: Vec<(usize, f64)> = Vec::new();

    for i in 0..problem.nodes.len() {
        if i != customer && i != problem.depot_index {
            let dist = problem.get_distance(customer, i);
            distances.push((i, dist));
        }
    }

    // Sort by distance
    distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    // Take the closest `granularity` neighbors
    let count = std::cmp::min(granularity, distances.len());
    distances.truncate(count);

    distances.into_iter().map(|(idx, _)| idx).collect()
}

/// Best insertion position for `customer` in `stops`, with the leg cost
/// it adds. Positions are scanned in order, ties keep the earliest.
pub fn best_insertion(
    stops: &[Stop],
    customer: usize,
    problem: &Problem,
) -> (usize, f64) {
    let mut best_pos = 0;
    let mut best_legs = f64::INFINITY;

    for pos in 0..=stops.len() {
        let legs = insertion_legs(stops, customer, pos, problem);
        if legs < best_legs {
            best_legs = legs;
            best_pos = pos;
        }
    }

    (best_pos, best_legs)
}
