//! Utility functions and structures for the SD-VRP tabu search.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::solution::Solution;

/// Why a search run stopped. Cancellation is a successful outcome: the
/// best-known solution is still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    IterationLimit,
    TimeLimit,
    Cancelled,
}

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Render a solution in the report format: one `Route i: 0 - c (q) - 0`
/// line per route, then the total cost, delivery count, and truck loads.
pub fn format_solution(solution: &Solution) -> String {
    let mut out = String::new();

    out.push_str(&format!("Total cost: {:.2}\n", solution.cost()));

    for (i, route) in solution.routes.iter().enumerate() {
        let mut line = format!("Route {}: 0", i + 1);
        for stop in &route.stops {
            line.push_str(&format!(" - {} ({})", stop.customer, stop.quantity));
        }
        line.push_str(" - 0");
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&format!(
        "Number of deliveries: {}\n",
        solution.delivery_count()
    ));

    let loads: Vec<String> = solution
        .routes
        .iter()
        .map(|route| format!("{}", route.load))
        .collect();
    out.push_str(&format!("Trucks loads: {}\n", loads.join(" ")));

    out
}

/// Save a solution to a file in the report format.
pub fn save_solution<P: AsRef<Path>>(solution: &Solution, path: P) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(format_solution(solution).as_bytes())
}

/// Statistics about one search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStatistics {
    pub iterations: u64,
    pub runtime: Duration,
    pub best_cost: f64,
    pub best_route_count: usize,
    pub termination: TerminationReason,
}

impl SearchStatistics {
    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Iterations: {}
- Runtime: {}
- Best Cost: {:.2}
- Best Routes: {}
- Termination: {:?}",
            self.iterations,
            format_duration(self.runtime),
            self.best_cost,
            self.best_route_count,
            self.termination
        )
    }
}
