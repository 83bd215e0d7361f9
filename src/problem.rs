//! Problem definition and data structures for the SD-VRP.

use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Represents a node (customer or depot) in the SD-VRP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub demand: f64,
    pub is_depot: bool,
}

impl Node {
    /// Create a new node.
    pub fn new(id: usize, x: f64, y: f64, demand: f64, is_depot: bool) -> Self {
        Node {
            id,
            x,
            y,
            demand,
            is_depot,
        }
    }

    /// Calculate the Euclidean distance between two nodes.
    pub fn distance(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Represents an SD-VRP problem instance.
///
/// Unlike the plain CVRP, a customer's demand may exceed the vehicle
/// capacity: it is covered by several visits, bounded by `max_splits`
/// when that cap is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub nodes: Vec<Node>,
    pub depot_index: usize,
    pub vehicle_capacity: f64,
    pub max_vehicles: Option<usize>,
    pub max_splits: Option<u32>,
    pub distance_matrix: Vec<Vec<f64>>,
}

impl Problem {
    /// Create a new SD-VRP problem, computing the distance matrix from
    /// node coordinates.
    pub fn new(
        name: String,
        nodes: Vec<Node>,
        depot_index: usize,
        vehicle_capacity: f64,
        max_vehicles: Option<usize>,
        max_splits: Option<u32>,
    ) -> Result<Self, SolverError> {
        let distance_matrix = Self::compute_distance_matrix(&nodes);
        Self::with_distance_matrix(
            name,
            nodes,
            depot_index,
            vehicle_capacity,
            max_vehicles,
            max_splits,
            distance_matrix,
        )
    }

    /// Create a problem with an explicitly supplied distance matrix.
    ///
    /// The matrix must be square with one row per node, symmetric, and
    /// zero on the diagonal.
    pub fn with_distance_matrix(
        name: String,
        nodes: Vec<Node>,
        depot_index: usize,
        vehicle_capacity: f64,
        max_vehicles: Option<usize>,
        max_splits: Option<u32>,
        distance_matrix: Vec<Vec<f64>>,
    ) -> Result<Self, SolverError> {
        let problem = Problem {
            name,
            nodes,
            depot_index,
            vehicle_capacity,
            max_vehicles,
            max_splits,
            distance_matrix,
        };
        problem.validate()?;
        Ok(problem)
    }

    /// Calculate the distance between two node indices.
    pub fn get_distance(&self, from: usize, to: usize) -> f64 {
        self.distance_matrix[from][to]
    }

    /// Get the number of customers (excluding the depot).
    pub fn get_customer_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Get the depot node.
    pub fn get_depot(&self) -> &Node {
        &self.nodes[self.depot_index]
    }

    /// Total demand over all customers.
    pub fn total_demand(&self) -> f64 {
        self.nodes
            .iter()
            .filter(|n| !n.is_depot)
            .map(|n| n.demand)
            .sum()
    }

    /// Indices of all customer nodes.
    pub fn customer_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nodes.len()).filter(move |&i| i != self.depot_index)
    }

    /// Generate the full distance matrix for all nodes.
    fn compute_distance_matrix(nodes: &[Node]) -> Vec<Vec<f64>> {
        let n = nodes.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    matrix[i][j] = nodes[i].distance(&nodes[j]);
                }
            }
        }

        matrix
    }

    /// Check the load-time invariants, naming the violated constraint.
    fn validate(&self) -> Result<(), SolverError> {
        if self.vehicle_capacity <= 0.0 {
            return Err(SolverError::malformed(format!(
                "vehicle capacity must be positive, got {}",
                self.vehicle_capacity
            )));
        }
        if self.depot_index >= self.nodes.len() {
            return Err(SolverError::malformed(format!(
                "depot index {} out of range for {} nodes",
                self.depot_index,
                self.nodes.len()
            )));
        }

        for node in &self.nodes {
            if node.demand < 0.0 {
                return Err(SolverError::malformed(format!(
                    "customer {} has negative demand {}",
                    node.id, node.demand
                )));
            }
            if let Some(max_splits) = self.max_splits {
                let limit = self.vehicle_capacity * max_splits as f64;
                if !node.is_depot && node.demand > limit {
                    return Err(SolverError::malformed(format!(
                        "customer {} demand {} exceeds capacity {} x {} splits",
                        node.id, node.demand, self.vehicle_capacity, max_splits
                    )));
                }
            }
        }

        let n = self.nodes.len();
        if self.distance_matrix.len() != n {
            return Err(SolverError::malformed(format!(
                "distance matrix has {} rows for {} nodes",
                self.distance_matrix.len(),
                n
            )));
        }
        for (i, row) in self.distance_matrix.iter().enumerate() {
            if row.len() != n {
                return Err(SolverError::malformed(format!(
                    "distance matrix row {} has {} entries for {} nodes",
                    i,
                    row.len(),
                    n
                )));
            }
        }
        for i in 0..n {
            if self.distance_matrix[i][i] != 0.0 {
                return Err(SolverError::malformed(format!(
                    "distance matrix diagonal entry ({i},{i}) is nonzero"
                )));
            }
            for j in (i + 1)..n {
                let d = self.distance_matrix[i][j];
                if (d - self.distance_matrix[j][i]).abs() > 1e-9 {
                    return Err(SolverError::malformed(format!(
                        "distance matrix is asymmetric at ({i},{j})"
                    )));
                }
                if d < 0.0 {
                    return Err(SolverError::malformed(format!(
                        "distance matrix entry ({i},{j}) is negative"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Parse a problem from the instance text format.
    ///
    /// First line: `<customer count> <vehicle capacity>`. Second line: one
    /// demand per customer. Then one `x y` coordinate line per node, depot
    /// first.
    pub fn parse(name: &str, input: &str) -> Result<Self, SolverError> {
        let mut lines = input.lines().filter(|l| !l.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| SolverError::malformed("missing header line"))?;
        let mut header_fields = header.split_whitespace();
        let n: usize = header_fields
            .next()
            .ok_or_else(|| SolverError::malformed("missing customer count"))?
            .parse()
            .map_err(|_| SolverError::malformed(format!("invalid customer count in {header:?}")))?;
        let capacity: f64 = header_fields
            .next()
            .ok_or_else(|| SolverError::malformed("missing vehicle capacity"))?
            .parse()
            .map_err(|_| {
                SolverError::malformed(format!("invalid vehicle capacity in {header:?}"))
            })?;

        let demand_line = lines
            .next()
            .ok_or_else(|| SolverError::malformed("missing demand line"))?;
        let demands: Vec<f64> = demand_line
            .split_whitespace()
            .map(|field| {
                field
                    .parse()
                    .map_err(|_| SolverError::malformed(format!("invalid demand {field:?}")))
            })
            .collect::<Result<_, _>>()?;
        if demands.len() != n {
            return Err(SolverError::malformed(format!(
                "expected {} demands, found {}",
                n,
                demands.len()
            )));
        }

        let mut coordinates = Vec::with_capacity(n + 1);
        for line in lines {
            let mut fields = line.split_whitespace();
            let x: f64 = fields
                .next()
                .ok_or_else(|| SolverError::malformed(format!("missing x coordinate in {line:?}")))?
                .parse()
                .map_err(|_| SolverError::malformed(format!("invalid coordinate in {line:?}")))?;
            let y: f64 = fields
                .next()
                .ok_or_else(|| SolverError::malformed(format!("missing y coordinate in {line:?}")))?
                .parse()
                .map_err(|_| SolverError::malformed(format!("invalid coordinate in {line:?}")))?;
            coordinates.push((x, y));
        }
        if coordinates.len() != n + 1 {
            return Err(SolverError::malformed(format!(
                "expected {} coordinate lines (depot + customers), found {}",
                n + 1,
                coordinates.len()
            )));
        }

        // Depot first, then customers in demand order.
        let mut nodes = Vec::with_capacity(n + 1);
        nodes.push(Node::new(0, coordinates[0].0, coordinates[0].1, 0.0, true));
        for (i, &(x, y)) in coordinates[1..].iter().enumerate() {
            nodes.push(Node::new(i + 1, x, y, demands[i], false));
        }

        Problem::new(name.to_string(), nodes, 0, capacity, None, None)
    }

    /// Load a problem from a file in the instance text format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("instance")
            .to_string();
        let contents = fs::read_to_string(path)?;
        Problem::parse(&name, &contents)
    }
}
