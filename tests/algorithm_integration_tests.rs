//! End-to-end tests for the tabu search driver.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use sdvrp_tabu::config::{Config, SelectionPolicy};
use sdvrp_tabu::construction::build_initial;
use sdvrp_tabu::error::SolverError;
use sdvrp_tabu::problem::{Node, Problem};
use sdvrp_tabu::utils::TerminationReason;
use sdvrp_tabu::{solve, TabuSearch};

/// A 10-customer ring instance where greedy construction leaves room for
/// improvement.
fn create_ring_problem() -> Problem {
    let mut nodes = vec![Node::new(0, 0.0, 0.0, 0.0, true)];
    for i in 1..=10 {
        let angle = (i as f64) * std::f64::consts::TAU / 10.0;
        nodes.push(Node::new(
            i,
            30.0 * angle.cos(),
            30.0 * angle.sin(),
            1.0 + (i % 3) as f64,
            false,
        ));
    }
    Problem::new("Ring".to_string(), nodes, 0, 6.0, None, None).expect("valid test problem")
}

#[test]
fn test_solve_returns_feasible_solution() {
    let problem = create_ring_problem();
    let config = Config::new().with_max_iterations(300).with_seed(1);

    let solution = solve(problem.clone(), config).expect("solvable");
    assert!(solution.is_feasible(&problem));
    assert!(solution.cost() > 0.0);
}

#[test]
fn test_search_result_at_least_as_good_as_greedy() {
    let problem = create_ring_problem();
    let greedy = build_initial(&problem).expect("feasible");

    let config = Config::new().with_max_iterations(300).with_seed(1);
    let solution = solve(problem.clone(), config).expect("solvable");

    // The search starts from greedy and only replaces best on strict
    // improvement, so it can never return something worse.
    assert!(solution.cost() <= greedy.cost() + 1e-9);
}

#[test]
fn test_more_budget_never_hurts() {
    let problem = create_ring_problem();

    let mut previous_cost = f64::INFINITY;
    for budget in [10, 50, 250] {
        let config = Config::new().with_max_iterations(budget).with_seed(123);
        let solution = solve(problem.clone(), config).expect("solvable");
        assert!(solution.is_feasible(&problem));
        assert!(
            solution.cost() <= previous_cost + 1e-9,
            "budget {} worsened the result",
            budget
        );
        previous_cost = solution.cost();
    }
}

#[test]
fn test_same_seed_same_result() {
    let problem = create_ring_problem();

    let config = Config::new().with_max_iterations(200).with_seed(9);
    let first = solve(problem.clone(), config.clone()).expect("solvable");
    let second = solve(problem.clone(), config).expect("solvable");

    assert_eq!(first.cost(), second.cost());
    assert_eq!(first.get_route_count(), second.get_route_count());
}

#[test]
fn test_cancellation_before_first_iteration_returns_greedy() {
    let problem = create_ring_problem();
    let greedy = build_initial(&problem).expect("feasible");

    let config = Config::new().with_max_iterations(100_000).with_seed(1);
    let mut search = TabuSearch::new(problem.clone(), config);
    let stop = AtomicBool::new(true);

    let best = search.run_until(&stop).expect("solvable").clone();
    assert!((best.cost() - greedy.cost()).abs() < 1e-9);
    assert!(best.is_feasible(&problem));

    let stats = search.stats.expect("stats recorded");
    assert_eq!(stats.termination, TerminationReason::Cancelled);
    assert_eq!(stats.iterations, 0);
}

#[test]
fn test_time_limit_terminates() {
    let problem = create_ring_problem();
    let config = Config::new()
        .with_max_iterations(u64::MAX)
        .with_time_limit(Duration::from_millis(50))
        .with_seed(1);

    let mut search = TabuSearch::new(problem.clone(), config);
    let best = search.run().expect("solvable").clone();

    assert!(best.is_feasible(&problem));
    let stats = search.stats.expect("stats recorded");
    assert_eq!(stats.termination, TerminationReason::TimeLimit);
}

#[test]
fn test_split_delivery_end_to_end() {
    // 1 depot, demands 6 and 4, capacity 5: serving customer 1 takes a
    // split delivery
    let mut nodes = vec![Node::new(0, 0.0, 0.0, 0.0, true)];
    nodes.push(Node::new(1, 10.0, 0.0, 6.0, false));
    nodes.push(Node::new(2, 0.0, 10.0, 4.0, false));
    let problem =
        Problem::new("Split".to_string(), nodes, 0, 5.0, None, None).expect("valid test problem");

    let config = Config::new().with_max_iterations(200).with_seed(5);
    let solution = solve(problem.clone(), config).expect("solvable");

    assert!(solution.is_feasible(&problem));
    assert!(solution.split_count(1) >= 2);

    let delivered = solution.delivered_quantities(&problem);
    assert!((delivered[1] - 6.0).abs() < 1e-6);
    assert!((delivered[2] - 4.0).abs() < 1e-6);
    for route in &solution.routes {
        assert!(route.load <= 5.0 + 1e-9);
    }
}

#[test]
fn test_single_customer_trivial_instance() {
    let mut nodes = vec![Node::new(0, 0.0, 0.0, 0.0, true)];
    nodes.push(Node::new(1, 7.0, 0.0, 3.0, false));
    let problem =
        Problem::new("Trivial".to_string(), nodes, 0, 5.0, None, None).expect("valid test problem");

    let config = Config::new().with_max_iterations(100).with_seed(1);
    let solution = solve(problem.clone(), config).expect("solvable");

    // One route, no split, the depot round trip
    assert_eq!(solution.get_route_count(), 1);
    assert_eq!(solution.split_count(1), 1);
    assert!((solution.cost() - 14.0).abs() < 1e-9);
}

#[test]
fn test_infeasible_instance_fails_before_search() {
    let mut nodes = vec![Node::new(0, 0.0, 0.0, 0.0, true)];
    nodes.push(Node::new(1, 10.0, 0.0, 8.0, false));
    nodes.push(Node::new(2, 0.0, 10.0, 8.0, false));
    let problem = Problem::new("TooMuch".to_string(), nodes, 0, 5.0, Some(2), None)
        .expect("valid test problem");

    match solve(problem, Config::new()) {
        Err(SolverError::InfeasibleInstance(_)) => {}
        other => panic!("expected InfeasibleInstance, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_first_improvement_policy_also_solves() {
    let problem = create_ring_problem();
    let config = Config::new()
        .with_max_iterations(200)
        .with_policy(SelectionPolicy::FirstImprovement)
        .with_seed(3);

    let solution = solve(problem.clone(), config).expect("solvable");
    assert!(solution.is_feasible(&problem));
}

#[test]
fn test_independent_solves_share_nothing() {
    let problem = create_ring_problem();

    let config_a = Config::new().with_max_iterations(100).with_seed(11);
    let config_b = Config::new().with_max_iterations(100).with_seed(11);

    let mut search_a = TabuSearch::new(problem.clone(), config_a);
    let mut search_b = TabuSearch::new(problem.clone(), config_b);

    let best_a = search_a.run().expect("solvable").clone();
    let best_b = search_b.run().expect("solvable").clone();

    // Identical seeds on isolated state machines give identical runs
    assert_eq!(best_a.cost(), best_b.cost());
}
