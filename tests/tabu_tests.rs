//! Unit tests for the tabu list and the search controller.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sdvrp_tabu::config::Config;
use sdvrp_tabu::moves::{MoveGenerator, MoveSignature};
use sdvrp_tabu::problem::{Node, Problem};
use sdvrp_tabu::solution::{Route, Solution, Stop};
use sdvrp_tabu::tabu::{SearchState, TabuController, TabuList};

/// Creates a simple test problem with a depot and four customers.
fn create_test_problem() -> Problem {
    let mut nodes = Vec::new();

    nodes.push(Node::new(0, 0.0, 0.0, 0.0, true));
    nodes.push(Node::new(1, 10.0, 0.0, 2.0, false));
    nodes.push(Node::new(2, 12.0, 2.0, 2.0, false));
    nodes.push(Node::new(3, 0.0, 10.0, 2.0, false));
    nodes.push(Node::new(4, 2.0, 12.0, 2.0, false));

    Problem::new("TabuProblem".to_string(), nodes, 0, 5.0, None, None)
        .expect("valid test problem")
}

/// A deliberately bad pairing: each route mixes one east and one north
/// customer, so relocations have room to improve.
fn create_test_state(problem: &Problem) -> SearchState {
    let mut solution = Solution::new();

    let mut route1 = Route::new();
    route1.stops = vec![Stop::new(1, 2.0), Stop::new(3, 2.0)];
    let mut route2 = Route::new();
    route2.stops = vec![Stop::new(2, 2.0), Stop::new(4, 2.0)];

    solution.routes = vec![route1, route2];
    solution.evaluate(problem);
    assert!(solution.is_feasible(problem));
    SearchState::new(solution)
}

#[test]
fn test_tabu_list_expiry() {
    let mut list = TabuList::new();
    assert!(list.is_empty());

    list.insert(MoveSignature::Relocate(1), 10);
    assert!(list.is_tabu(&MoveSignature::Relocate(1), 5));
    assert!(list.is_tabu(&MoveSignature::Relocate(1), 9));
    // The ban is spent once the expiry iteration is reached
    assert!(!list.is_tabu(&MoveSignature::Relocate(1), 10));
    assert!(!list.is_tabu(&MoveSignature::Split(1), 5));

    assert_eq!(list.len(), 1);
    list.purge_expired(10);
    assert!(list.is_empty());
}

#[test]
fn test_tabu_list_distinguishes_signatures() {
    let mut list = TabuList::new();
    list.insert(MoveSignature::Split(2), 100);
    list.insert(MoveSignature::Exchange(1, 3), 100);

    assert!(list.is_tabu(&MoveSignature::Split(2), 50));
    assert!(!list.is_tabu(&MoveSignature::Merge(2), 50));
    assert!(list.is_tabu(&MoveSignature::Exchange(1, 3), 50));
    assert!(!list.is_tabu(&MoveSignature::Exchange(1, 2), 50));

    list.clear();
    assert!(list.is_empty());
}

#[test]
fn test_step_applies_a_move_and_remembers_it() {
    let problem = create_test_problem();
    let config = Config::new();
    let mut controller = TabuController::new(&config);
    let generator = MoveGenerator::new(&problem, config.granularity);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut state = create_test_state(&problem);

    let outcome = controller.step(&mut state, &generator, &problem, &mut rng);

    assert_eq!(state.iteration, 1);
    assert!(outcome.applied.is_some());
    assert!(state.current.is_feasible(&problem));
    assert!(!controller.tabu_list.is_empty());
}

#[test]
fn test_step_improves_cost_on_bad_pairing() {
    let problem = create_test_problem();
    let config = Config::new();
    let mut controller = TabuController::new(&config);
    let generator = MoveGenerator::new(&problem, config.granularity);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut state = create_test_state(&problem);
    let initial_cost = state.current.cost();

    // The mixed pairing leaves an improving exchange; a few steps must
    // find strictly better solutions.
    for _ in 0..5 {
        controller.step(&mut state, &generator, &problem, &mut rng);
    }

    assert!(state.best_cost < initial_cost - 1e-6);
    assert!(state.best.is_feasible(&problem));
}

#[test]
fn test_best_solution_never_aliases_current() {
    let problem = create_test_problem();
    let config = Config::new();
    let mut controller = TabuController::new(&config);
    let generator = MoveGenerator::new(&problem, config.granularity);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut state = create_test_state(&problem);

    for _ in 0..10 {
        controller.step(&mut state, &generator, &problem, &mut rng);
        // The recorded best stays feasible and internally consistent even
        // as the walker keeps mutating the current solution.
        let recomputed: f64 = {
            let mut copy = state.best.clone();
            for route in &mut copy.routes {
                route.modified = true;
            }
            copy.evaluate(&problem);
            copy.cost()
        };
        assert!((recomputed - state.best_cost).abs() < 1e-6);
    }
}

#[test]
fn test_aspiration_overrides_tabu() {
    let problem = create_test_problem();
    let config = Config::new();
    let mut controller = TabuController::new(&config);
    let generator = MoveGenerator::new(&problem, config.granularity);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut state = create_test_state(&problem);

    // Ban every family for every customer, far beyond the horizon
    for customer in problem.customer_indices() {
        controller.tabu_list.insert(MoveSignature::Relocate(customer), u64::MAX);
        controller.tabu_list.insert(MoveSignature::Split(customer), u64::MAX);
        controller.tabu_list.insert(MoveSignature::Merge(customer), u64::MAX);
        for other in problem.customer_indices() {
            controller
                .tabu_list
                .insert(MoveSignature::Exchange(customer.min(other), customer.max(other)), u64::MAX);
        }
    }

    let initial_cost = state.current.cost();
    let outcome = controller.step(&mut state, &generator, &problem, &mut rng);

    // A globally improving move exists, so aspiration must let one through
    assert!(outcome.applied.is_some());
    assert!(state.current.cost() < initial_cost - 1e-6);
    assert!(outcome.improved_best);
}

#[test]
fn test_diversification_fires_after_stagnation() {
    let problem = create_test_problem();
    // Threshold 0 forces diversification on the first non-improving step
    let config = Config::new()
        .with_stagnation_threshold(0)
        .with_diversification_strength(3);
    let mut controller = TabuController::new(&config);
    let generator = MoveGenerator::new(&problem, config.granularity);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut state = create_test_state(&problem);

    let mut diversified = false;
    for _ in 0..30 {
        let outcome = controller.step(&mut state, &generator, &problem, &mut rng);
        if outcome.diversified {
            diversified = true;
            assert_eq!(state.stagnation, 0);
        }
        assert!(state.current.is_feasible(&problem));
    }
    assert!(diversified);

    // The best solution survives diversification untouched
    assert!(state.best.is_feasible(&problem));
}
