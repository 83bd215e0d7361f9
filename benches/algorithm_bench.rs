//! Benchmarks for the SD-VRP tabu search.

#[cfg(feature = "bench")]
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

#[cfg(feature = "bench")]
use rand::SeedableRng;
#[cfg(feature = "bench")]
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "bench")]
use sdvrp_tabu::config::Config;
#[cfg(feature = "bench")]
use sdvrp_tabu::construction::build_initial;
#[cfg(feature = "bench")]
use sdvrp_tabu::moves::MoveGenerator;
#[cfg(feature = "bench")]
use sdvrp_tabu::problem::{Node, Problem};
#[cfg(feature = "bench")]
use sdvrp_tabu::tabu::{SearchState, TabuController};

/// Create a benchmark problem of specified size.
#[cfg(feature = "bench")]
fn create_benchmark_problem(size: usize) -> Problem {
    let mut nodes = Vec::new();

    // Depot
    nodes.push(Node::new(0, 0.0, 0.0, 0.0, true));

    // Customers in a grid arrangement
    let grid_size = (size as f64).sqrt().ceil() as usize;
    for i in 1..=size {
        let row = (i - 1) / grid_size;
        let col = (i - 1) % grid_size;
        let x = col as f64 * 10.0;
        let y = row as f64 * 10.0;
        nodes.push(Node::new(i, x, y, 1.0 + (i % 3) as f64, false));
    }

    Problem::new(
        format!("BenchProblem_{}", size),
        nodes,
        0,
        10.0,
        None,
        None,
    )
    .expect("valid benchmark problem")
}

#[cfg(feature = "bench")]
fn benchmark_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    for size in [50, 100, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);

            b.iter(|| build_initial(&problem).expect("feasible"));
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_candidate_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_generation");

    for size in [50, 100, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);
            let config = Config::new();
            let generator = MoveGenerator::new(&problem, config.granularity);
            let solution = build_initial(&problem).expect("feasible");

            b.iter(|| generator.generate(&solution, &problem));
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_search_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_steps");

    for size in [50, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);
            let config = Config::new();
            let generator = MoveGenerator::new(&problem, config.granularity);
            let initial = build_initial(&problem).expect("feasible");

            b.iter(|| {
                let mut controller = TabuController::new(&config);
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
                let mut state = SearchState::new(initial.clone());
                for _ in 0..10 {
                    controller.step(&mut state, &generator, &problem, &mut rng);
                }
                state.best_cost
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
criterion_group!(
    benches,
    benchmark_construction,
    benchmark_candidate_generation,
    benchmark_search_steps
);

#[cfg(feature = "bench")]
criterion_main!(benches);

#[cfg(not(feature = "bench"))]
fn main() {}
