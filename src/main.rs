//! Command-line entry point for the SD-VRP tabu search solver.

use clap::Parser;
use sdvrp_tabu::config::Config;
use sdvrp_tabu::problem::Problem;
use sdvrp_tabu::utils::{format_duration, format_solution};
use sdvrp_tabu::TabuSearch;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Tabu search solver for the Split Delivery Vehicle Routing Problem.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Instance file: `n Q` header, demand line, then coordinate lines
    /// (depot first)
    instance: PathBuf,

    /// Write the solution report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Iteration cap for the search
    #[arg(long, default_value_t = 10_000)]
    iterations: u64,

    /// Wall-clock budget in seconds
    #[arg(long)]
    time_limit_secs: Option<u64>,

    /// Seed for the search's random source
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Emit the solution as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let problem = Problem::from_file(&args.instance)?;
    println!(
        "Loaded instance {} with {} customers",
        problem.name,
        problem.get_customer_count()
    );

    let mut config = Config::new()
        .with_max_iterations(args.iterations)
        .with_seed(args.seed);
    if let Some(secs) = args.time_limit_secs {
        config = config.with_time_limit(Duration::from_secs(secs));
    }

    let mut search = TabuSearch::new(problem, config);
    let best = search.run()?;

    let report = if args.json {
        serde_json::to_string_pretty(best)?
    } else {
        format_solution(best)
    };

    match &args.output {
        Some(path) => std::fs::write(path, report)?,
        None => print!("{}", report),
    }

    if let Some(stats) = &search.stats {
        println!(
            "Search finished in {} after {} iterations, best cost {:.2}",
            format_duration(stats.runtime),
            stats.iterations,
            stats.best_cost
        );
    }

    Ok(())
}
