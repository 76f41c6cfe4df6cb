use std::error::Error;

use log::LevelFilter;

use binsga3::algorithms::{
    Algorithm, HistorySink, MaxGeneration, NSGA3Arg, NeverCancelled, Nsga3NumberOfIndividuals,
    NSGA3,
};
use binsga3::core::builtin_problems::OneMinMaxProblem;
use binsga3::utils::NumberOfPartitions;

/// Solve the OneMinMax problem where the number of ones and the number of zeros in a genome of
/// 10 bits are both maximised. Every solution is Pareto-optimal and the front has 11 distinct
/// points, one per number of ones.
///
/// `cargo run --example nsga3_one_min_max --release`
fn main() -> Result<(), Box<dyn Error>> {
    // Add log
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let problem = OneMinMaxProblem::create(10)?;

    let args = NSGA3Arg {
        // 20 individuals and 13 reference points with 12 gaps on the 2-objective simplex
        number_of_individuals: Nsga3NumberOfIndividuals::Custom(20),
        number_of_partitions: NumberOfPartitions::OneLayer(12),
        // uniform crossover and 1/L bit-flip mutation
        crossover_operator_options: None,
        mutation_operator_options: None,
        stopping_condition: MaxGeneration(50),
        parallel: Some(false),
        seed: Some(1234),
    };
    let mut algo = NSGA3::new(problem, args)?;

    // Keep the best objectives at each generation
    let mut history = HistorySink::new();
    let reason = algo.run(&mut history, &NeverCancelled)?;
    println!("Stopped because {:?}", reason);

    let results = algo.get_results();
    println!("{}", results);
    let mut points = results.objective_values();
    points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    points.dedup();
    println!("Found {} distinct points: {:?}", points.len(), points);

    Ok(())
}
