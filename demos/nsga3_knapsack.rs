use std::env;
use std::error::Error;
use std::thread;
use std::time::Duration;

use log::LevelFilter;

use binsga3::algorithms::{
    Algorithm, CancellationToken, JsonFileSink, MaxGeneration, NSGA3Arg,
    Nsga3NumberOfIndividuals, NSGA3,
};
use binsga3::core::builtin_problems::KnapsackProblem;
use binsga3::operators::CrossoverOperatorOptions;
use binsga3::utils::NumberOfPartitions;

/// Solve the 0/1 knapsack problem with 250 items and 5 knapsacks. The reference points are
/// the ones suggested in the paper for 5 objectives and the population has the same size.
///
/// The run is cancelled after 20 seconds if the maximum number of generations is not reached
/// before. The first non-dominated front is exported to a JSON file in the temporary folder
/// every 50 generations.
///
/// Make sure to compile this in release mode to speed up the calculation:
///
/// `cargo run --example nsga3_knapsack --release`
fn main() -> Result<(), Box<dyn Error>> {
    // Add log
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let number_of_objectives = 5;
    let problem = KnapsackProblem::create(250, number_of_objectives, 1)?;

    let args = NSGA3Arg {
        number_of_individuals: Nsga3NumberOfIndividuals::FromReferencePoints,
        number_of_partitions: NumberOfPartitions::suggested(number_of_objectives),
        crossover_operator_options: Some(CrossoverOperatorOptions::SinglePoint {
            crossover_probability: 0.9,
        }),
        // 1/L bit-flip mutation
        mutation_operator_options: None,
        stopping_condition: MaxGeneration(500),
        parallel: Some(true),
        seed: Some(1234),
    };
    let mut algo = NSGA3::new(problem, args)?;

    // Cancel the run from another thread
    let token = CancellationToken::new();
    let handle = token.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(20));
        handle.cancel();
    });

    let destination = env::temp_dir();
    let mut sink = JsonFileSink::new(
        50,
        destination.to_str().ok_or("Invalid temporary folder")?,
        "knapsack_5obj",
    )?;
    let reason = algo.run(&mut sink, &token)?;
    println!("Stopped at generation {} because {:?}", algo.generation(), reason);

    // Export the last population
    algo.save_to_json(&destination, Some("Knapsack_5obj"))?;

    Ok(())
}
