use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use std::{fmt, fs};

use chrono::{DateTime, Utc};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithms::{CancellationSignal, MaxGeneration, ResultsSink, StoppingCondition};
use crate::core::utils::sub_stream;
use crate::core::{DataValue, Individual, IndividualExport, OError, Population, Problem, ProblemExport};
use crate::utils::non_dominated_front;

/// The step an algorithm is running.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// The algorithm was created and the initial population is being generated.
    Initializing,
    /// The individuals are being evaluated.
    Evaluating,
    /// The individuals are being sorted into non-dominated fronts.
    Sorting,
    /// The objectives are being normalised and associated with the reference points.
    Normalizing,
    /// The individuals surviving to the next generation are being selected.
    Selecting,
    /// The run ended.
    Terminated,
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

/// Why a run stopped.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// The generation counter reached the [`MaxGeneration`] target.
    MaxGenerationReached,
    /// The cancellation signal was raised.
    Cancelled,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
/// The data with the elapsed time.
pub struct Elapsed {
    /// Elapsed hours.
    pub hours: u64,
    /// Elapsed minutes.
    pub minutes: u64,
    /// Elapsed seconds.
    pub seconds: u64,
}

#[derive(Serialize, Debug)]
/// The struct used to export an algorithm serialised data.
pub struct AlgorithmSerialisedExport<T: Serialize> {
    /// Specific options for an algorithm.
    pub options: T,
    /// The problem configuration.
    pub problem: ProblemExport,
    /// The individuals in the population.
    pub individuals: Vec<IndividualExport>,
    /// The generation the export was collected at.
    pub generation: usize,
    /// The algorithm name.
    pub algorithm: String,
    /// Any additional data exported by the algorithm.
    pub additional_data: Option<HashMap<String, DataValue>>,
    /// The time took to reach the `generation`.
    pub took: Elapsed,
    /// When the data was exported.
    pub exported_on: DateTime<Utc>,
}

/// The struct used to export an algorithm data.
#[derive(Debug)]
pub struct AlgorithmExport {
    /// The problem.
    pub problem: Arc<Problem>,
    /// The individuals with the solutions and objective values at the current generation.
    pub individuals: Vec<Individual>,
    /// The generation number.
    pub generation: usize,
    /// The algorithm name used to evolve the individuals.
    pub algorithm: String,
    /// The time the algorithm took to reach the current generation.
    pub took: Elapsed,
}

impl AlgorithmExport {
    /// Get the objective values, with the sign set on the problem, of all individuals.
    ///
    /// returns: `Vec<Vec<f64>>`
    pub fn objective_values(&self) -> Vec<Vec<f64>> {
        self.individuals
            .iter()
            .map(|i| i.user_objective_values())
            .collect()
    }
}

impl Display for AlgorithmExport {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{} at {} generations, took {} hours, {} minutes and {} seconds",
            self.algorithm, self.generation, self.took.hours, self.took.minutes, self.took.seconds
        )
    }
}

/// The trait to use to implement an algorithm.
pub trait Algorithm<AlgorithmOptions: Serialize>: Display {
    /// Initialise the algorithm: generate and evaluate the initial population. The generation
    /// counter is left to `0`.
    ///
    /// return: `Result<(), OError>`
    fn initialise(&mut self) -> Result<(), OError>;

    /// Evolve the population by one generation.
    ///
    /// return: `Result<(), OError>`
    fn evolve(&mut self) -> Result<(), OError>;

    /// Return the current step of the algorithm evolution.
    ///
    /// return: `usize`.
    fn generation(&self) -> usize;

    /// Return the algorithm name.
    ///
    /// return: `String`.
    fn name(&self) -> String;

    /// Get the time when the algorithm started.
    ///
    /// return: `&Instant`.
    fn start_time(&self) -> &Instant;

    /// Return the stopping condition.
    ///
    /// return: `&MaxGeneration`.
    fn stopping_condition(&self) -> &MaxGeneration;

    /// Return the evolved population.
    ///
    /// return: `&Population`.
    fn population(&self) -> &Population;

    /// Return the problem.
    ///
    /// return: `Arc<Problem>`.
    fn problem(&self) -> Arc<Problem>;

    /// Return the step the algorithm is running.
    ///
    /// return: `RunState`.
    fn state(&self) -> RunState;

    /// Move the algorithm to a new step.
    ///
    /// # Arguments
    ///
    /// * `state`: The new step.
    fn set_state(&mut self, state: RunState);

    /// The options used to configure the algorithm.
    ///
    /// return: `AlgorithmOptions`.
    fn algorithm_options(&self) -> AlgorithmOptions;

    /// Export additional data stored by the algorithm.
    ///
    /// return: `Option<HashMap<String, DataValue>>`
    fn additional_export_data(&self) -> Option<HashMap<String, DataValue>> {
        None
    }

    /// Get the elapsed hours, minutes and seconds since the start of the algorithm.
    ///
    /// return: `[u64; 3]`. An array with the number of elapsed hours, minutes and seconds.
    fn elapsed(&self) -> [u64; 3] {
        let duration = self.start_time().elapsed();
        let seconds = duration.as_secs() % 60;
        let minutes = (duration.as_secs() / 60) % 60;
        let hours = (duration.as_secs() / 60) / 60;
        [hours, minutes, seconds]
    }

    /// Format the elapsed time as string.
    ///
    /// return: `String`.
    fn elapsed_as_string(&self) -> String {
        let [hours, minutes, seconds] = self.elapsed();
        format!(
            "{:0>2} hours, {:0>2} minutes and {:0>2} seconds",
            hours, minutes, seconds
        )
    }

    /// Evaluate the individuals in threads. Each individual gets its own random number generator
    /// seeded with the item in `seeds` at the same position, so the results do not depend on the
    /// thread scheduling. The outcome of each evaluation is returned in the individuals' order.
    ///
    /// # Arguments
    ///
    /// * `individuals`: The individuals to evaluate.
    /// * `seeds`: The seeds of the evaluation random number generators.
    ///
    /// return `Vec<Result<(), OError>>`
    fn do_parallel_evaluation(individuals: &mut [Individual], seeds: &[u64]) -> Vec<Result<(), OError>> {
        individuals
            .par_iter_mut()
            .zip(seeds.par_iter())
            .enumerate()
            .map(|(idx, (i, seed))| Self::evaluate_individual(idx, i, *seed))
            .collect()
    }

    /// Evaluate the individuals in a plain loop. See [`Self::do_parallel_evaluation`].
    ///
    /// # Arguments
    ///
    /// * `individuals`: The individuals to evaluate.
    /// * `seeds`: The seeds of the evaluation random number generators.
    ///
    /// return `Vec<Result<(), OError>>`
    fn do_evaluation(individuals: &mut [Individual], seeds: &[u64]) -> Vec<Result<(), OError>> {
        individuals
            .iter_mut()
            .zip(seeds)
            .enumerate()
            .map(|(idx, (i, seed))| Self::evaluate_individual(idx, i, *seed))
            .collect()
    }

    /// Evaluate the objectives of one individual. This returns an error if the evaluation
    /// function fails, returns a `NaN`, an infinite value or the wrong number of objectives.
    ///
    /// # Arguments
    ///
    /// * `idx`: The individual index.
    /// * `individual`: The individual to evaluate.
    /// * `seed`: The seed of the random number generator given to the evaluator.
    ///
    /// return `Result<(), OError>`
    fn evaluate_individual(idx: usize, i: &mut Individual, seed: u64) -> Result<(), OError> {
        debug!("Evaluating individual #{} - {}", idx + 1, i.genome());

        // skip evaluated solutions
        if i.is_evaluated() {
            debug!("Skipping evaluation for individual #{idx}. Already evaluated.");
            return Ok(());
        }
        let problem = i.problem();
        let mut rng = sub_stream(seed);
        let results = problem
            .evaluator()
            .evaluate(i.genome(), &mut rng)
            .map_err(|e| OError::Evaluation(e.to_string()))?;

        i.update_objectives(results)?;
        i.set_evaluated();
        Ok(())
    }

    /// The objective values, with the sign set on the problem, of the individuals in the first
    /// non-dominated front of the population.
    ///
    /// return: `Result<Vec<Vec<f64>>, OError>`
    fn best_objectives(&self) -> Result<Vec<Vec<f64>>, OError> {
        let individuals = self.population().individuals();
        Ok(non_dominated_front(individuals)?
            .into_iter()
            .map(|i| individuals[i].user_objective_values())
            .collect())
    }

    /// Run the algorithm until the stopping condition is met or the cancellation signal is
    /// raised. The signal is checked before the first generation and after each generation; a
    /// generation being evolved is always completed. The best objectives are reported to `sink`
    /// after the initialisation and after each generation.
    ///
    /// # Arguments
    ///
    /// * `sink`: Where to send the intermediate results.
    /// * `cancel`: The cancellation signal.
    ///
    /// return: `Result<TerminationReason, OError>`
    fn run(
        &mut self,
        sink: &mut dyn ResultsSink,
        cancel: &dyn CancellationSignal,
    ) -> Result<TerminationReason, OError> {
        info!("Starting {}", self.name());
        self.initialise()?;
        sink.report(self.generation(), &self.best_objectives()?)?;

        let reason = loop {
            if self.stopping_condition().is_met(self.generation()) {
                info!(
                    "Stopping evolution because the {} was reached",
                    MaxGeneration::name()
                );
                break TerminationReason::MaxGenerationReached;
            }
            if cancel.is_cancelled() {
                info!("Stopping evolution because the run was cancelled");
                break TerminationReason::Cancelled;
            }

            info!("Generation #{}", self.generation() + 1);
            self.evolve()?;
            info!(
                "Evolved generation #{} - Elapsed Time: {}",
                self.generation(),
                self.elapsed_as_string()
            );
            sink.report(self.generation(), &self.best_objectives()?)?;
        };

        self.set_state(RunState::Terminated);
        info!("Took {}", self.elapsed_as_string());
        Ok(reason)
    }

    /// Get the results of the run.
    ///
    /// return: `AlgorithmExport`.
    fn get_results(&self) -> AlgorithmExport {
        let [hours, minutes, seconds] = self.elapsed();
        AlgorithmExport {
            problem: self.problem(),
            individuals: self.population().individuals().to_vec(),
            generation: self.generation(),
            algorithm: self.name(),
            took: Elapsed {
                hours,
                minutes,
                seconds,
            },
        }
    }

    /// Save the algorithm data (individuals' genomes and objectives, the problem, the options)
    /// to a JSON file. This returns an error if the file cannot be saved.
    ///
    /// # Arguments
    ///
    /// * `destination`: The folder where to save the file.
    /// * `file_prefix`: A prefix to prepend at the beginning of the file name. This is
    ///    `Results` when `None`.
    ///
    /// return `Result<(), OError>`
    fn save_to_json(&self, destination: &Path, file_prefix: Option<&str>) -> Result<(), OError> {
        let file_prefix = file_prefix.unwrap_or("Results");

        let [hours, minutes, seconds] = self.elapsed();
        let export = AlgorithmSerialisedExport {
            options: self.algorithm_options(),
            problem: self.problem().serialise(),
            individuals: self.population().serialise(),
            generation: self.generation(),
            algorithm: self.name(),
            additional_data: self.additional_export_data(),
            took: Elapsed {
                hours,
                minutes,
                seconds,
            },
            exported_on: Utc::now(),
        };
        let data = serde_json::to_string_pretty(&export).map_err(|e| {
            OError::AlgorithmExport(format!(
                "The following error occurred while converting the history struct: {e}"
            ))
        })?;

        let file = destination.join(format!(
            "{}_{}_gen{}.json",
            file_prefix,
            self.name(),
            self.generation()
        ));

        info!("Saving JSON file {:?}", file);
        fs::write(file, data).map_err(|e| {
            OError::AlgorithmExport(format!(
                "The following error occurred while exporting the history JSON file: {e}",
            ))
        })?;
        Ok(())
    }
}
