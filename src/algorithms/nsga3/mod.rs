use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rand::RngCore;
use serde::{Deserialize, Serialize};

pub(crate) use associate::AssociateToRefPoint;
pub(crate) use niching::Niching;
pub(crate) use normalise::Normalise;

use crate::algorithms::{Algorithm, MaxGeneration, RunState};
use crate::core::utils::{get_rng, sub_stream_seeds};
use crate::core::{BinaryVector, DataValue, Individual, OError, Population, Problem};
use crate::operators::{
    BitFlipMutation, BitFlipMutationArgs, Crossover, CrossoverOperatorOptions, Mutation,
    RandomSelector, Selector,
};
use crate::utils::{fast_non_dominated_sort, DasDarren1998, NumberOfPartitions};

mod associate;
mod niching;
mod normalise;

/// The data key where the normalised objectives are stored for each [`Individual`].
pub const NORMALISED_OBJECTIVE_KEY: &str = "normalised_objectives";

/// The data key where the reference point index, the individual is associated with, is stored.
pub const REF_POINT_INDEX: &str = "reference_point_index";

/// The data key where the coordinates of the associated reference point are stored.
pub const REF_POINT: &str = "reference_point";

/// The data key where the perpendicular distance from the associated reference line is stored.
pub const MIN_DISTANCE: &str = "distance";

/// The number of individuals to use in the population.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Nsga3NumberOfIndividuals {
    /// Use as many individuals as reference points.
    FromReferencePoints,
    /// Use a custom number of individuals. This must be at least `3`.
    Custom(usize),
}

/// Input arguments for the NSGA3 algorithm.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NSGA3Arg {
    /// The number of individuals in the population.
    pub number_of_individuals: Nsga3NumberOfIndividuals,
    /// The number of partitions used to generate the reference points with the Das & Darren
    /// (1998) method. Use [`NumberOfPartitions::suggested`] for the values in Table I of the
    /// paper.
    pub number_of_partitions: NumberOfPartitions,
    /// The crossover operator used to generate new children by recombining the bits of parent
    /// solutions. This defaults to [`CrossoverOperatorOptions::default()`] (uniform crossover
    /// with probability `1`).
    pub crossover_operator_options: Option<CrossoverOperatorOptions>,
    /// The options of the bit-flip mutation operator. This defaults to
    /// [`BitFlipMutationArgs::default()`] with a probability of flipping each bit equal to `1`
    /// divided by the number of bits in the genome.
    pub mutation_operator_options: Option<BitFlipMutationArgs>,
    /// The condition to use when to terminate the algorithm.
    pub stopping_condition: MaxGeneration,
    /// Whether the objective evaluation should run using threads. This defaults to `true`.
    pub parallel: Option<bool>,
    /// The seed used in the random number generator (RNG). You can specify a seed in case you want
    /// to try to reproduce results. When `None` the generator is seeded from the operating system.
    pub seed: Option<u64>,
}

/// The Non-dominated Sorting Genetic Algorithm (NSGA3) for problems whose solutions are vectors
/// of bits.
///
/// Implemented based on:
/// > K. Deb and H. Jain, "An Evolutionary Many-Objective Optimization Algorithm Using
/// > Reference-Point-Based Nondominated Sorting Approach, Part I: Solving Problems With Box
/// > Constraints," in IEEE Transactions on Evolutionary Computation, vol. 18, no. 4, pp. 577-601,
/// > Aug. 2014, doi: 10.1109/TEVC.2013.2281535.
///
/// See: <https://10.1109/TEVC.2013.2281535>.
///
/// # Example
/// ```rust
#[doc = include_str!("../../../demos/nsga3_one_min_max.rs")]
/// ```
pub struct NSGA3 {
    /// The number of individuals to use in the population.
    number_of_individuals: usize,
    /// The problem being solved.
    problem: Arc<Problem>,
    /// The population being evolved.
    population: Population,
    /// The reference points on the unit simplex.
    reference_points: Vec<Vec<f64>>,
    /// The operator to use to select the parents. NSGA3 picks them at random.
    selector_operator: RandomSelector,
    /// The operator to use to generate new children by recombining the bits of two parents.
    crossover_operator: Box<dyn Crossover + Send + Sync>,
    /// The operator to use to flip the bits of an offspring.
    mutation_operator: BitFlipMutation,
    /// The current generation.
    generation: usize,
    /// The number of function evaluations.
    nfe: usize,
    /// The number of generations where the hyper-plane through the extreme points was degenerate.
    degenerate_hyperplanes: usize,
    /// The stopping condition.
    stopping_condition: MaxGeneration,
    /// The time when the algorithm was created.
    start_time: Instant,
    /// Whether the evaluation should run using threads.
    parallel: bool,
    /// The step the algorithm is running.
    state: RunState,
    /// The random number generator.
    rng: Box<dyn RngCore + Send>,
    /// The algorithm options.
    args: NSGA3Arg,
}

impl Display for NSGA3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name().as_str())
    }
}

impl NSGA3 {
    /// Initialise the NSGA3 algorithm. This returns an error if the problem has less than 2
    /// objectives, the population has less than 3 individuals, the reference points cannot be
    /// generated or an operator option is not valid.
    ///
    /// # Arguments
    ///
    /// * `problem`: The problem being solved.
    /// * `options`: The [`NSGA3Arg`] arguments to customise the algorithm behaviour.
    ///
    /// returns: `Result<NSGA3, OError>`.
    pub fn new(problem: Problem, options: NSGA3Arg) -> Result<Self, OError> {
        let name = "NSGA3".to_string();
        if problem.number_of_objectives() < 2 {
            return Err(OError::Configuration(format!(
                "{name} needs at least 2 objectives, but the problem has {}",
                problem.number_of_objectives()
            )));
        }
        if options.stopping_condition.0 < 1 {
            return Err(OError::Configuration(
                "The maximum number of generations must be at least 1".to_string(),
            ));
        }

        let das_darren = DasDarren1998::new(
            problem.number_of_objectives(),
            &options.number_of_partitions,
        )?;
        let reference_points = das_darren.get_weights();
        info!("Created {} reference points", reference_points.len());

        let number_of_individuals = match options.number_of_individuals {
            Nsga3NumberOfIndividuals::FromReferencePoints => reference_points.len(),
            Nsga3NumberOfIndividuals::Custom(n) => n,
        };
        if number_of_individuals < 3 {
            return Err(OError::Configuration(format!(
                "The population size ({number_of_individuals}) must have at least 3 individuals"
            )));
        }
        if number_of_individuals < reference_points.len() {
            warn!(
                "The population size ({number_of_individuals}) is smaller than the number of \
                reference points ({}). Some reference points will not be associated with any \
                individual",
                reference_points.len()
            );
        }

        let problem = Arc::new(problem);
        let mutation_options = match &options.mutation_operator_options {
            Some(o) => o.clone(),
            None => BitFlipMutationArgs::default(&problem),
        };
        let mutation_operator = BitFlipMutation::new(mutation_options.clone())?;

        let crossover_options = options.crossover_operator_options.clone().unwrap_or_default();
        let crossover_operator = crossover_options.build()?;

        info!(
            "{}",
            Self::algorithm_option_str(
                &problem,
                number_of_individuals,
                reference_points.len(),
                &crossover_options,
                &mutation_options
            )
        );

        Ok(Self {
            number_of_individuals,
            problem,
            population: Population::new(),
            reference_points,
            selector_operator: RandomSelector,
            crossover_operator,
            mutation_operator,
            generation: 0,
            nfe: 0,
            degenerate_hyperplanes: 0,
            stopping_condition: options.stopping_condition.clone(),
            start_time: Instant::now(),
            parallel: options.parallel.unwrap_or(true),
            state: RunState::Initializing,
            rng: get_rng(options.seed),
            args: options,
        })
    }

    /// Get a string listing the algorithm options.
    ///
    /// # Arguments
    ///
    /// * `problem`: The problem.
    /// * `number_of_individuals`: The population size.
    /// * `number_of_reference_points`: The number of reference points.
    /// * `crossover_options`: The crossover operator options.
    /// * `mutation_options`: The mutation operator options.
    ///
    /// returns: `String`
    pub fn algorithm_option_str(
        problem: &Arc<Problem>,
        number_of_individuals: usize,
        number_of_reference_points: usize,
        crossover_options: &CrossoverOperatorOptions,
        mutation_options: &BitFlipMutationArgs,
    ) -> String {
        let mut log_opts: String = "Algorithm options are:\n".to_owned();
        log_opts.push_str(
            format!(
                "\t* Number of bits {:>18}\n\t* Number of objectives {:>12}\n",
                problem.genome_length(),
                problem.number_of_objectives(),
            )
            .as_str(),
        );
        log_opts.push_str(
            format!(
                "\t* Population size {:>17}\n\t* Reference points {:>16}\n",
                number_of_individuals, number_of_reference_points,
            )
            .as_str(),
        );
        log_opts.push_str(
            format!(
                "\t* Crossover {}\n\t* Mutation bit probability {:>8}",
                crossover_options, mutation_options.bit_probability,
            )
            .as_str(),
        );
        log_opts
    }

    /// Get the normalised objectives stored in an individual. This returns an error if the data
    /// is not set.
    ///
    /// # Arguments
    ///
    /// * `individual`: The individual.
    ///
    /// returns: `Result<DataValue, OError>`
    pub fn get_normalised_objectives(individual: &Individual) -> Result<DataValue, OError> {
        individual.get_data(NORMALISED_OBJECTIVE_KEY)
    }

    /// The reference points.
    ///
    /// returns: `&[Vec<f64>]`
    pub fn reference_points(&self) -> &[Vec<f64>] {
        &self.reference_points
    }

    /// The population size.
    ///
    /// returns: `usize`
    pub fn number_of_individuals(&self) -> usize {
        self.number_of_individuals
    }

    /// The number of times the problem evaluator was called.
    ///
    /// returns: `usize`
    pub fn number_of_function_evaluations(&self) -> usize {
        self.nfe
    }

    /// Generate new offsprings from the current population. Parents are picked at random, then
    /// recombined and mutated.
    ///
    /// # Arguments
    ///
    /// * `count`: The number of offsprings.
    ///
    /// returns: `Result<Vec<Individual>, OError>`
    fn generate_offsprings(&mut self, count: usize) -> Result<Vec<Individual>, OError> {
        let mut offsprings: Vec<Individual> = Vec::with_capacity(count + 1);
        while offsprings.len() < count {
            let parents =
                self.selector_operator
                    .select(self.population.individuals(), 2, self.rng.as_mut())?;

            let children = self.crossover_operator.generate_offsprings(
                &parents[0],
                &parents[1],
                self.rng.as_mut(),
            )?;

            offsprings.push(
                self.mutation_operator
                    .mutate_offspring(&children.child1, self.rng.as_mut())?,
            );
            offsprings.push(
                self.mutation_operator
                    .mutate_offspring(&children.child2, self.rng.as_mut())?,
            );
        }
        offsprings.truncate(count);
        Ok(offsprings)
    }

    /// Create an individual with a random genome.
    ///
    /// returns: `Individual`
    fn random_individual(&mut self) -> Individual {
        let genome = BinaryVector::random(self.problem.genome_length(), self.rng.as_mut());
        Individual::new(self.problem.clone(), genome)
    }

    /// Evaluate a batch of individuals. One seed per individual is drawn from the algorithm
    /// generator before the evaluations start.
    ///
    /// # Arguments
    ///
    /// * `individuals`: The individuals to evaluate.
    ///
    /// returns: `Vec<Result<(), OError>>`
    fn evaluate(&mut self, individuals: &mut [Individual]) -> Vec<Result<(), OError>> {
        let seeds = sub_stream_seeds(self.rng.as_mut(), individuals.len());
        self.nfe += individuals.iter().filter(|i| !i.is_evaluated()).count();
        if self.parallel {
            NSGA3::do_parallel_evaluation(individuals, &seeds)
        } else {
            NSGA3::do_evaluation(individuals, &seeds)
        }
    }

    /// Evaluate the individuals. An individual whose evaluation fails is replaced once, with a
    /// random individual when `initial` is `true` or a new offspring otherwise. When the
    /// replacement fails too, it is dropped. Errors other than evaluation failures are returned.
    ///
    /// # Arguments
    ///
    /// * `individuals`: The individuals to evaluate.
    /// * `initial`: Whether the individuals belong to the initial population.
    ///
    /// returns: `Result<Vec<Individual>, OError>`: The evaluated individuals in their original
    /// order.
    fn evaluate_with_retry(
        &mut self,
        mut individuals: Vec<Individual>,
        initial: bool,
    ) -> Result<Vec<Individual>, OError> {
        let mut failed: Vec<usize> = Vec::new();
        for (idx, outcome) in self.evaluate(&mut individuals).into_iter().enumerate() {
            if let Err(e) = outcome {
                if !e.is_evaluation_failure() {
                    return Err(e);
                }
                warn!("Individual #{} is regenerated because: {e}", idx + 1);
                failed.push(idx);
            }
        }
        if failed.is_empty() {
            return Ok(individuals);
        }

        let mut replacements: Vec<Individual> = if initial {
            (0..failed.len()).map(|_| self.random_individual()).collect()
        } else {
            self.generate_offsprings(failed.len())?
        };
        let outcomes = self.evaluate(&mut replacements);

        let mut dropped: Vec<usize> = Vec::new();
        for ((idx, replacement), outcome) in failed.into_iter().zip(replacements).zip(outcomes) {
            match outcome {
                Ok(()) => individuals[idx] = replacement,
                Err(e) if e.is_evaluation_failure() => {
                    warn!("Individual #{} is dropped because: {e}", idx + 1);
                    dropped.push(idx);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(individuals
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| !dropped.contains(idx))
            .map(|(_, ind)| ind)
            .collect())
    }

    /// Move to a new step and log it.
    ///
    /// # Arguments
    ///
    /// * `state`: The new step.
    fn change_state(&mut self, state: RunState) {
        debug!("{} -> {}", self.state, state);
        self.state = state;
    }
}

/// Implementation of Section IV of the paper.
impl Algorithm<NSGA3Arg> for NSGA3 {
    /// This creates and evaluates the initial random population and sets the individual's ranks.
    ///
    /// return: `Result<(), OError>`
    fn initialise(&mut self) -> Result<(), OError> {
        self.change_state(RunState::Initializing);
        let population = Population::init(
            self.problem.clone(),
            self.number_of_individuals,
            self.rng.as_mut(),
        );
        info!("Created initial random population");

        self.change_state(RunState::Evaluating);
        let individuals = self.evaluate_with_retry(population.0, true)?;
        if individuals.len() < 3 {
            return Err(OError::AlgorithmInit(
                self.name(),
                format!(
                    "Only {} individuals were evaluated successfully. At least 3 are needed",
                    individuals.len()
                ),
            ));
        }
        self.population = Population::new_with(individuals);

        self.change_state(RunState::Sorting);
        fast_non_dominated_sort(self.population.individuals_as_mut())?;

        info!("Initial evaluation completed");
        self.generation = 0;
        Ok(())
    }

    /// Evolve the population by one generation (Algorithm 1 in the paper).
    ///
    /// return: `Result<(), OError>`
    fn evolve(&mut self) -> Result<(), OError> {
        let n = self.number_of_individuals;

        debug!("Generating new population (selection + crossover + mutation)");
        self.change_state(RunState::Evaluating);
        let offsprings = self.generate_offsprings(n)?;
        let offsprings = self.evaluate_with_retry(offsprings, false)?;

        debug!("Combining parents and offsprings in new population");
        self.population.add_new_individuals(offsprings);
        debug!("New population size is {}", self.population.len());

        self.change_state(RunState::Sorting);
        let sorting_results = fast_non_dominated_sort(self.population.individuals_as_mut())?;
        debug!("Collected {} fronts", sorting_results.fronts.len());

        // Add whole fronts while they fit. The front that does not fit is the last front F_l.
        let mut new_population = Population::new();
        let mut last_front: Vec<Individual> = Vec::new();
        for (fi, front) in sorting_results.fronts.into_iter().enumerate() {
            if new_population.len() + front.len() <= n {
                debug!("Adding front #{} (size: {})", fi + 1, front.len());
                new_population.add_new_individuals(front);
                if new_population.len() == n {
                    debug!("Population reached target size");
                    break;
                }
            } else {
                debug!(
                    "Population almost full ({} individuals). Last front #{} has {} individuals",
                    new_population.len(),
                    fi + 1,
                    front.len()
                );
                last_front = front;
                break;
            }
        }

        if !last_front.is_empty() {
            // S_t = P_{t+1} + F_l
            self.change_state(RunState::Normalizing);
            let admitted = new_population.len();
            let mut s_t = new_population.0;
            s_t.extend(last_front);

            let points = Normalise::new(&mut s_t)?.calculate()?;
            debug!(
                "Ideal point {:?} - extreme points {:?} - intercepts {:?}",
                points.ideal_point, points.extreme_points, points.intercepts
            );
            if points.degenerate {
                self.degenerate_hyperplanes += 1;
            }
            AssociateToRefPoint::new(&mut s_t, &self.reference_points)?.calculate()?;

            self.change_state(RunState::Selecting);
            let mut potential_individuals = s_t.split_off(admitted);
            let mut selected = Population::new_with(s_t);

            let mut rho_j: BTreeMap<usize, usize> =
                (0..self.reference_points.len()).map(|j| (j, 0)).collect();
            for ind in selected.individuals() {
                let j = ind.get_data(REF_POINT_INDEX)?.as_usize()?;
                *rho_j.entry(j).or_insert(0) += 1;
            }
            debug!("Niche counts {:?}", rho_j);

            Niching::new(
                &mut selected,
                &mut potential_individuals,
                n - admitted,
                &mut rho_j,
                self.rng.as_mut(),
            )?
            .calculate()?;
            new_population = selected;
        }

        self.population = new_population;
        self.generation += 1;
        Ok(())
    }

    fn generation(&self) -> usize {
        self.generation
    }

    fn name(&self) -> String {
        "NSGA3".to_string()
    }

    fn start_time(&self) -> &Instant {
        &self.start_time
    }

    fn stopping_condition(&self) -> &MaxGeneration {
        &self.stopping_condition
    }

    fn population(&self) -> &Population {
        &self.population
    }

    fn problem(&self) -> Arc<Problem> {
        self.problem.clone()
    }

    fn state(&self) -> RunState {
        self.state
    }

    fn set_state(&mut self, state: RunState) {
        self.change_state(state);
    }

    fn algorithm_options(&self) -> NSGA3Arg {
        self.args.clone()
    }

    /// Export the number of function evaluations, reference points and degenerate hyper-planes.
    ///
    /// return: `Option<HashMap<String, DataValue>>`
    fn additional_export_data(&self) -> Option<HashMap<String, DataValue>> {
        let mut data = HashMap::new();
        data.insert(
            "number_of_function_evaluations".to_string(),
            DataValue::USize(self.nfe),
        );
        data.insert(
            "number_of_reference_points".to_string(),
            DataValue::USize(self.reference_points.len()),
        );
        data.insert(
            "degenerate_hyperplanes".to_string(),
            DataValue::USize(self.degenerate_hyperplanes),
        );
        Some(data)
    }
}
