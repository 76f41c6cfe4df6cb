use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use log::info;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::core::{BinaryVector, Objective, ObjectiveDirection, OError};

/// The trait to use to evaluate the objective values when a new offspring is created.
pub trait Evaluator: Sync + Send + Debug {
    /// A custom-defined function to use to assess the objectives of a solution. When a new
    /// offspring is generated via crossover and mutation, its genome must be evaluated to proceed
    /// with the next evolution. The function must return one value per problem objective, in the
    /// same order the objectives were given to [`Problem::new`] and with their natural sign (i.e.
    /// do not invert maximised objectives). A wrong number of values stops the algorithm; an error
    /// or a `NaN` causes the solution to be discarded and regenerated.
    ///
    /// # Arguments
    ///
    /// * `genome`: The solution to evaluate.
    /// * `rng`: A random number generator private to this evaluation. This can be used by noisy
    ///    or stochastic problems; its sequence only depends on the algorithm seed.
    ///
    /// returns: `Result<Vec<f64>, Box<dyn Error>>`
    ///
    /// ## Example
    /// ```
    /// use std::error::Error;
    /// use rand::RngCore;
    /// use binsga3::core::{BinaryVector, Evaluator};
    ///
    /// // maximise the number of ones and the number of zeros.
    /// #[derive(Debug)]
    /// struct UserEvaluator;
    /// impl Evaluator for UserEvaluator {
    ///     fn evaluate(&self, genome: &BinaryVector, _: &mut dyn RngCore) -> Result<Vec<f64>, Box<dyn Error>> {
    ///         Ok(vec![genome.count_ones() as f64, genome.count_zeros() as f64])
    ///     }
    /// }
    /// ```
    fn evaluate(
        &self,
        genome: &BinaryVector,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, Box<dyn Error>>;
}

#[derive(Serialize, Deserialize, Debug)]
/// Serialised data of a problem.
pub struct ProblemExport {
    /// The problem objectives.
    pub objectives: Vec<Objective>,
    /// The number of bits in a solution.
    pub genome_length: usize,
}

/// Define a new binary problem to optimise as:
///
///  $$$ Min/Max(f_1(x), f_2(x), ..., f_M(x)) $
///
/// where $M \geq 1$ is the number of objectives and $x \in \{0, 1\}^L$ a vector of $L$ bits.
///
/// # Example
/// ```
///  use std::error::Error;
///  use rand::RngCore;
///  use binsga3::core::{BinaryVector, Evaluator, Objective, ObjectiveDirection, Problem};
///
///  let objectives = vec![
///     Objective::new("ones", ObjectiveDirection::Maximise),
///     Objective::new("zeros", ObjectiveDirection::Maximise),
///  ];
///
///  #[derive(Debug)]
///  struct UserEvaluator;
///  impl Evaluator for UserEvaluator {
///     fn evaluate(&self, genome: &BinaryVector, _: &mut dyn RngCore) -> Result<Vec<f64>, Box<dyn Error>> {
///         Ok(vec![genome.count_ones() as f64, genome.count_zeros() as f64])
///     }
///  }
///
///  let problem = Problem::new(objectives, 16, Box::new(UserEvaluator)).unwrap();
///  println!("{}", problem);
/// ```
#[derive(Debug)]
pub struct Problem {
    /// The problem objectives.
    objectives: Vec<Objective>,
    /// The number of bits in each solution.
    genome_length: usize,
    /// The trait with the function to use to evaluate the objectives.
    evaluator: Box<dyn Evaluator>,
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Problem with {} objectives and {} bits",
            self.number_of_objectives(),
            self.genome_length
        )
    }
}

impl Problem {
    /// Initialise the problem. This returns an error if no objective is given, two objectives
    /// share the same name or the genome length is `0`.
    ///
    /// # Arguments
    ///
    /// * `objectives`: The vector of objective to set on the problem.
    /// * `genome_length`: The number of bits in each solution.
    /// * `evaluator`: The trait with the function to use to evaluate the objectives.
    ///
    /// returns: `Result<Problem, OError>`
    pub fn new(
        objectives: Vec<Objective>,
        genome_length: usize,
        evaluator: Box<dyn Evaluator>,
    ) -> Result<Self, OError> {
        if objectives.is_empty() {
            return Err(OError::NoObjective);
        }
        if genome_length == 0 {
            return Err(OError::Configuration(
                "The genome must have at least one bit".to_string(),
            ));
        }

        let mut names: Vec<String> = Vec::with_capacity(objectives.len());
        for objective in objectives.iter() {
            let name = objective.name();
            if names.contains(&name) {
                return Err(OError::DuplicatedName("objective".to_string(), name));
            }
            info!("Adding objective '{}' - {}", name, objective);
            names.push(name);
        }

        Ok(Self {
            objectives,
            genome_length,
            evaluator,
        })
    }

    /// Whether the objective at `index` is being minimised. This returns an error if the objective
    /// does not exist.
    ///
    /// # Arguments
    ///
    /// * `index`: The objective index.
    ///
    /// returns: `Result<bool, OError>`
    pub fn is_objective_minimised(&self, index: usize) -> Result<bool, OError> {
        Ok(self.objective(index)?.direction() == ObjectiveDirection::Minimise)
    }

    /// Get an objective by index.
    ///
    /// # Arguments
    ///
    /// * `index`: The objective index.
    ///
    /// returns: `Result<&Objective, OError>`
    pub fn objective(&self, index: usize) -> Result<&Objective, OError> {
        self.objectives
            .get(index)
            .ok_or(OError::NonExistingIndex("objective".to_string(), index))
    }

    /// The objective directions in the order they were given.
    ///
    /// return: `Vec<ObjectiveDirection>`
    pub fn directions(&self) -> Vec<ObjectiveDirection> {
        self.objectives.iter().map(|o| o.direction()).collect()
    }

    /// Total number of problem objectives.
    ///
    /// return: `usize`
    pub fn number_of_objectives(&self) -> usize {
        self.objectives.len()
    }

    /// The number of bits in each solution.
    ///
    /// return: `usize`
    pub fn genome_length(&self) -> usize {
        self.genome_length
    }

    /// Get the problem objective names.
    ///
    /// return: `Vec<String>`
    pub fn objective_names(&self) -> Vec<String> {
        self.objectives.iter().map(|o| o.name()).collect()
    }

    /// Get the evaluator.
    ///
    /// return: `&dyn Evaluator`
    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    /// Serialise the problem.
    ///
    /// return: `ProblemExport`
    pub fn serialise(&self) -> ProblemExport {
        ProblemExport {
            objectives: self.objectives.clone(),
            genome_length: self.genome_length,
        }
    }
}

/// Binary benchmark problems.
pub mod builtin_problems {
    use std::error::Error;

    use rand::{Rng, RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use crate::core::{BinaryVector, Evaluator, Objective, ObjectiveDirection, OError, Problem};

    /// The OneMinMax problem: maximise the number of ones and the number of zeros. Every solution
    /// is Pareto-optimal and the front has `L + 1` distinct objective vectors.
    #[derive(Debug)]
    pub struct OneMinMaxProblem;

    impl OneMinMaxProblem {
        /// Create the problem for the optimisation.
        ///
        /// # Arguments:
        ///
        /// * `genome_length`: The number of bits.
        pub fn create(genome_length: usize) -> Result<Problem, OError> {
            let objectives = vec![
                Objective::new("ones", ObjectiveDirection::Maximise),
                Objective::new("zeros", ObjectiveDirection::Maximise),
            ];
            Problem::new(objectives, genome_length, Box::new(OneMinMaxProblem))
        }
    }

    impl Evaluator for OneMinMaxProblem {
        fn evaluate(
            &self,
            genome: &BinaryVector,
            _: &mut dyn RngCore,
        ) -> Result<Vec<f64>, Box<dyn Error>> {
            Ok(vec![genome.count_ones() as f64, genome.count_zeros() as f64])
        }
    }

    /// The Leading Ones Trailing Zeros (LOTZ) problem from Laumanns et al. (2004): maximise the
    /// number of consecutive ones from the start of the vector and the number of consecutive
    /// zeros at its end.
    #[derive(Debug)]
    pub struct LotzProblem;

    impl LotzProblem {
        /// Create the problem for the optimisation.
        ///
        /// # Arguments:
        ///
        /// * `genome_length`: The number of bits.
        pub fn create(genome_length: usize) -> Result<Problem, OError> {
            let objectives = vec![
                Objective::new("leading_ones", ObjectiveDirection::Maximise),
                Objective::new("trailing_zeros", ObjectiveDirection::Maximise),
            ];
            Problem::new(objectives, genome_length, Box::new(LotzProblem))
        }

        /// The number of leading ones.
        pub fn f1(x: &[bool]) -> f64 {
            x.iter().take_while(|b| **b).count() as f64
        }

        /// The number of trailing zeros.
        pub fn f2(x: &[bool]) -> f64 {
            x.iter().rev().take_while(|b| !**b).count() as f64
        }
    }

    impl Evaluator for LotzProblem {
        fn evaluate(
            &self,
            genome: &BinaryVector,
            _: &mut dyn RngCore,
        ) -> Result<Vec<f64>, Box<dyn Error>> {
            let x = genome.bits();
            Ok(vec![LotzProblem::f1(x), LotzProblem::f2(x)])
        }
    }

    /// The multi-objective 0/1 knapsack problem from Zitzler & Thiele (1999). Each objective has
    /// its own profit and weight per item and its own capacity, equal to half the total weight of
    /// that objective. Overweight solutions are penalised by subtracting the largest
    /// profit-to-weight ratio times the excess weight from each objective.
    #[derive(Debug)]
    pub struct KnapsackProblem {
        /// The profit of each item for each objective (objective x item).
        pub(crate) profits: Vec<Vec<f64>>,
        /// The weight of each item for each objective (objective x item).
        weights: Vec<Vec<f64>>,
        /// The capacity of each knapsack.
        capacities: Vec<f64>,
    }

    impl KnapsackProblem {
        /// Create the problem for the optimisation. Profits and weights are integers in
        /// `[10, 100]` drawn from a generator seeded with `seed`.
        ///
        /// # Arguments:
        ///
        /// * `number_of_items`: The number of items (i.e. bits).
        /// * `number_of_objectives`: The number of knapsacks.
        /// * `seed`: The seed used to generate profits and weights.
        pub fn create(
            number_of_items: usize,
            number_of_objectives: usize,
            seed: u64,
        ) -> Result<Problem, OError> {
            let evaluator = Self::new(number_of_items, number_of_objectives, seed);
            let objectives = (1..=number_of_objectives)
                .map(|i| Objective::new(&format!("profit{i}"), ObjectiveDirection::Maximise))
                .collect();
            Problem::new(objectives, number_of_items, Box::new(evaluator))
        }

        pub(crate) fn new(number_of_items: usize, number_of_objectives: usize, seed: u64) -> Self {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut profits = Vec::with_capacity(number_of_objectives);
            let mut weights = Vec::with_capacity(number_of_objectives);
            for _ in 0..number_of_objectives {
                profits.push(
                    (0..number_of_items)
                        .map(|_| rng.gen_range(10..=100) as f64)
                        .collect::<Vec<f64>>(),
                );
                weights.push(
                    (0..number_of_items)
                        .map(|_| rng.gen_range(10..=100) as f64)
                        .collect::<Vec<f64>>(),
                );
            }
            let capacities = weights
                .iter()
                .map(|w| w.iter().sum::<f64>() / 2.0)
                .collect();
            Self {
                profits,
                weights,
                capacities,
            }
        }
    }

    impl Evaluator for KnapsackProblem {
        fn evaluate(
            &self,
            genome: &BinaryVector,
            _: &mut dyn RngCore,
        ) -> Result<Vec<f64>, Box<dyn Error>> {
            let x = genome.bits();
            let mut excess = 0.0;
            for (w, capacity) in self.weights.iter().zip(&self.capacities) {
                let total: f64 = w.iter().zip(x).filter(|(_, b)| **b).map(|(w, _)| w).sum();
                excess += f64::max(total - capacity, 0.0);
            }

            let mut objectives = Vec::with_capacity(self.profits.len());
            for (p, w) in self.profits.iter().zip(&self.weights) {
                let profit: f64 = p.iter().zip(x).filter(|(_, b)| **b).map(|(p, _)| p).sum();
                let max_ratio = p
                    .iter()
                    .zip(w)
                    .map(|(p, w)| p / w)
                    .fold(0.0, f64::max);
                objectives.push(profit - max_ratio * excess);
            }
            Ok(objectives)
        }
    }
}
