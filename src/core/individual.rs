use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use rand::RngCore;
use serde::Serialize;

use crate::core::{BinaryVector, OError, Problem};

/// The data type and value that can be stored in an individual's data.
#[derive(Serialize, Clone, Debug)]
pub enum DataValue {
    /// The value for a floating-point number. This is a f64.
    Real(f64),
    /// The value for an usize.
    USize(usize),
    /// The value for a vector of floating-point numbers.
    Vector(Vec<f64>),
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataValue::Real(s), DataValue::Real(o)) => (s.is_nan() && o.is_nan()) || (*s == *o),
            (DataValue::USize(s), DataValue::USize(o)) => s == o,
            (DataValue::Vector(s), DataValue::Vector(o)) => s == o,
            _ => false,
        }
    }
}

impl DataValue {
    /// Get the value if the data is of real type. This returns an error if the data is not real.
    ///
    /// returns: `Result<f64, OError>`
    pub fn as_real(&self) -> Result<f64, OError> {
        if let DataValue::Real(v) = self {
            Ok(*v)
        } else {
            Err(OError::WrongDataType("real".to_string()))
        }
    }

    /// Get the value if the data is of vector type. This returns an error if the data is not a
    /// vector.
    ///
    /// returns: `Result<&Vec<f64>, OError>`
    pub fn as_vec(&self) -> Result<&Vec<f64>, OError> {
        if let DataValue::Vector(v) = self {
            Ok(v)
        } else {
            Err(OError::WrongDataType("vector".to_string()))
        }
    }

    /// Get the value if the data is of usize type. This returns an error if the data is not an
    /// usize.
    ///
    /// returns: `Result<usize, OError>`
    pub fn as_usize(&self) -> Result<usize, OError> {
        if let DataValue::USize(v) = self {
            Ok(*v)
        } else {
            Err(OError::WrongDataType("usize".to_string()))
        }
    }
}

/// An individual in the population containing the problem solution and its objective values.
///
/// Objective values are stored with the sign used by the algorithms (every objective is
/// minimised): maximised objectives are saved with the opposite sign. Use
/// [`Individual::user_objective_values`] to get them back in the problem's own direction.
///
/// # Example
/// ```
/// use std::error::Error;
/// use std::sync::Arc;
/// use binsga3::core::{BinaryVector, Individual};
/// use binsga3::core::builtin_problems::OneMinMaxProblem;
///
/// fn main() -> Result<(), Box<dyn Error>> {
///     let problem = Arc::new(OneMinMaxProblem::create(4)?);
///     let mut a = Individual::new(problem, BinaryVector::new(vec![true, false, false, false]));
///     a.update_objectives(vec![1.0, 3.0])?;
///     assert_eq!(a.objective_values(), &[-1.0, -3.0]);
///     assert_eq!(a.user_objective_values(), vec![1.0, 3.0]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Individual {
    /// The problem being solved
    problem: Arc<Problem>,
    /// The solution.
    genome: BinaryVector,
    /// The values of the objectives in the problem order. These are `NaN` until the
    /// individual is evaluated.
    objective_values: Vec<f64>,
    /// Whether the individual has been evaluated and the objective values are available. When an
    /// individual is created after the population evolves, objectives need to be evaluated using
    /// the problem evaluator.
    evaluated: bool,
    /// Additional numeric data to store for the individuals (such as rank or the associated
    /// reference point) depending on the algorithm the individuals are derived from.
    data: HashMap<String, DataValue>,
}

impl PartialEq for Individual {
    /// Compare two individual's genomes, objectives and stored data.
    ///
    /// # Arguments
    ///
    /// * `other`: The other individual to compare.
    ///
    /// returns: `bool`
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome
            && self.objective_values.len() == other.objective_values.len()
            && self
                .objective_values
                .iter()
                .zip(&other.objective_values)
                .all(|(a, b)| (a.is_nan() && b.is_nan()) || a == b)
            && self.data == other.data
    }
}

#[derive(Serialize, Debug)]
pub struct IndividualExport {
    /// The solution as a string of bits.
    pub genome: BinaryVector,
    /// The values of the objectives with their original sign.
    pub objective_values: HashMap<String, f64>,
}

impl Display for Individual {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Individual(genome={}, objectives={:?})",
            self.genome, self.objective_values,
        )
    }
}

impl Individual {
    /// Create a new individual that has not been evaluated yet.
    ///
    /// # Arguments
    ///
    /// * `problem`: The problem being solved.
    /// * `genome`: The solution.
    ///
    /// returns: `Individual`
    pub fn new(problem: Arc<Problem>, genome: BinaryVector) -> Self {
        let objective_values = vec![f64::NAN; problem.number_of_objectives()];
        Self {
            problem,
            genome,
            objective_values,
            evaluated: false,
            data: HashMap::new(),
        }
    }

    /// Get the problem being solved with the individual.
    ///
    /// return `Arc<Problem>`
    pub fn problem(&self) -> Arc<Problem> {
        self.problem.clone()
    }

    /// Get the solution.
    ///
    /// return: `&BinaryVector`
    pub fn genome(&self) -> &BinaryVector {
        &self.genome
    }

    /// Create a new individual, with the same problem, that carries a new solution. The objectives
    /// and data are not copied.
    ///
    /// # Arguments
    ///
    /// * `genome`: The solution of the new individual.
    ///
    /// returns: `Individual`
    pub(crate) fn with_genome(&self, genome: BinaryVector) -> Self {
        Self::new(self.problem.clone(), genome)
    }

    /// Update all the objectives for a solution. The values must be given in the problem order
    /// and with their natural sign; the value is saved as negative if the objective is being
    /// maximised. This returns an error if the number of values does not match the number of
    /// problem objectives or a value is `NaN` or infinite. The individual is not marked as
    /// evaluated.
    ///
    /// # Arguments
    ///
    /// * `values`: The values to set.
    ///
    /// returns: `Result<(), OError>`
    pub fn update_objectives(&mut self, values: Vec<f64>) -> Result<(), OError> {
        if values.len() != self.problem.number_of_objectives() {
            return Err(OError::Configuration(format!(
                "The evaluator returned {} objective values but the problem has {} objectives",
                values.len(),
                self.problem.number_of_objectives()
            )));
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            let name = self.problem.objective(index)?.name();
            return Err(if values[index].is_nan() {
                OError::NaN("objective".to_string(), name)
            } else {
                OError::NonFinite("objective".to_string(), name, values[index])
            });
        }

        // invert the sign for maximisation problems
        for (x, (value, direction)) in self
            .objective_values
            .iter_mut()
            .zip(values.into_iter().zip(self.problem.directions()))
        {
            *x = direction.sign() * value;
        }
        Ok(())
    }

    /// Get the objective value by index. This returns an error if the objective does not exist.
    ///
    /// # Arguments
    ///
    /// * `index`: The objective index.
    ///
    /// returns: `Result<f64, OError>`
    pub fn get_objective_value(&self, index: usize) -> Result<f64, OError> {
        self.objective_values
            .get(index)
            .copied()
            .ok_or(OError::NonExistingIndex("objective".to_string(), index))
    }

    /// Get the objective values as minimised by the algorithm (i.e. with the sign of maximised
    /// objectives inverted). The size of the slice equals the number of problem objectives.
    ///
    /// returns: `&[f64]`
    pub fn objective_values(&self) -> &[f64] {
        &self.objective_values
    }

    /// Get the objective values in the direction set on the problem.
    ///
    /// returns: `Vec<f64>`
    pub fn user_objective_values(&self) -> Vec<f64> {
        self.objective_values
            .iter()
            .zip(self.problem.directions())
            .map(|(v, d)| d.sign() * v)
            .collect()
    }

    /// Ge the vector with the objective values for the individual and transform their value using
    /// a closure. The size of the vector will equal the number of problem objectives.
    ///
    /// # Arguments
    ///
    /// * `transform`: The function to apply to transform each objective value. This function
    /// receives the objective value and its index.
    ///
    /// returns: `Result<Vec<f64>, OError>`
    pub fn transform_objective_values<F: Fn(f64, usize) -> Result<f64, OError>>(
        &self,
        transform: F,
    ) -> Result<Vec<f64>, OError> {
        self.objective_values
            .iter()
            .enumerate()
            .map(|(index, val)| transform(*val, index))
            .collect()
    }

    /// Check if the individual was evaluated.
    ///
    /// return: `bool`
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Set the individual as evaluated. This means that its objectives have been calculated for
    /// its solution.
    pub fn set_evaluated(&mut self) {
        self.evaluated = true;
    }

    /// Store custom data on the individual.
    ///
    /// # Arguments
    ///
    /// * `name`: The name of the data.
    /// * `value`: The value.
    ///
    /// returns: `()`.
    pub fn set_data(&mut self, name: &str, value: DataValue) {
        self.data.insert(name.to_string(), value);
    }

    /// Get a copy of the custom data set on the individual. This returns an error if no custom
    /// data with the provided `name` is set on the individual.
    ///
    /// # Arguments
    ///
    /// * `name`: The name of the data.
    ///
    /// returns: `Result<DataValue, OError>`
    pub fn get_data(&self, name: &str) -> Result<DataValue, OError> {
        self.data
            .get(name)
            .cloned()
            .ok_or(OError::WrongDataName(name.to_string()))
    }

    /// Export the solution and its objective values with their original sign.
    ///
    /// return: `IndividualExport`
    pub fn serialise(&self) -> IndividualExport {
        IndividualExport {
            genome: self.genome.clone(),
            objective_values: self
                .problem
                .objective_names()
                .into_iter()
                .zip(self.user_objective_values())
                .collect(),
        }
    }
}

/// The population with the solutions.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Population(pub Vec<Individual>);

impl Population {
    /// Initialise a population with no individuals.
    ///
    /// returns: `Self`
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialise a population with some individuals.
    ///
    /// # Arguments
    ///
    /// * `individual`: The vector of individuals to add.
    ///
    /// returns: `Self`
    pub fn new_with(individuals: Vec<Individual>) -> Self {
        Self(individuals)
    }

    /// Get the population size.
    ///
    /// return: `usize`
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if the population is empty.
    ///
    /// return: `bool`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the population individuals.
    ///
    /// return: `&[Individual]`
    pub fn individuals(&self) -> &[Individual] {
        self.0.as_ref()
    }

    /// Get a population individual by its index.
    ///
    /// return: `Option<&Individual>`
    pub fn individual(&self, index: usize) -> Option<&Individual> {
        self.0.get(index)
    }

    /// Borrow the population individuals as mutable reference.
    ///
    /// return: `&mut [Individual]`
    pub fn individuals_as_mut(&mut self) -> &mut [Individual] {
        self.0.as_mut()
    }

    /// Add new individuals to the population.
    ///
    /// # Arguments
    ///
    /// * `individuals`: The vector of individuals to add.
    ///
    /// returns: `()`
    pub fn add_new_individuals(&mut self, individuals: Vec<Individual>) {
        self.0.extend(individuals);
    }

    /// Add a new individual to the population.
    ///
    /// # Arguments
    ///
    /// * `individual`: The individual to add.
    ///
    /// returns: `()`
    pub fn add_individual(&mut self, individual: Individual) {
        self.0.push(individual);
    }

    /// Generate a population with a number of individuals equal to `number_of_individuals`. Each
    /// bit of each genome is randomly set. The individuals are not evaluated.
    ///
    /// # Arguments
    ///
    /// * `problem`: The problem being solved.
    /// * `number_of_individuals`: The number of individuals to add to the population.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Population`
    pub fn init(
        problem: Arc<Problem>,
        number_of_individuals: usize,
        rng: &mut dyn RngCore,
    ) -> Self {
        let mut population: Vec<Individual> = Vec::with_capacity(number_of_individuals);
        for _ in 0..number_of_individuals {
            let genome = BinaryVector::random(problem.genome_length(), rng);
            population.push(Individual::new(problem.clone(), genome));
        }
        Self(population)
    }

    /// Serialise the individuals for export.
    ///
    /// return: `Vec<IndividualExport>`
    pub fn serialise(&self) -> Vec<IndividualExport> {
        self.0.iter().map(|i| i.serialise()).collect()
    }
}
