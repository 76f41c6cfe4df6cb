use std::fmt::{Display, Formatter};

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::core::{BinaryVector, Individual, OError};

/// Struct containing the offsprings from the crossover operation.
#[derive(Debug)]
pub struct CrossoverChildren {
    /// The first generated child.
    pub child1: Individual,
    /// The second generated child.
    pub child2: Individual,
}

/// Trait to define a crossover operator to generate a new child by recombining the genetic
/// material of two parents.
pub trait Crossover {
    /// Generate two children from their parents. The children are not evaluated.
    ///
    /// # Arguments
    ///
    /// * `parent1`: The first parent to use for mating.
    /// * `parent2`: The second parent to use for mating.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Result<CrossoverChildren, OError>`.
    fn generate_offsprings(
        &self,
        parent1: &Individual,
        parent2: &Individual,
        rng: &mut dyn RngCore,
    ) -> Result<CrossoverChildren, OError>;
}

/// Check that the parents' genomes have the same length.
fn check_parents(name: &str, parent1: &Individual, parent2: &Individual) -> Result<(), OError> {
    if parent1.genome().len() != parent2.genome().len() {
        return Err(OError::CrossoverOperator(
            name.to_string(),
            format!(
                "The parents have a different number of bits ({} and {})",
                parent1.genome().len(),
                parent2.genome().len()
            ),
        ));
    }
    Ok(())
}

fn check_probability(name: &str, crossover_probability: f64) -> Result<(), OError> {
    if !(0.0..=1.0).contains(&crossover_probability) {
        return Err(OError::CrossoverOperator(
            name.to_string(),
            format!(
                "The crossover probability {} must be a number between 0 and 1",
                crossover_probability
            ),
        ));
    }
    Ok(())
}

/// Single-point crossover: a cut point `c` is drawn in `[1, L - 1]` and the children swap the
/// parents' tails from `c`. Genomes with one bit are copied.
///
/// # Example
///
/// ```
/// use std::error::Error;
/// use std::sync::Arc;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use binsga3::core::{BinaryVector, Individual};
/// use binsga3::core::builtin_problems::OneMinMaxProblem;
/// use binsga3::operators::{Crossover, SinglePointCrossover};
///
/// fn main() -> Result<(), Box<dyn Error>> {
///     let problem = Arc::new(OneMinMaxProblem::create(6)?);
///     let a = Individual::new(problem.clone(), BinaryVector::new(vec![true; 6]));
///     let b = Individual::new(problem.clone(), BinaryVector::new(vec![false; 6]));
///
///     let crossover = SinglePointCrossover::new(1.0)?;
///     let mut rng = ChaCha8Rng::seed_from_u64(1);
///     let out = crossover.generate_offsprings(&a, &b, &mut rng)?;
///     println!("{} - {}", out.child1, out.child2);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SinglePointCrossover {
    /// The probability that the parents participate in the crossover.
    crossover_probability: f64,
}

impl SinglePointCrossover {
    /// Initialise the operator. This returns an error if the probability is outside [0, 1].
    ///
    /// # Arguments
    ///
    /// * `crossover_probability`: The probability that the parents participate in the crossover.
    /// If the probability is not reached, the children are copies of their parents.
    ///
    /// returns: `Result<SinglePointCrossover, OError>`
    pub fn new(crossover_probability: f64) -> Result<Self, OError> {
        check_probability("SinglePointCrossover", crossover_probability)?;
        Ok(Self {
            crossover_probability,
        })
    }
}

impl Crossover for SinglePointCrossover {
    fn generate_offsprings(
        &self,
        parent1: &Individual,
        parent2: &Individual,
        rng: &mut dyn RngCore,
    ) -> Result<CrossoverChildren, OError> {
        check_parents("SinglePointCrossover", parent1, parent2)?;
        let bits1 = parent1.genome().bits();
        let bits2 = parent2.genome().bits();
        let length = bits1.len();

        let cut = if length > 1 && rng.gen_bool(self.crossover_probability) {
            rng.gen_range(1..length)
        } else {
            length
        };

        let mut genome1 = bits1[..cut].to_vec();
        genome1.extend_from_slice(&bits2[cut..]);
        let mut genome2 = bits2[..cut].to_vec();
        genome2.extend_from_slice(&bits1[cut..]);

        Ok(CrossoverChildren {
            child1: parent1.with_genome(BinaryVector::new(genome1)),
            child2: parent2.with_genome(BinaryVector::new(genome2)),
        })
    }
}

/// Uniform crossover: each bit position is swapped between the two children with probability
/// 0.5.
#[derive(Debug, Clone)]
pub struct UniformCrossover {
    /// The probability that the parents participate in the crossover.
    crossover_probability: f64,
}

impl UniformCrossover {
    /// Initialise the operator. This returns an error if the probability is outside [0, 1].
    ///
    /// # Arguments
    ///
    /// * `crossover_probability`: The probability that the parents participate in the crossover.
    /// If the probability is not reached, the children are copies of their parents.
    ///
    /// returns: `Result<UniformCrossover, OError>`
    pub fn new(crossover_probability: f64) -> Result<Self, OError> {
        check_probability("UniformCrossover", crossover_probability)?;
        Ok(Self {
            crossover_probability,
        })
    }
}

impl Crossover for UniformCrossover {
    fn generate_offsprings(
        &self,
        parent1: &Individual,
        parent2: &Individual,
        rng: &mut dyn RngCore,
    ) -> Result<CrossoverChildren, OError> {
        check_parents("UniformCrossover", parent1, parent2)?;
        let mut genome1 = parent1.genome().bits().to_vec();
        let mut genome2 = parent2.genome().bits().to_vec();

        if rng.gen_bool(self.crossover_probability) {
            for (b1, b2) in genome1.iter_mut().zip(genome2.iter_mut()) {
                if rng.gen_bool(0.5) {
                    std::mem::swap(b1, b2);
                }
            }
        }

        Ok(CrossoverChildren {
            child1: parent1.with_genome(BinaryVector::new(genome1)),
            child2: parent2.with_genome(BinaryVector::new(genome2)),
        })
    }
}

/// The crossover operator to use in the algorithm.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum CrossoverOperatorOptions {
    /// Use [`SinglePointCrossover`] with the given crossover probability.
    SinglePoint { crossover_probability: f64 },
    /// Use [`UniformCrossover`] with the given crossover probability.
    Uniform { crossover_probability: f64 },
}

impl Default for CrossoverOperatorOptions {
    /// Uniform crossover applied to every pair of parents.
    fn default() -> Self {
        CrossoverOperatorOptions::Uniform {
            crossover_probability: 1.0,
        }
    }
}

impl Display for CrossoverOperatorOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CrossoverOperatorOptions::SinglePoint {
                crossover_probability,
            } => write!(f, "single-point (probability {crossover_probability})"),
            CrossoverOperatorOptions::Uniform {
                crossover_probability,
            } => write!(f, "uniform (probability {crossover_probability})"),
        }
    }
}

impl CrossoverOperatorOptions {
    /// Build the operator. This returns an error if the probability is outside [0, 1].
    ///
    /// returns: `Result<Box<dyn Crossover + Send + Sync>, OError>`
    pub fn build(&self) -> Result<Box<dyn Crossover + Send + Sync>, OError> {
        Ok(match self {
            CrossoverOperatorOptions::SinglePoint {
                crossover_probability,
            } => Box::new(SinglePointCrossover::new(*crossover_probability)?),
            CrossoverOperatorOptions::Uniform {
                crossover_probability,
            } => Box::new(UniformCrossover::new(*crossover_probability)?),
        })
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::core::builtin_problems::OneMinMaxProblem;
    use crate::core::utils::get_rng;
    use crate::core::{BinaryVector, Individual};
    use crate::operators::{
        Crossover, CrossoverOperatorOptions, SinglePointCrossover, UniformCrossover,
    };

    fn parents(length: usize) -> (Individual, Individual) {
        let problem = Arc::new(OneMinMaxProblem::create(length).unwrap());
        (
            Individual::new(problem.clone(), BinaryVector::new(vec![true; length])),
            Individual::new(problem, BinaryVector::new(vec![false; length])),
        )
    }

    #[test]
    /// The children of single-point crossover are a prefix of one parent and a suffix of the
    /// other.
    fn test_single_point_crossover() {
        let (a, b) = parents(10);
        let crossover = SinglePointCrossover::new(1.0).unwrap();
        let mut rng = get_rng(Some(2));
        for _ in 0..50 {
            let out = crossover.generate_offsprings(&a, &b, rng.as_mut()).unwrap();
            let ones = out.child1.genome().count_ones();
            assert!((1..10).contains(&ones));
            // child1 = 1..1 0..0, child2 = 0..0 1..1
            let bits = out.child1.genome().bits();
            assert!(bits[..ones].iter().all(|b| *b));
            assert_eq!(out.child2.genome().count_zeros(), ones);
            assert!(!out.child1.is_evaluated());
            assert!(out.child1.get_objective_value(0).unwrap().is_nan());
        }

        // no crossover
        let crossover = SinglePointCrossover::new(0.0).unwrap();
        let out = crossover.generate_offsprings(&a, &b, rng.as_mut()).unwrap();
        assert_eq!(out.child1.genome(), a.genome());
        assert_eq!(out.child2.genome(), b.genome());

        assert!(SinglePointCrossover::new(1.5).is_err());
    }

    #[test]
    /// Uniform crossover preserves the bits at each position.
    fn test_uniform_crossover() {
        let (a, b) = parents(64);
        let crossover = UniformCrossover::new(1.0).unwrap();
        let out = crossover
            .generate_offsprings(&a, &b, get_rng(Some(5)).as_mut())
            .unwrap();
        for i in 0..64 {
            assert_ne!(
                out.child1.genome().get(i).unwrap(),
                out.child2.genome().get(i).unwrap()
            );
        }
        assert!(out.child1.genome().count_ones() > 0);
        assert!(out.child1.genome().count_zeros() > 0);
    }

    #[test]
    fn test_options() {
        assert!(CrossoverOperatorOptions::default().build().is_ok());
        let options = CrossoverOperatorOptions::SinglePoint {
            crossover_probability: -1.0,
        };
        assert!(options.build().is_err());
    }
}
