use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::core::{Individual, OError, Problem};

/// The trait to implement a mutation operator to modify the genetic material of an individual.
pub trait Mutation {
    /// Mutate a population individual.
    ///
    /// # Arguments
    ///
    /// * `individual`: The individual to mutate.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Result<Individual, OError>`. The mutated individual.
    fn mutate_offspring(
        &self,
        individual: &Individual,
        rng: &mut dyn RngCore,
    ) -> Result<Individual, OError>;
}

/// Input arguments for [`BitFlipMutation`].
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BitFlipMutationArgs {
    /// The probability of flipping each bit.
    pub bit_probability: f64,
}

impl BitFlipMutationArgs {
    /// Initialise the bit-flip mutation with the default probability equal to `1` divided by the
    /// number of bits (i.e. on average one bit is flipped in each offspring).
    ///
    /// # Arguments
    ///
    /// * `problem`: The problem being solved.
    ///
    /// returns: `Self`
    pub fn default(problem: &Problem) -> Self {
        Self {
            bit_probability: 1.0 / problem.genome_length() as f64,
        }
    }
}

/// The bit-flip mutation operator: each bit of an offspring is inverted independently with a
/// given probability.
pub struct BitFlipMutation {
    /// The probability of flipping each bit.
    bit_probability: f64,
}

impl BitFlipMutation {
    /// Initialise the bit-flip mutation operator. This returns an error if the probability is
    /// outside the [0, 1] range.
    ///
    /// # Arguments
    ///
    /// * `args`: The operator arguments.
    ///
    /// returns: `Result<BitFlipMutation, OError>`
    pub fn new(args: BitFlipMutationArgs) -> Result<Self, OError> {
        if !(0.0..=1.0).contains(&args.bit_probability) {
            return Err(OError::MutationOperator(
                "BitFlipMutation".to_string(),
                format!(
                    "The bit probability {} must be a number between 0 and 1",
                    args.bit_probability
                ),
            ));
        }
        Ok(Self {
            bit_probability: args.bit_probability,
        })
    }
}

impl Mutation for BitFlipMutation {
    fn mutate_offspring(
        &self,
        individual: &Individual,
        rng: &mut dyn RngCore,
    ) -> Result<Individual, OError> {
        let mut genome = individual.genome().clone();
        for index in 0..genome.len() {
            if rng.gen_bool(self.bit_probability) {
                genome.flip(index)?;
            }
        }
        Ok(individual.with_genome(genome))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::core::builtin_problems::OneMinMaxProblem;
    use crate::core::utils::get_rng;
    use crate::core::{BinaryVector, Individual};
    use crate::operators::{BitFlipMutation, BitFlipMutationArgs, Mutation};

    #[test]
    fn test_bit_flip_mutation() {
        let problem = Arc::new(OneMinMaxProblem::create(100).unwrap());
        let a = Individual::new(problem.clone(), BinaryVector::new(vec![false; 100]));
        let mut rng = get_rng(Some(1));

        let args = BitFlipMutationArgs::default(&problem);
        assert_eq!(args.bit_probability, 0.01);

        // every bit flips
        let pm = BitFlipMutation::new(BitFlipMutationArgs {
            bit_probability: 1.0,
        })
        .unwrap();
        let m = pm.mutate_offspring(&a, rng.as_mut()).unwrap();
        assert_eq!(m.genome().count_ones(), 100);

        // no bit flips
        let pm = BitFlipMutation::new(BitFlipMutationArgs {
            bit_probability: 0.0,
        })
        .unwrap();
        let m = pm.mutate_offspring(&a, rng.as_mut()).unwrap();
        assert_eq!(m.genome(), a.genome());

        // on average half the bits flip
        let pm = BitFlipMutation::new(BitFlipMutationArgs {
            bit_probability: 0.5,
        })
        .unwrap();
        let m = pm.mutate_offspring(&a, rng.as_mut()).unwrap();
        assert!((20..80).contains(&m.genome().count_ones()));

        assert!(BitFlipMutation::new(BitFlipMutationArgs {
            bit_probability: 2.0
        })
        .is_err());
    }
}
