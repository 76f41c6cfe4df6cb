use std::error::Error;
#[cfg(test)]
use std::sync::Arc;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::{BinaryVector, Evaluator};
#[cfg(test)]
use crate::core::{Individual, Objective, ObjectiveDirection, Problem};

/// Get the random number generator. If no seed is provided, this randomly generated.
///
/// # Arguments
///
/// * `seed`: The optional seed number.
///
/// returns: `Box<dyn RngCore>`
pub(crate) fn get_rng(seed: Option<u64>) -> Box<dyn RngCore + Send> {
    let rng = match seed {
        None => ChaCha8Rng::from_entropy(),
        Some(s) => ChaCha8Rng::seed_from_u64(s),
    };
    Box::new(rng)
}

/// Draw one seed per solution to evaluate from the algorithm random number generator. Each
/// evaluation then gets its own generator (see [`sub_stream`]) so that the results do not depend
/// on the order in which the evaluations are run.
///
/// # Arguments
///
/// * `rng`: The algorithm random number generator.
/// * `size`: The number of seeds.
///
/// returns: `Vec<u64>`
pub(crate) fn sub_stream_seeds(rng: &mut dyn RngCore, size: usize) -> Vec<u64> {
    (0..size).map(|_| rng.gen::<u64>()).collect()
}

/// Create the random number generator for one evaluation.
///
/// # Arguments
///
/// * `seed`: The seed drawn with [`sub_stream_seeds`].
///
/// returns: `ChaCha8Rng`
pub(crate) fn sub_stream(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Return a dummy evaluator. This is only used in tests.
///
/// return `Box<dyn Evaluator>`
#[doc(hidden)]
pub fn dummy_evaluator() -> Box<dyn Evaluator> {
    // dummy evaluator function
    #[derive(Debug)]
    struct UserEvaluator;
    impl Evaluator for UserEvaluator {
        fn evaluate(
            &self,
            _: &BinaryVector,
            _: &mut dyn RngCore,
        ) -> Result<Vec<f64>, Box<dyn Error>> {
            Ok(vec![])
        }
    }

    Box::new(UserEvaluator)
}

/// Create the individuals for a `N`-objective dummy problem, where `N` is the number of items in
/// the arrays of `objective_values`. All objectives are minimised and the individuals have a
/// one-bit genome.
///
/// # Arguments
///
/// * `objective_values`: The objective values to set on the individuals. A number of individuals
/// equal to this vector size will be created.
///
/// returns: `Vec<Individual>`
#[cfg(test)]
pub(crate) fn individuals_from_obj_values_dummy<const N: usize>(
    objective_values: &[[f64; N]],
) -> Vec<Individual> {
    let objectives = (0..N)
        .map(|i| Objective::new(format!("obj{i}").as_str(), ObjectiveDirection::Minimise))
        .collect();
    let problem = Arc::new(Problem::new(objectives, 1, dummy_evaluator()).unwrap());

    let mut individuals: Vec<Individual> = Vec::new();
    for data in objective_values {
        let mut individual = Individual::new(problem.clone(), BinaryVector::new(vec![false]));
        individual.update_objectives(data.to_vec()).unwrap();
        individual.set_evaluated();
        individuals.push(individual);
    }

    individuals
}

#[cfg(test)]
mod test {
    use rand::Rng;

    use crate::core::utils::{get_rng, sub_stream, sub_stream_seeds};

    #[test]
    /// The seeds only depend on the master seed.
    fn test_sub_stream_seeds() {
        let s1 = sub_stream_seeds(get_rng(Some(1234)).as_mut(), 5);
        let s2 = sub_stream_seeds(get_rng(Some(1234)).as_mut(), 5);
        assert_eq!(s1, s2);
        assert_ne!(s1, sub_stream_seeds(get_rng(Some(1)).as_mut(), 5));

        let a: u64 = sub_stream(s1[0]).gen();
        let b: u64 = sub_stream(s2[0]).gen();
        assert_eq!(a, b);
    }
}
