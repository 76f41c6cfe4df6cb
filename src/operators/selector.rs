use rand::prelude::SliceRandom;
use rand::RngCore;

use crate::core::{Individual, OError};

/// A trait implementing methods to choose individuals from a population for reproduction.
pub trait Selector {
    /// Select a number of individuals from the population equal to `number_of_winners`.
    ///
    /// # Arguments
    ///
    /// * `individuals`: The individuals.
    /// * `number_of_winners`: The number of winners to select.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Result<Vec<Individual>, OError>`
    fn select(
        &self,
        individuals: &[Individual],
        number_of_winners: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Individual>, OError> {
        let mut winners: Vec<Individual> = Vec::with_capacity(number_of_winners);
        for _ in 0..number_of_winners {
            winners.push(self.select_fit_individual(individuals, rng)?);
        }
        Ok(winners)
    }

    /// Select one individual from the population.
    ///
    /// # Arguments
    ///
    /// * `individuals`: The list of individuals.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Result<Individual, OError>`
    fn select_fit_individual(
        &self,
        individuals: &[Individual],
        rng: &mut dyn RngCore,
    ) -> Result<Individual, OError>;
}

/// Pick parents uniformly at random, with replacement. NSGA-III does not use a tournament since
/// the selection pressure comes from the niching in the survival step (see Section IV-E in
/// Deb & Jain (2014)).
pub struct RandomSelector;

impl Selector for RandomSelector {
    /// Select a random individual. This returns an error if the population is empty.
    ///
    /// # Arguments
    ///
    /// * `individuals`:The individuals with the solutions.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Result<Individual, OError>`
    fn select_fit_individual(
        &self,
        individuals: &[Individual],
        rng: &mut dyn RngCore,
    ) -> Result<Individual, OError> {
        individuals
            .choose(rng)
            .cloned()
            .ok_or(OError::SelectorOperator(
                "RandomSelector".to_string(),
                "The population is empty and no individual can be selected".to_string(),
            ))
    }
}

#[cfg(test)]
mod test {
    use crate::core::utils::{get_rng, individuals_from_obj_values_dummy};
    use crate::operators::{RandomSelector, Selector};

    #[test]
    fn test_random_selector() {
        let individuals =
            individuals_from_obj_values_dummy(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.0]]);
        let mut rng = get_rng(Some(1));
        let winners = RandomSelector
            .select(&individuals, 200, rng.as_mut())
            .unwrap();
        assert_eq!(winners.len(), 200);
        // every individual is picked at least once
        for individual in &individuals {
            assert!(winners
                .iter()
                .any(|w| w.objective_values() == individual.objective_values()));
        }

        assert!(RandomSelector
            .select_fit_individual(&[], rng.as_mut())
            .is_err());
    }
}
