use std::collections::BTreeMap;

use log::debug;
use rand::prelude::SliceRandom;
use rand::RngCore;

use crate::algorithms::nsga3::{MIN_DISTANCE, REF_POINT_INDEX};
use crate::core::{Individual, OError, Population};
use crate::utils::argmin_by;

/// This implements "Algorithm 4" in the paper which adds individuals from the last front to the new
/// population based on the reference point association and minimum distance.
pub(crate) struct Niching<'a> {
    /// The population being created at the current evolution with the new selected individuals.
    /// This is `$P_{t+1}$` from the paper and is populated with individuals from
    /// [`Niching::potential_individuals`].
    selected_individuals: &'a mut Population,
    /// Individuals from the last front $F_l$ to add to [`Niching::selected_individuals`].
    potential_individuals: &'a mut Vec<Individual>,
    /// The number of individuals to add to complete the population.
    missing_item_count: usize,
    /// The map from the reference point index to the number of individuals already associated
    /// with it in [`Niching::selected_individuals`].
    rho_j: &'a mut BTreeMap<usize, usize>,
    /// The random number generator
    rng: &'a mut dyn RngCore,
}

impl<'a> Niching<'a> {
    /// Niching algorithm.
    ///
    /// # Arguments
    ///
    /// * `selected_individuals`: The population P_{t+1} without the last front. This will be
    ///    populated with individuals from `potential_individuals`.
    /// * `potential_individuals`: The potential individuals from the last front.
    /// * `number_of_individuals_to_add`: The number of individuals to add to `selected_individuals`
    ///    from `potential_individuals`.
    /// * `rho_j`: The map containing the reference point indexes as keys and the number of
    ///    associated points from P_{t+1}.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Result<Niching, OError>`
    pub fn new(
        selected_individuals: &'a mut Population,
        potential_individuals: &'a mut Vec<Individual>,
        number_of_individuals_to_add: usize,
        rho_j: &'a mut BTreeMap<usize, usize>,
        rng: &'a mut dyn RngCore,
    ) -> Result<Self, OError> {
        let name = "NSGA3-Niching".to_string();
        if rho_j.is_empty() {
            return Err(OError::AlgorithmRun(
                name,
                "The rho_j set is empty".to_string(),
            ));
        }
        if potential_individuals.len() < number_of_individuals_to_add {
            return Err(OError::AlgorithmRun(
                name,
                format!(
                    "The number of individuals to add ({number_of_individuals_to_add}) is larger \
                    than the number of potential individuals ({})",
                    potential_individuals.len()
                ),
            ));
        }

        Ok(Self {
            selected_individuals,
            potential_individuals,
            missing_item_count: number_of_individuals_to_add,
            rho_j,
            rng,
        })
    }

    /// Add new individuals to the population by draining items from the potential individuals.
    /// Reference points not associated with any potential individual are removed from `rho_j`.
    ///
    /// return: `Result<(), OError>`
    pub fn calculate(&mut self) -> Result<(), OError> {
        let name = "NSGA3-Niching".to_string();
        debug!("Number of individuals to choose {}", self.missing_item_count);

        let mut k = 1;
        while k <= self.missing_item_count {
            // reference points with the minimum niche count
            let min_rho_j = match self.rho_j.values().min() {
                Some(v) => *v,
                None => {
                    return Err(OError::AlgorithmRun(
                        name,
                        "All the reference points were excluded".to_string(),
                    ))
                }
            };
            let j_min_set: Vec<usize> = self
                .rho_j
                .iter()
                .filter(|(_, counter)| **counter == min_rho_j)
                .map(|(ref_index, _)| *ref_index)
                .collect();

            let j_hat = *j_min_set
                .choose(&mut *self.rng)
                .ok_or(OError::AlgorithmRun(name.clone(), "Empty j_min_set".to_string()))?;
            debug!("Selected reference point j_hat=#{j_hat} (rho_j = {min_rho_j})");

            // potential individuals linked to j_hat
            let mut i_j: Vec<usize> = Vec::new();
            for (index, ind) in self.potential_individuals.iter().enumerate() {
                if ind.get_data(REF_POINT_INDEX)?.as_usize()? == j_hat {
                    i_j.push(index);
                }
            }

            if i_j.is_empty() {
                debug!("Excluding ref point index {j_hat} - no candidates associated with it");
                self.rho_j.remove(&j_hat);
                continue;
            }

            let (new_ind_index, method) = if min_rho_j == 0 {
                let distances = i_j
                    .iter()
                    .map(|i| self.potential_individuals[*i].get_data(MIN_DISTANCE)?.as_real())
                    .collect::<Result<Vec<f64>, OError>>()?;
                let closest = argmin_by(&distances, |d| *d).ok_or(OError::AlgorithmRun(
                    name.clone(),
                    "Cannot find the closest individual".to_string(),
                ))?;
                (i_j[closest], "min_distance")
            } else {
                let index = *i_j.choose(&mut *self.rng).ok_or(OError::AlgorithmRun(
                    name.clone(),
                    "Cannot pick a random individual".to_string(),
                ))?;
                (index, "random")
            };

            if let Some(counter) = self.rho_j.get_mut(&j_hat) {
                *counter += 1;
            }
            let ind = self.potential_individuals.remove(new_ind_index);
            debug!(
                "Added individual #{new_ind_index} to population ({method}) - reference point #{j_hat}"
            );
            self.selected_individuals.add_individual(ind);
            k += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use crate::algorithms::nsga3::niching::Niching;
    use crate::algorithms::nsga3::{MIN_DISTANCE, REF_POINT_INDEX};
    use crate::core::utils::{get_rng, individuals_from_obj_values_dummy};
    use crate::core::{DataValue, Individual, Population};

    /// Link an individual to a reference point.
    fn link(ind: &mut Individual, ref_point_index: usize, distance: f64) {
        ind.set_data(REF_POINT_INDEX, DataValue::USize(ref_point_index));
        ind.set_data(MIN_DISTANCE, DataValue::Real(distance));
    }

    #[test]
    /// Check that niching adds the point with the minimum distance when the reference point is
    /// not already associated with any selected individual.
    fn test_niching_rho0() {
        let mut individuals = individuals_from_obj_values_dummy(&[[0.0, 0.0]; 2]);
        let mut rho_j: BTreeMap<usize, usize> = BTreeMap::new();

        // link 2 individuals to 2 out of 4 reference points
        link(&mut individuals[0], 0, 0.1);
        rho_j.insert(0, 1);
        link(&mut individuals[1], 1, 0.2);
        rho_j.insert(1, 1);
        let mut pop = Population::new_with(individuals);

        // potential individuals - both are linked to ref_point #3 but the first is closer
        let mut potential_individuals = individuals_from_obj_values_dummy(&[[1.0, 1.0], [2.0, 2.0]]);
        link(&mut potential_individuals[0], 2, 0.4);
        link(&mut potential_individuals[1], 2, 0.9);
        rho_j.insert(2, 0);
        rho_j.insert(3, 0);
        let selected_ind = potential_individuals[0].clone();

        let mut rng = get_rng(Some(1));
        let mut n = Niching::new(
            &mut pop,
            &mut potential_individuals,
            1,
            &mut rho_j,
            rng.as_mut(),
        )
        .unwrap();
        n.calculate().unwrap();

        assert_eq!(rho_j[&2], 1);
        assert_eq!(pop.len(), 3);
        assert_eq!(pop.individual(2).unwrap(), &selected_ind);
        assert_eq!(potential_individuals.len(), 1);
    }

    #[test]
    /// Check that niching picks a random point when the reference point is already associated
    /// with a selected individual. Reference points with no candidates are excluded.
    fn test_niching_rho1() {
        let mut individuals = individuals_from_obj_values_dummy(&[[0.0, 0.0]; 2]);
        let mut rho_j: BTreeMap<usize, usize> = BTreeMap::new();

        link(&mut individuals[0], 0, 0.1);
        rho_j.insert(0, 1);
        link(&mut individuals[1], 1, 0.2);
        rho_j.insert(1, 1);
        let mut pop = Population::new_with(individuals);

        // both potential individuals are linked to ref_point #2
        let mut potential_individuals = individuals_from_obj_values_dummy(&[[1.0, 1.0], [2.0, 2.0]]);
        link(&mut potential_individuals[0], 1, 99.0);
        link(&mut potential_individuals[1], 1, 0.9);
        rho_j.insert(2, 0);

        let mut rng = get_rng(Some(1));
        let mut n = Niching::new(
            &mut pop,
            &mut potential_individuals,
            1,
            &mut rho_j,
            rng.as_mut(),
        )
        .unwrap();
        n.calculate().unwrap();

        // ref point #3 has no candidates
        assert!(!rho_j.contains_key(&2));
        assert_eq!(rho_j[&1], 2);
        assert_eq!(pop.len(), 3);
        let added = pop.individual(2).unwrap();
        assert_eq!(
            added.get_data(REF_POINT_INDEX).unwrap(),
            DataValue::USize(1)
        );
    }

    #[test]
    /// Niching always fills the population up to the requested size and is reproducible.
    fn test_niching_fills_population() {
        let run = |seed: u64| {
            let mut pop = Population::new();
            let objectives: Vec<[f64; 2]> = (0..10).map(|i| [i as f64, 10.0 - i as f64]).collect();
            let mut potential_individuals = individuals_from_obj_values_dummy(&objectives);
            for (i, ind) in potential_individuals.iter_mut().enumerate() {
                link(ind, i % 3, 0.1 * i as f64);
            }
            let mut rho_j: BTreeMap<usize, usize> = (0..5).map(|j| (j, 0)).collect();

            let mut rng = get_rng(Some(seed));
            Niching::new(
                &mut pop,
                &mut potential_individuals,
                7,
                &mut rho_j,
                rng.as_mut(),
            )
            .unwrap()
            .calculate()
            .unwrap();
            assert_eq!(potential_individuals.len(), 3);
            pop
        };

        let pop = run(10);
        assert_eq!(pop.len(), 7);
        assert_eq!(pop, run(10));
    }

    #[test]
    fn test_niching_errors() {
        let mut pop = Population::new();
        let mut potential_individuals = individuals_from_obj_values_dummy(&[[1.0, 1.0]]);
        let mut rng = get_rng(Some(1));

        let mut rho_j: BTreeMap<usize, usize> = BTreeMap::new();
        assert!(Niching::new(
            &mut pop,
            &mut potential_individuals,
            1,
            &mut rho_j,
            rng.as_mut()
        )
        .is_err());

        rho_j.insert(0, 0);
        assert!(Niching::new(
            &mut pop,
            &mut potential_individuals,
            2,
            &mut rho_j,
            rng.as_mut()
        )
        .is_err());
    }
}
