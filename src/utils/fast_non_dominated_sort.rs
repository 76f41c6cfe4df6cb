use std::mem;

use crate::core::{DataValue, Individual, OError};
use crate::operators::{BinaryComparisonOperator, ParetoDominance, PreferredSolution};

/// The name of the data stored on an individual with its front rank (starting from 1).
pub const RANK: &str = "rank";

/// The fronts found by [`fast_non_dominated_sort`], from the non-dominated one (rank 1) to the
/// most dominated one.
#[derive(Debug)]
pub struct NonDominatedSortResults {
    /// The individuals in each front.
    pub fronts: Vec<Vec<Individual>>,
    /// The position of the individuals of each front in the sorted slice, in ascending order.
    pub front_indexes: Vec<Vec<usize>>,
}

/// The pairwise dominance relations of a set of individuals.
struct DominanceTable {
    /// The individuals each individual dominates (`S_p`).
    dominated: Vec<Vec<usize>>,
    /// How many individuals dominate each individual (`n_p`).
    dominators: Vec<usize>,
}

impl DominanceTable {
    fn new(individuals: &[Individual]) -> Result<Self, OError> {
        let size = individuals.len();
        let mut table = Self {
            dominated: vec![Vec::new(); size],
            dominators: vec![0; size],
        };
        for p in 0..size {
            for q in p + 1..size {
                let (winner, loser) =
                    match ParetoDominance::compare(&individuals[p], &individuals[q])? {
                        PreferredSolution::First => (p, q),
                        PreferredSolution::Second => (q, p),
                        PreferredSolution::MutuallyPreferred => continue,
                    };
                table.dominated[winner].push(loser);
                table.dominators[loser] += 1;
            }
        }
        Ok(table)
    }

    /// The individuals that no one dominates.
    fn non_dominated(&self) -> Vec<usize> {
        (0..self.dominators.len())
            .filter(|i| self.dominators[*i] == 0)
            .collect()
    }

    /// Remove one front at a time. Once a front is removed, the individuals left without
    /// dominators form the next one.
    fn into_fronts(mut self) -> Vec<Vec<usize>> {
        let mut fronts = Vec::new();
        let mut front = self.non_dominated();
        while !front.is_empty() {
            let mut next = Vec::new();
            for p in &front {
                for q in &self.dominated[*p] {
                    self.dominators[*q] -= 1;
                    if self.dominators[*q] == 0 {
                        next.push(*q);
                    }
                }
            }
            next.sort_unstable();
            fronts.push(mem::replace(&mut front, next));
        }
        fronts
    }
}

/// Sort the individuals into non-dominated fronts, with the fast sorting of NSGA2 (complexity
/// $O(M * N^2)$, where `M` is the number of objectives and `N` the number of individuals). The
/// front rank, starting from 1, is stored on each individual in the [`RANK`] data.
///
/// > K. Deb, A. Pratap, S. Agarwal and T. Meyarivan, "A fast and elitist multi-objective genetic
/// > algorithm: NSGA-II," in IEEE Transactions on Evolutionary Computation, vol. 6, no. 2, pp.
/// > 182-197, April 2002, doi: 10.1109/4235.996017.
///
/// # Arguments
///
/// * `individuals`: The individuals to sort by dominance. This returns an error if it is empty.
///
/// returns: `Result<NonDominatedSortResults, OError>`.
pub fn fast_non_dominated_sort(
    individuals: &mut [Individual],
) -> Result<NonDominatedSortResults, OError> {
    if individuals.is_empty() {
        return Err(OError::SurvivalOperator(
            "fast non-dominated sort".to_string(),
            "At least 1 individual is needed for sorting, but none given".to_string(),
        ));
    }

    let front_indexes = DominanceTable::new(individuals)?.into_fronts();
    let mut fronts = Vec::with_capacity(front_indexes.len());
    for (rank, front) in front_indexes.iter().enumerate() {
        for i in front {
            individuals[*i].set_data(RANK, DataValue::USize(rank + 1));
        }
        fronts.push(front.iter().map(|i| individuals[*i].clone()).collect());
    }

    Ok(NonDominatedSortResults {
        fronts,
        front_indexes,
    })
}

/// The indexes of the individuals that are not dominated by any other. The individuals are not
/// ranked.
///
/// # Arguments
///
/// * `individuals`: The individuals.
///
/// returns: `Result<Vec<usize>, OError>`.
pub fn non_dominated_front(individuals: &[Individual]) -> Result<Vec<usize>, OError> {
    Ok(DominanceTable::new(individuals)?.non_dominated())
}

#[cfg(test)]
mod test {
    use rand::Rng;

    use crate::core::utils::{get_rng, individuals_from_obj_values_dummy};
    use crate::core::DataValue;
    use crate::operators::{BinaryComparisonOperator, ParetoDominance, PreferredSolution};
    use crate::utils::{fast_non_dominated_sort, non_dominated_front, RANK};

    #[test]
    /// Test the non-dominated sorting. The resulting fronts and ranks were manually calculated by
    /// plotting the objective values.
    fn test_sorting_2obj() {
        let objectives = vec![
            [1.1, 8.1],
            [2.1, 6.1],
            [3.1, 4.1],
            [3.1, 7.1],
            [5.1, 3.1],
            [5.1, 5.1],
            [7.1, 7.1],
            [8.1, 2.1],
            [10.1, 6.1],
            [11.1, 1.1],
            [11.1, 3.1],
        ];
        let mut individuals = individuals_from_obj_values_dummy(&objectives);
        let result = fast_non_dominated_sort(&mut individuals).unwrap();

        // non-dominated front
        let expected_first = vec![0, 1, 2, 4, 7, 9];
        assert_eq!(result.front_indexes[0], expected_first);
        for idx in &expected_first {
            assert_eq!(individuals[*idx].get_data(RANK).unwrap(), DataValue::USize(1));
        }

        // other fronts
        let expected_second = vec![3, 5, 10];
        assert_eq!(result.front_indexes[1], expected_second);
        for idx in expected_second {
            assert_eq!(individuals[idx].get_data(RANK).unwrap(), DataValue::USize(2));
        }

        let expected_third = vec![6, 8];
        assert_eq!(result.front_indexes[2], expected_third);
        for idx in expected_third {
            assert_eq!(individuals[idx].get_data(RANK).unwrap(), DataValue::USize(3));
        }
        assert_eq!(result.fronts.len(), 3);
        assert_eq!(result.fronts[2][0].objective_values(), &[7.1, 7.1]);

        assert_eq!(
            non_dominated_front(&individuals).unwrap(),
            vec![0, 1, 2, 4, 7, 9]
        );
    }

    #[test]
    /// Test the non-dominated sorting. The resulting fronts and ranks were manually calculated by
    /// plotting the objective values.
    fn test_sorting_3obj() {
        let objectives = vec![
            [2.1, 3.1, 4.1],
            [-1.1, 4.1, 8.1],
            [0.1, -1.1, -2.1],
            [0.1, 0.1, 0.1],
        ];
        let mut individuals = individuals_from_obj_values_dummy(&objectives);
        let result = fast_non_dominated_sort(&mut individuals).unwrap();

        assert_eq!(result.front_indexes, vec![vec![1, 2], vec![3], vec![0]]);
        assert_eq!(individuals[0].get_data(RANK).unwrap(), DataValue::USize(3));
        assert_eq!(individuals[3].get_data(RANK).unwrap(), DataValue::USize(2));
    }

    #[test]
    /// One individual is a single front; no individual is an error.
    fn test_sorting_edge_cases() {
        let mut individuals = individuals_from_obj_values_dummy(&[[1.0, 2.0]]);
        let result = fast_non_dominated_sort(&mut individuals).unwrap();
        assert_eq!(result.front_indexes, vec![vec![0]]);
        assert!(fast_non_dominated_sort(&mut []).is_err());
        assert!(non_dominated_front(&[]).unwrap().is_empty());

        // duplicated solutions are in the same front
        let mut individuals = individuals_from_obj_values_dummy(&[[1.0, 2.0], [1.0, 2.0]]);
        let result = fast_non_dominated_sort(&mut individuals).unwrap();
        assert_eq!(result.front_indexes, vec![vec![0, 1]]);
    }

    #[test]
    /// The fronts of random populations are a partition of the individuals and no individual is
    /// dominated by one in the same or a later front.
    fn test_sorting_random_populations() {
        let mut rng = get_rng(Some(10));
        for _ in 0..20 {
            let objectives: Vec<[f64; 3]> = (0..40)
                .map(|_| {
                    [
                        rng.gen_range(0..5) as f64,
                        rng.gen_range(0..5) as f64,
                        rng.gen_range(0..5) as f64,
                    ]
                })
                .collect();
            let mut individuals = individuals_from_obj_values_dummy(&objectives);
            let result = fast_non_dominated_sort(&mut individuals).unwrap();

            let mut all: Vec<usize> = result.front_indexes.iter().flatten().copied().collect();
            all.sort();
            assert_eq!(all, (0..40).collect::<Vec<usize>>());

            for (k, front) in result.front_indexes.iter().enumerate() {
                assert!(!front.is_empty());
                for i in front {
                    for same_or_later in result.front_indexes[k..].iter().flatten() {
                        assert_ne!(
                            ParetoDominance::compare(
                                &individuals[*same_or_later],
                                &individuals[*i]
                            )
                            .unwrap(),
                            PreferredSolution::First
                        );
                    }
                    // every individual after the first front is dominated by one in the previous
                    if k > 0 {
                        assert!(result.front_indexes[k - 1].iter().any(|j| {
                            ParetoDominance::compare(&individuals[*j], &individuals[*i]).unwrap()
                                == PreferredSolution::First
                        }));
                    }
                }
            }
        }
    }
}
