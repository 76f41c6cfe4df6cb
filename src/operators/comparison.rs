use crate::core::{Individual, OError};

/// The preferred solution with the `BinaryComparisonOperator`.
#[derive(Debug, PartialOrd, PartialEq)]
pub enum PreferredSolution {
    /// The first solution is preferred.
    First,
    /// The second solution is preferred.
    Second,
    /// The two solutions are mutually preferred.
    MutuallyPreferred,
}

/// A trait to implement a comparison operator between two solutions.
pub trait BinaryComparisonOperator {
    /// Compare two solution and select the best one.
    ///
    /// # Arguments
    ///
    /// * `first_solution`: The first solution to compare.
    /// * `second_solution`: The second solution to compare.
    ///
    /// returns: `Result<PreferredSolution, OError>` The preferred solution.
    fn compare(
        first_solution: &Individual,
        second_solution: &Individual,
    ) -> Result<PreferredSolution, OError>
    where
        Self: Sized;
}

/// This assesses the Pareto dominance between two solutions $S_1$ and $S_2$. $S_1$ dominates
/// $S_2$ ($ S_1 \prec S_2 $) when it is not worse than $S_2$ in all objectives and strictly better
/// in at least one. Objectives are compared as stored on the individuals, where every objective is
/// minimised.
///
/// See: K. Deb, A. Pratap, S. Agarwal and T. Meyarivan (2002). <https://doi.org/10.1109/4235.996017>.
pub struct ParetoDominance;

impl BinaryComparisonOperator for ParetoDominance {
    /// Get the dominance relation between two solutions. This returns an error if the two
    /// solutions do not have the same number of objectives.
    ///
    /// # Arguments
    ///
    /// * `first_solution`: The first solution to compare.
    /// * `second_solution`: The second solution to compare.
    ///
    /// returns: `Result<PreferredSolution, OError>` The dominance relation between solution 1
    /// and 2.
    fn compare(
        first_solution: &Individual,
        second_solution: &Individual,
    ) -> Result<PreferredSolution, OError> {
        let obj_sol1 = first_solution.objective_values();
        let obj_sol2 = second_solution.objective_values();
        if obj_sol1.len() != obj_sol2.len() {
            return Err(OError::ComparisonOperator(
                "ParetoDominance".to_string(),
                format!(
                    "The solutions have a different number of objectives ({} and {})",
                    obj_sol1.len(),
                    obj_sol2.len()
                ),
            ));
        }

        let mut relation = PreferredSolution::MutuallyPreferred;
        for (o1, o2) in obj_sol1.iter().zip(obj_sol2) {
            if o1 < o2 {
                if relation == PreferredSolution::Second {
                    // mutually dominated
                    return Ok(PreferredSolution::MutuallyPreferred);
                }
                relation = PreferredSolution::First;
            } else if o1 > o2 {
                if relation == PreferredSolution::First {
                    // mutually dominated
                    return Ok(PreferredSolution::MutuallyPreferred);
                }
                relation = PreferredSolution::Second;
            }
        }

        Ok(relation)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::core::utils::{dummy_evaluator, individuals_from_obj_values_dummy};
    use crate::core::{BinaryVector, Individual, Objective, ObjectiveDirection, Problem};
    use crate::operators::{BinaryComparisonOperator, ParetoDominance, PreferredSolution};

    fn compare(a: [f64; 2], b: [f64; 2]) -> PreferredSolution {
        let individuals = individuals_from_obj_values_dummy(&[a, b]);
        ParetoDominance::compare(&individuals[0], &individuals[1]).unwrap()
    }

    #[test]
    /// Test problem with two objectives
    fn test_two_objectives() {
        // Sol 1 dominates
        assert_eq!(compare([5.0, 1.0], [15.0, 1.0]), PreferredSolution::First);
        assert_eq!(compare([5.0, 1.0], [15.0, 2.0]), PreferredSolution::First);
        // Sol 2 dominates
        assert_eq!(compare([5.0, 3.0], [1.0, 3.0]), PreferredSolution::Second);
        // Mutually preferred
        assert_eq!(
            compare([5.0, 3.0], [1.0, 13.0]),
            PreferredSolution::MutuallyPreferred
        );
        assert_eq!(
            compare([5.0, 3.0], [5.0, 3.0]),
            PreferredSolution::MutuallyPreferred
        );
    }

    #[test]
    /// Test maximised objectives: the value stored on the individual is already negated.
    fn test_maximised_objective() {
        let objectives = vec![
            Objective::new("obj1", ObjectiveDirection::Maximise),
            Objective::new("obj2", ObjectiveDirection::Minimise),
        ];
        let problem = Arc::new(Problem::new(objectives, 1, dummy_evaluator()).unwrap());

        let mut solution1 = Individual::new(problem.clone(), BinaryVector::new(vec![true]));
        let mut solution2 = Individual::new(problem.clone(), BinaryVector::new(vec![false]));
        solution1.update_objectives(vec![5.0, 1.0]).unwrap();
        solution2.update_objectives(vec![15.0, 1.0]).unwrap();
        assert_eq!(
            ParetoDominance::compare(&solution1, &solution2).unwrap(),
            PreferredSolution::Second
        );
    }

    #[test]
    /// Solutions with a different number of objectives cannot be compared.
    fn test_wrong_size() {
        let a = individuals_from_obj_values_dummy(&[[1.0, 2.0]]);
        let b = individuals_from_obj_values_dummy(&[[1.0, 2.0, 3.0]]);
        assert!(ParetoDominance::compare(&a[0], &b[0]).is_err());
    }
}
