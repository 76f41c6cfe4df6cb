use log::{debug, warn};
use nalgebra::{DMatrix, DVector, SVD};

use crate::algorithms::nsga3::{NORMALISED_OBJECTIVE_KEY, NSGA3};
use crate::core::{DataValue, Individual, OError};
use crate::utils::{all_close, argmin, vector_max, vector_min};

/// The smallest intercept accepted on each objective axis.
const MIN_INTERCEPT: f64 = 1e-3;

/// The weight given to the objectives that are not on the axis of the extreme point being searched.
const ASF_WEIGHT: f64 = 1e-6;

/// The tolerances used to accept the least-squares solution of the hyper-plane coefficients. See
/// [`crate::utils::all_close`].
#[derive(Debug, Clone)]
pub(crate) struct LinearSolverTolerance {
    pub(crate) relative: f64,
    pub(crate) absolute: f64,
}

impl Default for LinearSolverTolerance {
    fn default() -> Self {
        Self {
            relative: 1e-05,
            absolute: 1e-08,
        }
    }
}

/// This implements "Algorithm 2" in the paper which normalises the individuals in S_t using their
/// ideal point and the intercepts of the hyper-plane passing through the extreme points.
///
/// This procedure:
///  - calculates the ideal point as the minimum of each objective across the given individuals
///    (the point is not carried over between generations);
///  - translates and scales the objectives and stores them in the [`NORMALISED_OBJECTIVE_KEY`]
///    data key of each [`Individual`].
pub(crate) struct Normalise<'a> {
    /// The individuals that need normalisation.
    individuals: &'a mut [Individual],
}

/// Calculated points used in the NSGA3 normalisation algorithm.
#[derive(Debug, Clone)]
pub(crate) struct NormalisationPoints {
    /// The ideal point z*.
    pub(crate) ideal_point: Vec<f64>,
    /// The extreme points (translated) used to calculate the hyper-plane intercepts.
    pub(crate) extreme_points: Vec<Vec<f64>>,
    /// The intercepts used to scale the translated objectives.
    pub(crate) intercepts: Vec<f64>,
    /// Whether the hyper-plane was degenerate and the maximum translated objectives were used in
    /// place of its intercepts.
    pub(crate) degenerate: bool,
}

impl<'a> Normalise<'a> {
    /// Build the [`Normalise`] struct. This returns an error if there are no individuals.
    ///
    /// # Arguments
    ///
    /// * `individuals`: The individuals that need normalisation.
    ///
    /// returns: `Result<Normalise, OError>`
    pub fn new(individuals: &'a mut [Individual]) -> Result<Self, OError> {
        if individuals.is_empty() {
            return Err(OError::AlgorithmRun(
                "NSGA3-Normalise".to_string(),
                "The vector of individuals is empty".to_string(),
            ));
        }
        Ok(Normalise { individuals })
    }

    /// Normalise the individuals' objectives. Objectives are first translated with respect to the
    /// ideal point and then scaled using the intercepts of the linear hyper-plane passing through
    /// the extreme points. When the hyper-plane cannot be built, the maximum of each translated
    /// objective is used instead.
    ///
    /// returns: `Result<NormalisationPoints, OError>`
    pub(crate) fn calculate(&mut self) -> Result<NormalisationPoints, OError> {
        let number_of_objectives = self.individuals[0].problem().number_of_objectives();

        // ideal point
        let ideal_point = (0..number_of_objectives)
            .map(|j| {
                let column: Vec<f64> = self
                    .individuals
                    .iter()
                    .map(|ind| ind.objective_values()[j])
                    .collect();
                vector_min(&column)
            })
            .collect::<Result<Vec<f64>, OError>>()?;
        debug!("Set ideal point to {:?}", ideal_point);

        // translate the objectives
        for x in self.individuals.iter_mut() {
            let translated = x.transform_objective_values(|v, j| Ok(v - ideal_point[j]))?;
            x.set_data(NORMALISED_OBJECTIVE_KEY, DataValue::Vector(translated));
        }

        // extreme points
        let translated = self
            .individuals
            .iter()
            .map(|ind| Ok(NSGA3::get_normalised_objectives(ind)?.as_vec()?.clone()))
            .collect::<Result<Vec<Vec<f64>>, OError>>()?;
        let mut extreme_points = Vec::with_capacity(number_of_objectives);
        for j in 0..number_of_objectives {
            let mut weights = vec![ASF_WEIGHT; number_of_objectives];
            weights[j] = 1.0;

            let asf_values = translated
                .iter()
                .map(|f| Self::asf(f, &weights))
                .collect::<Result<Vec<f64>, OError>>()?;
            let index = argmin(&asf_values).ok_or(OError::AlgorithmRun(
                "NSGA3-Normalise".to_string(),
                "Cannot find the extreme point".to_string(),
            ))?;
            extreme_points.push(translated[index].clone());
        }
        debug!("Set extreme points to {:?}", extreme_points);

        // intercepts
        let (intercepts, degenerate) = match Self::calculate_plane_intercepts(
            &extreme_points,
            Some(LinearSolverTolerance::default()),
        ) {
            Ok(intercepts) => {
                debug!("Found intercepts {:?}", intercepts);
                (intercepts, false)
            }
            Err(e) => {
                let max_points = Self::calculate_max_objectives(&translated, number_of_objectives)?;
                warn!("{e}. Using the maximum objectives {:?} as intercepts", max_points);
                (max_points, true)
            }
        };

        // normalise. The intercepts are already relative to the ideal point
        for (individual, values) in self.individuals.iter_mut().zip(translated) {
            let normalised: Vec<f64> = values
                .iter()
                .zip(&intercepts)
                .map(|(v, a)| v / a)
                .collect();
            debug!("Normalised objectives to {:?}", normalised);
            individual.set_data(NORMALISED_OBJECTIVE_KEY, DataValue::Vector(normalised));
        }

        Ok(NormalisationPoints {
            ideal_point,
            extreme_points,
            intercepts,
            degenerate,
        })
    }

    /// Use the least square method to calculate the coefficients of the plane passing through the
    /// vector of `points`. For a 3D system the plane equation is $ax + by + cz = 1$ and the
    /// coefficients $x = [a, b, c]$ are found by solving $A \cdot x = b$ where
    ///
    /// ```text
    ///          | x_0   y_0   z_0 |
    ///      A = | x_1   y_1   z_1 |
    ///          |       ...       |
    ///          | x_n   y_n   z_n |
    /// ```
    ///
    /// and $b = [1, 1, ..., 1]$. Each axis intercept is then $1/x_i$.
    ///
    /// # Arguments
    ///
    /// * `points`: The point coordinates the plane passes through.
    /// * `tolerance`: The tolerance used to accept the solution of the linear system.
    ///
    /// returns: `Result<Vec<f64>, OError>`: The intercepts, or [`OError::DegenerateHyperplane`]
    /// when the system cannot be solved or an intercept is not finite or smaller than `1e-3`.
    pub(crate) fn calculate_plane_intercepts(
        points: &[Vec<f64>],
        tolerance: Option<LinearSolverTolerance>,
    ) -> Result<Vec<f64>, OError> {
        let plane_coefficients = Self::plane_coefficients(points, tolerance)?;
        debug!("Plane coefficients {:?}", plane_coefficients);

        let intercepts: Vec<f64> = plane_coefficients.iter().map(|v| 1.0 / v).collect();
        if intercepts
            .iter()
            .any(|v| !v.is_finite() || *v < MIN_INTERCEPT)
        {
            return Err(OError::DegenerateHyperplane(format!(
                "The intercepts {:?} must be finite and larger than {MIN_INTERCEPT}",
                intercepts
            )));
        }
        Ok(intercepts)
    }

    /// Solve `A * x = 1` in the least-squares sense with a singular value decomposition, where
    /// each row of `A` is one of the `points`. When `tolerance` is given, the solution is rejected
    /// if `A * x` is not close to 1.
    ///
    /// # Arguments
    ///
    /// * `points`: The rows of `A`. All the points must have the same number of coordinates.
    /// * `tolerance`: The tolerance used to accept the solution.
    ///
    /// returns: `Result<Vec<f64>, OError>`
    fn plane_coefficients(
        points: &[Vec<f64>],
        tolerance: Option<LinearSolverTolerance>,
    ) -> Result<Vec<f64>, OError> {
        let columns = points.first().map_or(0, |p| p.len());
        if columns == 0 || points.iter().any(|p| p.len() != columns) {
            return Err(OError::DegenerateHyperplane(format!(
                "The points {:?} must be non-empty and have the same size",
                points
            )));
        }
        // nalgebra's decomposition does not converge with infinite values
        if points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(OError::DegenerateHyperplane(format!(
                "The points {:?} must have finite coordinates",
                points
            )));
        }

        let a = DMatrix::from_fn(points.len(), columns, |r, c| points[r][c]);
        let b = DVector::from_element(points.len(), 1.0);
        let svd = SVD::try_new(a.clone(), true, true, f64::EPSILON, 0).ok_or_else(|| {
            OError::DegenerateHyperplane("The decomposition did not converge".to_string())
        })?;
        let solution = svd
            .solve(&b, f64::EPSILON)
            .map_err(|e| OError::DegenerateHyperplane(e.to_string()))?;

        if let Some(tolerance) = tolerance {
            let found_b = &a * &solution;
            if !all_close(
                b.as_slice(),
                found_b.as_slice(),
                Some(tolerance.relative),
                Some(tolerance.absolute),
            ) {
                return Err(OError::DegenerateHyperplane(
                    "The plane does not pass through the points".to_string(),
                ));
            }
        }
        Ok(solution.as_slice().to_vec())
    }

    /// Calculate the maximum value of each translated objective. The value is never smaller than
    /// `f64::EPSILON`.
    ///
    /// # Arguments
    ///
    /// * `translated`: The translated objectives of all individuals.
    /// * `number_of_objectives`: The number of objectives.
    ///
    /// return: `Result<Vec<f64>, OError>`
    fn calculate_max_objectives(
        translated: &[Vec<f64>],
        number_of_objectives: usize,
    ) -> Result<Vec<f64>, OError> {
        (0..number_of_objectives)
            .map(|j| {
                let mut values: Vec<f64> = translated.iter().map(|f| f[j]).collect();
                values.push(f64::EPSILON);
                vector_max(&values)
            })
            .collect()
    }

    /// Calculate the achievement scalarising function with weight vector `w`. This is Eq. 4 in the
    /// paper.
    ///
    /// # Arguments
    ///
    /// * `translated_objective`: The translated objective for an individual. This is f'_j(x).
    /// * `weights`: The weight vector.
    ///
    /// returns: `Result<f64, OError>`
    fn asf(translated_objective: &[f64], weights: &[f64]) -> Result<f64, OError> {
        let asf: Vec<f64> = translated_objective
            .iter()
            .zip(weights)
            .map(|(x, w)| x / w)
            .collect();
        vector_max(&asf)
    }
}

#[cfg(test)]
mod test {
    use crate::algorithms::nsga3::normalise::{LinearSolverTolerance, Normalise};
    use crate::algorithms::nsga3::NORMALISED_OBJECTIVE_KEY;
    use crate::core::test_utils::assert_approx_array_eq;
    use crate::core::utils::individuals_from_obj_values_dummy;
    use crate::core::OError;

    #[test]
    /// Test intercepts. Points were generated from numpy from uniform distribution with normal
    /// distributed noise on z coordinates (scale=1). Plane was generated to have slope of -2 in
    /// the x direction and -3 in the y direction.
    fn test_intercepts() {
        let points = vec![
            vec![3.3817863, 0.40604364, -2.2899773],
            vec![4.1741924, 0.92094903, -5.91434001],
            vec![3.42070899, 0.90266942, -3.81063094],
            vec![1.11301849, 0.94849208, 0.17140235],
            vec![9.08303894, 0.74599477, -16.14020622],
            vec![0.98976491, 0.84847939, 0.82864021],
            vec![7.53579489, 0.73723563, -11.72284018],
            vec![6.96274164, 0.59449793, -10.71963907],
            vec![5.60255823, 1.69973452, -12.49841699],
            vec![6.16815342, 0.66601692, -11.63169056],
        ];

        let tol = LinearSolverTolerance {
            relative: 0.01,
            absolute: 0.01,
        };
        let intercepts = Normalise::calculate_plane_intercepts(&points, Some(tol)).unwrap();
        assert_approx_array_eq(
            &intercepts,
            &[3.38096778, 1.61009025, 7.58962871],
            Some(1e-6),
        );
    }

    #[test]
    /// Negative intercepts are rejected.
    fn test_negative_intercepts() {
        let points = vec![vec![-1.0, 0.0], vec![0.0, 2.0]];
        let err = Normalise::calculate_plane_intercepts(&points, None).unwrap_err();
        assert!(matches!(err, OError::DegenerateHyperplane(_)));
    }

    #[test]
    /// Points with infinite coordinates or different sizes give a degenerate hyper-plane.
    fn test_invalid_plane_points() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let points = vec![vec![value, 0.0], vec![0.0, 2.0]];
            let err = Normalise::calculate_plane_intercepts(
                &points,
                Some(LinearSolverTolerance::default()),
            )
            .unwrap_err();
            assert!(matches!(err, OError::DegenerateHyperplane(_)));
        }

        let points = vec![vec![1.0, 0.0], vec![0.0]];
        assert!(Normalise::calculate_plane_intercepts(&points, None).is_err());
        assert!(Normalise::calculate_plane_intercepts(&[], None).is_err());
    }

    #[test]
    /// Points on a line through the origin have no plane with `ax + by = 1`. The least-squares
    /// solution is rejected when it is checked.
    fn test_collinear_points() {
        let points = vec![vec![1.0, 1.0], vec![2.0, 2.0]];
        assert!(Normalise::calculate_plane_intercepts(
            &points,
            Some(LinearSolverTolerance::default())
        )
        .is_err());
    }

    #[test]
    /// Objectives already in [0, 1] with the extreme points on the axes are not changed.
    fn test_normalisation_round_trip() {
        let objectives = [
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.2, 0.3, 0.5],
            [0.6, 0.1, 0.3],
        ];
        let mut individuals = individuals_from_obj_values_dummy(&objectives);
        let points = Normalise::new(&mut individuals)
            .unwrap()
            .calculate()
            .unwrap();

        assert!(!points.degenerate);
        assert_approx_array_eq(&points.ideal_point, &[0.0, 0.0, 0.0], None);
        assert_approx_array_eq(&points.intercepts, &[1.0, 1.0, 1.0], Some(1e-9));
        assert_approx_array_eq(&points.extreme_points[0], &[1.0, 0.0, 0.0], None);
        assert_approx_array_eq(&points.extreme_points[1], &[0.0, 1.0, 0.0], None);
        assert_approx_array_eq(&points.extreme_points[2], &[0.0, 0.0, 1.0], None);

        for (ind, expected) in individuals.iter().zip(objectives) {
            let data = ind.get_data(NORMALISED_OBJECTIVE_KEY).unwrap();
            assert_approx_array_eq(data.as_vec().unwrap(), &expected, Some(1e-9));
        }
    }

    #[test]
    /// The objectives are translated by the ideal point and scaled by the intercepts.
    fn test_normalisation_translated() {
        let objectives = [[3.0, 12.0], [7.0, 2.0], [5.0, 7.0]];
        let mut individuals = individuals_from_obj_values_dummy(&objectives);
        let points = Normalise::new(&mut individuals)
            .unwrap()
            .calculate()
            .unwrap();

        assert!(!points.degenerate);
        assert_approx_array_eq(&points.ideal_point, &[3.0, 2.0], None);
        assert_approx_array_eq(&points.intercepts, &[4.0, 10.0], Some(1e-9));

        let expected = [[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]];
        for (ind, expected) in individuals.iter().zip(expected) {
            let data = ind.get_data(NORMALISED_OBJECTIVE_KEY).unwrap();
            assert_approx_array_eq(data.as_vec().unwrap(), &expected, Some(1e-9));
        }
    }

    #[test]
    /// When all the individuals are identical the hyper-plane cannot be built. The maximum
    /// objectives are used and the run is not stopped.
    fn test_degenerate_hyperplane() {
        let objectives = [[2.0, 5.0, 1.0]; 4];
        let mut individuals = individuals_from_obj_values_dummy(&objectives);
        let points = Normalise::new(&mut individuals)
            .unwrap()
            .calculate()
            .unwrap();

        assert!(points.degenerate);
        assert_approx_array_eq(&points.intercepts, &[f64::EPSILON; 3], None);
        for ind in individuals.iter() {
            let data = ind.get_data(NORMALISED_OBJECTIVE_KEY).unwrap();
            assert_approx_array_eq(data.as_vec().unwrap(), &[0.0, 0.0, 0.0], None);
        }
    }

    #[test]
    fn test_empty() {
        assert!(Normalise::new(&mut []).is_err());
    }
}
