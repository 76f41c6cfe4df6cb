use log::debug;

use crate::algorithms::nsga3::{MIN_DISTANCE, NSGA3, REF_POINT, REF_POINT_INDEX};
use crate::core::{DataValue, Individual, OError};
use crate::utils::argmin;

/// This implements "Algorithm 3" in the paper which links each individual in S_t to the
/// reference line, passing through the origin and a reference point, that is closest to its
/// normalised objectives.
pub(crate) struct AssociateToRefPoint<'a> {
    /// The individuals containing the normalised objectives.
    individuals: &'a mut [Individual],
    /// The reference points
    reference_points: &'a [Vec<f64>],
    /// The unit vector of each reference line.
    directions: Vec<Vec<f64>>,
}

impl<'a> AssociateToRefPoint<'a> {
    /// Build the [`AssociateToRefPoint`] structure. This returns an error if there are no
    /// reference points, or a point has a coordinate outside [0, 1] or all its coordinates
    /// set to 0.
    ///
    /// # Arguments
    ///
    /// * `individuals`: The individuals containing the normalised objectives.
    /// * `reference_points`: The reference points to associate the objectives to.
    ///
    /// returns: `Result<Self, OError>`
    pub fn new(
        individuals: &'a mut [Individual],
        reference_points: &'a [Vec<f64>],
    ) -> Result<Self, OError> {
        if reference_points.is_empty() {
            return Err(Self::error("There are no reference points".to_string()));
        }
        let directions = reference_points
            .iter()
            .map(|point| Self::unit_direction(point))
            .collect::<Result<Vec<Vec<f64>>, OError>>()?;

        Ok(Self {
            individuals,
            reference_points,
            directions,
        })
    }

    /// Link each individual to its closest reference line. The perpendicular distance, the
    /// reference point coordinates and its index are stored in the individual's data. When two
    /// lines are equally close, the reference point listed first is used.
    ///
    /// return `Result<(), OError>`
    pub fn calculate(&mut self) -> Result<(), OError> {
        for ind in self.individuals.iter_mut() {
            let objectives = NSGA3::get_normalised_objectives(ind)?.as_vec()?.clone();
            if objectives.len() != self.directions[0].len() {
                return Err(Self::error(format!(
                    "The normalised objectives {:?} and the reference points have different sizes",
                    objectives
                )));
            }

            let distances: Vec<f64> = self
                .directions
                .iter()
                .map(|u| Self::distance_from_line(u, &objectives))
                .collect();
            let ri = argmin(&distances)
                .ok_or_else(|| Self::error("No distance was calculated".to_string()))?;
            debug!(
                "Linked {:?} to reference point #{} {:?} (distance {})",
                objectives, ri, self.reference_points[ri], distances[ri]
            );

            ind.set_data(MIN_DISTANCE, DataValue::Real(distances[ri]));
            ind.set_data(
                REF_POINT,
                DataValue::Vector(self.reference_points[ri].clone()),
            );
            ind.set_data(REF_POINT_INDEX, DataValue::USize(ri));
        }

        Ok(())
    }

    /// Scale a reference point to a vector of length 1.
    ///
    /// # Arguments
    ///
    /// * `point`: The reference point coordinates.
    ///
    /// returns: `Result<Vec<f64>, OError>`
    fn unit_direction(point: &[f64]) -> Result<Vec<f64>, OError> {
        if point.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(Self::error(format!(
                "The values of the reference point {:?} must be between 0 and 1",
                point,
            )));
        }
        let length = point.iter().map(|v| v * v).sum::<f64>().sqrt();
        if length == 0.0 {
            return Err(Self::error(format!(
                "The reference point {:?} is the origin",
                point
            )));
        }
        Ok(point.iter().map(|v| v / length).collect())
    }

    /// The distance between `point` and its projection on the line with unit vector `u`.
    ///
    /// # Arguments
    ///
    /// * `u`: The unit vector of the line.
    /// * `point`: The point coordinates.
    ///
    /// returns: `f64`
    fn distance_from_line(u: &[f64], point: &[f64]) -> f64 {
        let projection: f64 = u.iter().zip(point).map(|(a, b)| a * b).sum();
        u.iter()
            .zip(point)
            .map(|(a, p)| (p - projection * a).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    fn error(message: String) -> OError {
        OError::AlgorithmRun("NSGA3-AssociateToRefPoint".to_string(), message)
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use crate::algorithms::nsga3::{
        AssociateToRefPoint, Normalise, MIN_DISTANCE, NORMALISED_OBJECTIVE_KEY, REF_POINT,
        REF_POINT_INDEX,
    };
    use crate::core::test_utils::assert_approx_array_eq;
    use crate::core::utils::individuals_from_obj_values_dummy;
    use crate::core::DataValue;
    use crate::utils::{DasDarren1998, NumberOfPartitions};

    #[test]
    /// Normalised points on a 3-objective simplex are linked to the closest axis.
    fn test_simple_association() {
        let ref_points = DasDarren1998::new(3, &NumberOfPartitions::OneLayer(4))
            .unwrap()
            .get_weights();

        // normalised objectives, closest reference point and distance from its line
        let cases = [
            ([0.95, 0.15, 0.15], [1.0, 0.0, 0.0], 0.212132034355),
            ([0.1, 0.9, 0.1], [0.0, 1.0, 0.0], 0.1414213562),
            ([0.0, 0.0, 0.4], [0.0, 0.0, 1.0], 0.0),
        ];
        let mut individuals = individuals_from_obj_values_dummy(&[[0.0, 0.0, 0.0]; 3]);
        for (ind, (objectives, _, _)) in individuals.iter_mut().zip(&cases) {
            ind.set_data(
                NORMALISED_OBJECTIVE_KEY,
                DataValue::Vector(objectives.to_vec()),
            );
        }
        AssociateToRefPoint::new(&mut individuals, &ref_points)
            .unwrap()
            .calculate()
            .unwrap();

        for (ind, (_, expected_point, expected_distance)) in individuals.iter().zip(cases) {
            let point = ind.get_data(REF_POINT).unwrap();
            assert_approx_array_eq(point.as_vec().unwrap(), &expected_point, None);
            let distance = ind.get_data(MIN_DISTANCE).unwrap().as_real().unwrap();
            assert_approx_eq!(f64, distance, expected_distance, epsilon = 0.0001);

            let index = ind.get_data(REF_POINT_INDEX).unwrap().as_usize().unwrap();
            assert_eq!(ref_points[index], expected_point.to_vec());
        }
    }

    #[test]
    /// A point at the same distance from two lines goes to the reference point listed first.
    fn test_tie() {
        let ref_points = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let mut individuals = individuals_from_obj_values_dummy(&[[0.0, 0.0]]);
        individuals[0].set_data(NORMALISED_OBJECTIVE_KEY, DataValue::Vector(vec![0.3, 0.3]));
        AssociateToRefPoint::new(&mut individuals, &ref_points)
            .unwrap()
            .calculate()
            .unwrap();
        assert_eq!(
            individuals[0].get_data(REF_POINT_INDEX).unwrap(),
            DataValue::USize(0)
        );
    }

    #[test]
    /// Individuals normalised on a 2-objective front are associated with the closest line.
    fn test_association_after_normalisation() {
        let mut individuals =
            individuals_from_obj_values_dummy(&[[0.0, 1.0], [1.0, 0.0], [0.45, 0.55]]);
        Normalise::new(&mut individuals)
            .unwrap()
            .calculate()
            .unwrap();

        let ref_points = DasDarren1998::new(2, &NumberOfPartitions::OneLayer(2))
            .unwrap()
            .get_weights();
        AssociateToRefPoint::new(&mut individuals, &ref_points)
            .unwrap()
            .calculate()
            .unwrap();

        let indexes: Vec<usize> = individuals
            .iter()
            .map(|i| i.get_data(REF_POINT_INDEX).unwrap().as_usize().unwrap())
            .collect();
        let expected: Vec<usize> = [[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]]
            .iter()
            .map(|p| {
                ref_points
                    .iter()
                    .position(|r| r.as_slice() == p.as_slice())
                    .unwrap()
            })
            .collect();
        assert_eq!(indexes, expected);
    }

    #[test]
    /// Reference points outside the unit hyper-cube or at the origin are rejected.
    fn test_reference_point_bounds() {
        let mut individuals = individuals_from_obj_values_dummy(&[[0.0, 0.0]]);
        let ref_points = vec![vec![1.2, -0.2]];
        assert!(AssociateToRefPoint::new(&mut individuals, &ref_points).is_err());
        assert!(AssociateToRefPoint::new(&mut individuals, &[]).is_err());
        let origin = vec![vec![0.0, 0.0]];
        assert!(AssociateToRefPoint::new(&mut individuals, &origin).is_err());
    }
}
