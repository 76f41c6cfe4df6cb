use serde::{Deserialize, Serialize};

use crate::core::OError;

/// The number of ways of choosing `k` items out of `n`. Each step multiplies before dividing, so
/// the partial products are exact integers.
///
/// returns: `Option<u64>`. `None` when the coefficient does not fit in a `u64`.
fn binomial_coefficient(mut n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let mut r: u64 = 1;
    for d in 1..=k {
        r = r.checked_mul(n)? / d;
        n -= 1;
    }
    Some(r)
}

/// The gaps of a lattice with a boundary and an inner layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TwoLayerPartitions {
    /// The gaps on each axis for the points on the simplex boundary.
    pub boundary_layer: usize,
    /// The gaps on each axis for the points moved inside the simplex.
    pub inner_layer: usize,
    /// Control the size of the inner layer. The inner points are shrunk towards the simplex
    /// centroid as `(1 - s) / M + s * x`. This defaults to 0.5 and must be in (0, 1].
    pub scaling: Option<f64>,
}

/// How the unit simplex is split to place the reference points. With many objectives (more than
/// 5) a single layer either needs a lot of points or leaves the middle of the simplex empty; two
/// coarse layers avoid both.
#[derive(Serialize, Clone, Deserialize, Debug, PartialEq)]
pub enum NumberOfPartitions {
    /// The gaps on each axis of a single lattice.
    OneLayer(usize),
    /// A boundary lattice plus a second lattice shrunk towards the centroid. The points of the
    /// inner lattice follow the boundary ones.
    TwoLayers(TwoLayerPartitions),
}

impl NumberOfPartitions {
    /// The number of partitions suggested in Table I of Deb & Jain (2014) for a problem with
    /// `number_of_objectives` objectives. Problems with more than 5 objectives use two layers.
    ///
    /// # Arguments
    ///
    /// * `number_of_objectives`: The number of problem objectives.
    ///
    /// returns: `NumberOfPartitions`
    pub fn suggested(number_of_objectives: usize) -> Self {
        match number_of_objectives {
            0..=3 => NumberOfPartitions::OneLayer(12),
            4..=5 => NumberOfPartitions::OneLayer(6),
            6..=10 => NumberOfPartitions::TwoLayers(TwoLayerPartitions {
                boundary_layer: 3,
                inner_layer: 2,
                scaling: None,
            }),
            _ => NumberOfPartitions::TwoLayers(TwoLayerPartitions {
                boundary_layer: 2,
                inner_layer: 1,
                scaling: None,
            }),
        }
    }
}

/// Reference points on the unit simplex, where each coordinate is a multiple of `1/p` and the
/// coordinates sum to 1 (Section 5.2 of Das & Dennis, 1998,
/// <https://doi.org/10.1137/S1052623496307510>). With `M` objectives one layer has
/// `C(M + p - 1, M - 1)` points.
///
/// # Examples
/// ## One layer
/// ```
/// use binsga3::utils::{DasDarren1998, NumberOfPartitions};
/// use binsga3::core::OError;
///
/// fn main() -> Result<(), OError> {
///     // 3 objectives and 5 gaps per axis
///     let points = DasDarren1998::new(3, &NumberOfPartitions::OneLayer(5))?;
///     assert_eq!(points.number_of_points(), 21);
///
///     let weights = points.get_weights();
///     assert_eq!(weights[0], vec![0.0, 0.0, 1.0]);
///     Ok(())
/// }
/// ```
///
/// ## Two layers
/// ```
/// use binsga3::utils::{DasDarren1998, NumberOfPartitions, TwoLayerPartitions};
/// use binsga3::core::OError;
///
/// fn main() -> Result<(), OError> {
///     let partitions = NumberOfPartitions::TwoLayers(TwoLayerPartitions {
///         boundary_layer: 5,
///         inner_layer: 4,
///         scaling: None,
///     });
///     let points = DasDarren1998::new(3, &partitions)?;
///     assert_eq!(points.number_of_points(), 21 + 15);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DasDarren1998 {
    number_of_objectives: usize,
    number_of_partitions: NumberOfPartitions,
    /// The number of reference points.
    number_of_points: u64,
}

impl DasDarren1998 {
    /// Initialise the Das & Darren approach to calculate reference points or weights. This
    /// returns an error if there are less than 2 objectives, a layer has no partitions, the
    /// inner layer scaling factor is not in (0, 1] or the number of points is too large to be
    /// counted.
    ///
    /// # Arguments
    ///
    /// * `number_of_objectives`: The simplex dimension.
    /// * `number_of_partitions`: The gaps of the lattice layers.
    ///
    /// returns: `Result<Self, OError>`
    pub fn new(
        number_of_objectives: usize,
        number_of_partitions: &NumberOfPartitions,
    ) -> Result<Self, OError> {
        if number_of_objectives < 2 {
            return Err(OError::Configuration(format!(
                "At least 2 objectives are needed to generate the reference points, but {} given",
                number_of_objectives
            )));
        }

        match number_of_partitions {
            NumberOfPartitions::OneLayer(p) => Self::check_partitions(*p, "")?,
            NumberOfPartitions::TwoLayers(layers) => {
                Self::check_partitions(layers.boundary_layer, "boundary layer ")?;
                Self::check_partitions(layers.inner_layer, "inner layer ")?;
                if let Some(scaling) = layers.scaling {
                    if scaling < f64::EPSILON || scaling > 1.0 {
                        return Err(OError::Configuration(format!(
                            "The inner layer scaling factor must be larger than 0 and at most 1, but {} given",
                            scaling
                        )));
                    }
                }
            }
        }

        let layer_size = |p: usize| {
            binomial_coefficient(number_of_objectives as u64 + p as u64 - 1, p as u64)
        };
        let number_of_points = match number_of_partitions {
            NumberOfPartitions::OneLayer(p) => layer_size(*p),
            NumberOfPartitions::TwoLayers(layers) => layer_size(layers.boundary_layer)
                .zip(layer_size(layers.inner_layer))
                .and_then(|(boundary, inner)| boundary.checked_add(inner)),
        }
        .ok_or_else(|| {
            OError::Configuration(format!(
                "The number of reference points for {} objectives and {:?} overflows",
                number_of_objectives, number_of_partitions
            ))
        })?;

        Ok(DasDarren1998 {
            number_of_objectives,
            number_of_partitions: number_of_partitions.clone(),
            number_of_points,
        })
    }

    fn check_partitions(partitions: usize, layer: &str) -> Result<(), OError> {
        if partitions < 1 {
            return Err(OError::Configuration(format!(
                "The {layer}number of partitions must be at least 1"
            )));
        }
        Ok(())
    }

    /// The number of points in all layers.
    pub fn number_of_points(&self) -> u64 {
        self.number_of_points
    }

    /// The coordinates of all the points. Each point has one coordinate per objective, in [0, 1],
    /// and its coordinates sum to 1.
    pub fn get_weights(&self) -> Vec<Vec<f64>> {
        match &self.number_of_partitions {
            NumberOfPartitions::OneLayer(number_of_partitions) => {
                self.layer_weights(*number_of_partitions)
            }
            NumberOfPartitions::TwoLayers(layers) => {
                let mut final_weights = self.layer_weights(layers.boundary_layer);

                // shrink the inner layer towards the centroid and then merge it
                let scaling = layers.scaling.unwrap_or(0.5);
                let offset = (1.0 - scaling) / self.number_of_objectives as f64;
                for inner_point in self.layer_weights(layers.inner_layer) {
                    final_weights.push(inner_point.iter().map(|v| offset + scaling * v).collect());
                }
                final_weights
            }
        }
    }

    /// The points of the lattice with `partitions` gaps on each axis, sorted by their
    /// coordinates. Each point is stored as the number of gaps taken on each axis; the last axis
    /// takes the gaps left by the other ones.
    fn layer_weights(&self, partitions: usize) -> Vec<Vec<f64>> {
        let m = self.number_of_objectives;
        let mut gaps = vec![0; m];
        gaps[m - 1] = partitions;

        let mut points = Vec::new();
        loop {
            points.push(gaps.iter().map(|g| *g as f64 / partitions as f64).collect());
            if gaps[m - 1] > 0 {
                gaps[m - 2] += 1;
                gaps[m - 1] -= 1;
                continue;
            }
            // carry into the previous axis
            match (0..m - 1).rev().find(|j| gaps[*j] > 0) {
                Some(j) if j > 0 => {
                    gaps[m - 1] = gaps[j] - 1;
                    gaps[j] = 0;
                    gaps[j - 1] += 1;
                }
                _ => break,
            }
        }
        points
    }
}
