use ordered_float::OrderedFloat;

use crate::core::OError;

/// Calculate the vector minimum value.
///
/// # Arguments
///
/// * `v`: The vector.
///
/// returns: `Result<f64, OError>`
pub fn vector_min(v: &[f64]) -> Result<f64, OError> {
    v.iter()
        .copied()
        .min_by(|a, b| a.total_cmp(b))
        .ok_or(OError::Generic(
            "Cannot calculate vector min value".to_string(),
        ))
}

/// Calculate the vector maximum value.
///
/// # Arguments
///
/// * `v`: The vector.
///
/// returns: `Result<f64, OError>`
pub fn vector_max(v: &[f64]) -> Result<f64, OError> {
    v.iter()
        .copied()
        .max_by(|a, b| a.total_cmp(b))
        .ok_or(OError::Generic(
            "Cannot calculate vector max value".to_string(),
        ))
}

/// Return the index of the smallest item in the vector, or `None` if the vector is empty. When
/// the minimum appears more than once, the first index is returned.
///
/// # Arguments
///
/// * `v`: The vector.
///
/// returns: `Option<usize>`
pub fn argmin(v: &[f64]) -> Option<usize> {
    argmin_by(v, |x| *x)
}

/// Return the index of the item whose `key` is the smallest, or `None` if the vector is empty.
/// When the minimum appears more than once, the first index is returned.
///
/// # Arguments
///
/// * `v`: The vector.
/// * `key`: The function returning the number to compare for each item.
///
/// returns: `Option<usize>`
pub fn argmin_by<T, F: Fn(&T) -> f64>(v: &[T], key: F) -> Option<usize> {
    v.iter()
        .enumerate()
        .min_by_key(|(_, x)| OrderedFloat(key(x)))
        .map(|(index, _)| index)
}

/// Returns `true` if two arrays are element-wise equal within a tolerance. This behaves as the
/// numpy implementation at <https://numpy.org/doc/stable/reference/generated/numpy.allclose.html>.
///
/// # Arguments
///
/// * `a`: First vector to compare.
/// * `b`: Second vector to compare.
/// * `r_tol`: The relative tolerance parameter
/// * `a_tol`: The absolute tolerance parameter
///
/// returns: `bool`
pub fn all_close(a: &[f64], b: &[f64], r_tol: Option<f64>, a_tol: Option<f64>) -> bool {
    let r_tol = r_tol.unwrap_or(1e-05);
    let a_tol = a_tol.unwrap_or(1e-08);

    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(v1, v2)| (v1 - v2).abs() <= (a_tol + r_tol * v2.abs()))
}

#[cfg(test)]
mod test {
    use crate::utils::vectors::{all_close, argmin, argmin_by, vector_max, vector_min};

    #[test]
    fn test_min_max() {
        let vec = vec![99.0, 11.0, 456.2, 19.0, 0.5];
        assert_eq!(vector_min(&vec).unwrap(), 0.5);
        assert_eq!(vector_max(&vec).unwrap(), 456.2);
        assert!(vector_min(&[]).is_err());
    }

    #[test]
    fn test_argmin() {
        assert_eq!(argmin(&[99.0, 11.0, 0.5, 19.0, 0.5]), Some(2));
        assert_eq!(argmin(&[]), None);
        assert_eq!(argmin_by(&[[1.0, 3.0], [2.0, -1.0]], |x| x[1]), Some(1));
    }

    #[test]
    fn test_all_close() {
        assert!(all_close(&[1.0, 2.0], &[1.0, 2.0 + 1e-9], None, None));
        assert!(!all_close(&[1.0, 2.0], &[1.0, 2.1], None, None));
        assert!(!all_close(&[1.0], &[1.0, 2.0], None, None));
    }
}
