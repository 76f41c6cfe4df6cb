use std::fmt;
use std::fmt::{Display, Formatter};

use rand::{Rng, RngCore};
use serde::{Serialize, Serializer};

use crate::core::OError;

/// The solution encoding: a fixed-length vector of bits. The length is set by the problem
/// (see [`crate::core::Problem::genome_length`]) and never changes during an evolution.
///
/// # Example
/// ```
/// use binsga3::core::BinaryVector;
///
/// let mut v = BinaryVector::new(vec![true, false, false]);
/// v.flip(1).unwrap();
/// assert_eq!(v.to_string(), "110");
/// assert_eq!(v.count_ones(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryVector(Vec<bool>);

impl BinaryVector {
    /// Create a binary vector from its bits.
    ///
    /// # Arguments
    ///
    /// * `bits`: The bits.
    ///
    /// returns: `BinaryVector`
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// Generate a binary vector where each bit is set with probability 0.5.
    ///
    /// # Arguments
    ///
    /// * `length`: The number of bits.
    /// * `rng`: The random number generator.
    ///
    /// returns: `BinaryVector`
    pub fn random(length: usize, rng: &mut dyn RngCore) -> Self {
        Self((0..length).map(|_| rng.gen_bool(0.5)).collect())
    }

    /// The number of bits.
    ///
    /// return: `usize`
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector has no bits.
    ///
    /// return: `bool`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the bit at `index`. This returns an error if the index is out of bounds.
    ///
    /// # Arguments
    ///
    /// * `index`: The bit position.
    ///
    /// returns: `Result<bool, OError>`
    pub fn get(&self, index: usize) -> Result<bool, OError> {
        self.0
            .get(index)
            .copied()
            .ok_or(OError::NonExistingIndex("bit".to_string(), index))
    }

    /// Invert the bit at `index`. This returns an error if the index is out of bounds.
    ///
    /// # Arguments
    ///
    /// * `index`: The bit position.
    ///
    /// returns: `Result<(), OError>`
    pub fn flip(&mut self, index: usize) -> Result<(), OError> {
        let bit = self
            .0
            .get_mut(index)
            .ok_or(OError::NonExistingIndex("bit".to_string(), index))?;
        *bit = !*bit;
        Ok(())
    }

    /// Borrow the bits.
    ///
    /// return: `&[bool]`
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    /// The number of bits set to `1`.
    ///
    /// return: `usize`
    pub fn count_ones(&self) -> usize {
        self.0.iter().filter(|b| **b).count()
    }

    /// The number of bits set to `0`.
    ///
    /// return: `usize`
    pub fn count_zeros(&self) -> usize {
        self.len() - self.count_ones()
    }
}

impl From<Vec<bool>> for BinaryVector {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

impl Display for BinaryVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for bit in &self.0 {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl Serialize for BinaryVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod test {
    use crate::core::utils::get_rng;
    use crate::core::BinaryVector;

    #[test]
    /// Random vectors have the requested length and are reproducible with the same seed.
    fn test_random_vector() {
        let v1 = BinaryVector::random(64, get_rng(Some(3)).as_mut());
        let v2 = BinaryVector::random(64, get_rng(Some(3)).as_mut());
        assert_eq!(v1.len(), 64);
        assert_eq!(v1, v2);
        assert_eq!(v1.count_ones() + v1.count_zeros(), 64);
    }

    #[test]
    /// Test flipping and out-of-bounds access.
    fn test_flip() {
        let mut v = BinaryVector::new(vec![false; 4]);
        v.flip(2).unwrap();
        assert_eq!(v.to_string(), "0010");
        assert!(v.get(2).unwrap());
        assert!(v.flip(4).is_err());
        assert!(v.get(10).is_err());
    }

    #[test]
    /// Serialise as a bit string.
    fn test_serialise() {
        let v = BinaryVector::from(vec![true, true, false]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"110\"");
    }
}
