//! # Input Normalization
//!
//! Domain newtypes for the two solver inputs.
//!
//! - [`PackSizeSet`] — ascending, duplicate-free, strictly positive pack
//!   sizes with O(1) membership tests. Built once per request from raw
//!   caller input and immutable afterwards.
//! - [`OrderQuantity`] — a non-negative item count.
//!
//! Normalization is lenient: zero and negative sizes are dropped as noise,
//! not rejected. Surfaces that must reject them use
//! [`PackSizeSet::try_from_strict`].

use std::collections::HashSet;

use crate::error::ValidationError;

/// An ascending sequence of distinct positive pack sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackSizeSet {
    sizes: Vec<u64>,
    index: HashSet<u64>,
}

impl PackSizeSet {
    /// Normalize raw caller input.
    ///
    /// Values `<= 0` are discarded silently, the rest are deduplicated and
    /// sorted ascending. An empty result is valid and means no pack can
    /// fulfil an order.
    pub fn normalize(raw: &[i64]) -> Self {
        let index: HashSet<u64> = raw
            .iter()
            .filter(|&&v| v > 0)
            .map(|&v| v.unsigned_abs())
            .collect();
        let mut sizes: Vec<u64> = index.iter().copied().collect();
        sizes.sort_unstable();
        Self { sizes, index }
    }

    /// Like [`normalize`](Self::normalize), but any non-positive value is an error.
    pub fn try_from_strict(raw: &[i64]) -> Result<Self, ValidationError> {
        if let Some(&bad) = raw.iter().find(|&&v| v <= 0) {
            return Err(ValidationError::NonPositivePackSize(bad));
        }
        Ok(Self::normalize(raw))
    }

    /// Build from sizes that are already unsigned. Zeroes are dropped.
    pub fn from_unsigned(raw: &[u64]) -> Self {
        let index: HashSet<u64> = raw.iter().copied().filter(|&v| v > 0).collect();
        let mut sizes: Vec<u64> = index.iter().copied().collect();
        sizes.sort_unstable();
        Self { sizes, index }
    }

    /// Sizes in ascending order.
    pub fn as_slice(&self) -> &[u64] {
        &self.sizes
    }

    /// Number of distinct sizes.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// `true` when no pack size survived normalization.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// O(1) membership test.
    pub fn contains(&self, size: u64) -> bool {
        self.index.contains(&size)
    }

    /// Largest pack size, if any.
    pub fn largest(&self) -> Option<u64> {
        self.sizes.last().copied()
    }

    /// Smallest pack size, if any.
    pub fn smallest(&self) -> Option<u64> {
        self.sizes.first().copied()
    }

    /// Ascending iterator over the sizes.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.sizes.iter().copied()
    }
}

impl From<PackSizeSet> for Vec<u64> {
    fn from(set: PackSizeSet) -> Self {
        set.sizes
    }
}

/// A non-negative number of items to ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OrderQuantity(u64);

impl OrderQuantity {
    /// Validate a signed caller-supplied quantity.
    pub fn new(quantity: i64) -> Result<Self, ValidationError> {
        if quantity < 0 {
            return Err(ValidationError::NegativeOrderQuantity(quantity));
        }
        Ok(Self(quantity.unsigned_abs()))
    }

    /// The quantity as an integer.
    pub fn get(self) -> u64 {
        self.0
    }

    /// `true` for an empty order.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for OrderQuantity {
    fn from(quantity: u64) -> Self {
        Self(quantity)
    }
}

impl std::fmt::Display for OrderQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sorts_and_dedupes() {
        let set = PackSizeSet::normalize(&[500, 250, 1000, 250, 500]);
        assert_eq!(set.as_slice(), &[250, 500, 1000]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn normalize_drops_non_positive_values() {
        let set = PackSizeSet::normalize(&[-10, 0, 5, -1, 3]);
        assert_eq!(set.as_slice(), &[3, 5]);
        assert!(!set.contains(0));
    }

    #[test]
    fn normalize_of_only_invalid_values_is_empty() {
        let set = PackSizeSet::normalize(&[0, -250, -1]);
        assert!(set.is_empty());
        assert_eq!(set.largest(), None);
        assert_eq!(set.smallest(), None);
    }

    #[test]
    fn normalize_of_empty_input_is_empty() {
        assert!(PackSizeSet::normalize(&[]).is_empty());
    }

    #[test]
    fn contains_matches_members_only() {
        let set = PackSizeSet::normalize(&[23, 31, 53]);
        assert!(set.contains(31));
        assert!(!set.contains(30));
        assert_eq!(set.largest(), Some(53));
        assert_eq!(set.smallest(), Some(23));
    }

    #[test]
    fn strict_constructor_rejects_first_non_positive() {
        let err = PackSizeSet::try_from_strict(&[250, 0, -3]).unwrap_err();
        assert_eq!(err, ValidationError::NonPositivePackSize(0));
        let ok = PackSizeSet::try_from_strict(&[500, 250, 250]).unwrap();
        assert_eq!(ok.as_slice(), &[250, 500]);
    }

    #[test]
    fn from_unsigned_drops_zero() {
        let set = PackSizeSet::from_unsigned(&[0, 7, 7, 3]);
        assert_eq!(set.as_slice(), &[3, 7]);
    }

    #[test]
    fn order_quantity_rejects_negative() {
        assert_eq!(
            OrderQuantity::new(-1),
            Err(ValidationError::NegativeOrderQuantity(-1))
        );
        let q = OrderQuantity::new(0).unwrap();
        assert!(q.is_zero());
        assert_eq!(OrderQuantity::new(251).unwrap().get(), 251);
        assert_eq!(OrderQuantity::from(12).to_string(), "12");
    }
}
