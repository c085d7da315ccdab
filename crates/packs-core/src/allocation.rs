//! # Allocation Results
//!
//! [`PackAllocation`] is a size → count multiset built up during solver
//! reconstruction; [`CalculationResult`] pairs a finished allocation with
//! its surplus. Once an allocation is moved into a result it can only be
//! read, and [`PackAllocation::to_map`] hands out an owned snapshot so
//! callers never alias internal state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How many packs of each size to ship. Counts are always `>= 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackAllocation {
    packs: BTreeMap<u64, u64>,
}

impl PackAllocation {
    /// An empty allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` packs of `size`. A zero count is ignored so no zero
    /// entries are ever materialized.
    pub fn add_pack(&mut self, size: u64, count: u64) {
        if count == 0 {
            return;
        }
        *self.packs.entry(size).or_insert(0) += count;
    }

    /// Number of packs of `size`, zero if absent.
    pub fn count_of(&self, size: u64) -> u64 {
        self.packs.get(&size).copied().unwrap_or(0)
    }

    /// Total number of packs across all sizes.
    pub fn total_packs(&self) -> u64 {
        self.packs.values().sum()
    }

    /// Total number of items shipped.
    pub fn total_items(&self) -> u64 {
        self.packs.iter().map(|(size, count)| size * count).sum()
    }

    /// `true` when no pack is allocated.
    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Number of distinct sizes used.
    pub fn len(&self) -> usize {
        self.packs.len()
    }

    /// Owned snapshot of the size → count mapping.
    pub fn to_map(&self) -> BTreeMap<u64, u64> {
        self.packs.clone()
    }

    /// `(size, count)` pairs in ascending size order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.packs.iter().map(|(&size, &count)| (size, count))
    }
}

impl From<BTreeMap<u64, u64>> for PackAllocation {
    fn from(map: BTreeMap<u64, u64>) -> Self {
        let mut allocation = Self::new();
        for (size, count) in map {
            allocation.add_pack(size, count);
        }
        allocation
    }
}

/// A finished calculation: the allocation plus how many items it ships
/// beyond the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    allocation: PackAllocation,
    surplus: u64,
}

impl CalculationResult {
    /// Wrap an allocation and its surplus.
    pub fn new(allocation: PackAllocation, surplus: u64) -> Self {
        Self {
            allocation,
            surplus,
        }
    }

    /// Result for an order that ships nothing.
    pub fn empty(surplus: u64) -> Self {
        Self::new(PackAllocation::new(), surplus)
    }

    /// The chosen allocation.
    pub fn allocation(&self) -> &PackAllocation {
        &self.allocation
    }

    /// Items shipped beyond the order.
    pub fn surplus(&self) -> u64 {
        self.surplus
    }

    /// Zero surplus.
    pub fn is_exact_match(&self) -> bool {
        self.surplus == 0
    }

    /// Positive surplus.
    pub fn has_surplus(&self) -> bool {
        self.surplus > 0
    }

    /// Nothing could be shipped for a non-empty order. Only possible when
    /// there were no pack sizes.
    pub fn is_unfulfillable(&self) -> bool {
        self.surplus > 0 && self.allocation.is_empty()
    }

    /// Decompose into the allocation and surplus.
    pub fn into_parts(self) -> (PackAllocation, u64) {
        (self.allocation, self.surplus)
    }
}
