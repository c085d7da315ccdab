//! # Calculator Facade
//!
//! [`PackSolver`] ties normalized inputs, the buffer pool, and the solver
//! together. [`PackCalculator`] is the seam the service depends on, so the
//! HTTP layer holds an `Arc<dyn PackCalculator>` and tests can swap in a
//! solver with its own pool.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::allocation::CalculationResult;
use crate::pack_sizes::{OrderQuantity, PackSizeSet};
use crate::pool::DpBufferPool;
use crate::solver::solve_with_pool;

/// Computes optimal allocations.
pub trait PackCalculator: Send + Sync {
    /// Allocation with minimal surplus, then minimal pack count.
    fn calculate(&self, sizes: &PackSizeSet, order: OrderQuantity) -> CalculationResult;

    /// Lenient entry point over raw caller input: non-positive sizes are
    /// dropped, duplicates collapse, order is irrelevant.
    fn calculate_optimal_packs(&self, raw_sizes: &[i64], order_quantity: u64) -> CalculationResult {
        self.calculate(
            &PackSizeSet::normalize(raw_sizes),
            OrderQuantity::from(order_quantity),
        )
    }
}

/// The dynamic-programming calculator.
#[derive(Debug, Clone)]
pub struct PackSolver {
    pool: Arc<DpBufferPool>,
}

impl Default for PackSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PackSolver {
    /// Solver backed by the process-wide pool.
    pub fn new() -> Self {
        Self::with_pool(DpBufferPool::global())
    }

    /// Solver backed by a dedicated pool.
    pub fn with_pool(pool: Arc<DpBufferPool>) -> Self {
        Self { pool }
    }

    /// The pool this solver borrows tables from.
    pub fn pool(&self) -> &Arc<DpBufferPool> {
        &self.pool
    }
}

impl PackCalculator for PackSolver {
    fn calculate(&self, sizes: &PackSizeSet, order: OrderQuantity) -> CalculationResult {
        let result = solve_with_pool(&self.pool, sizes, order);
        tracing::debug!(
            order = order.get(),
            sizes = sizes.len(),
            total_items = result.allocation().total_items(),
            total_packs = result.allocation().total_packs(),
            surplus = result.surplus(),
            "pack allocation calculated"
        );
        result
    }
}

/// One-shot convenience over the process-wide pool. Returns the allocation
/// as a plain map plus the surplus.
pub fn calculate_optimal_packs(
    raw_sizes: &[i64],
    order_quantity: u64,
) -> (BTreeMap<u64, u64>, u64) {
    let (allocation, surplus) = PackSolver::new()
        .calculate_optimal_packs(raw_sizes, order_quantity)
        .into_parts();
    (allocation.to_map(), surplus)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> PackSolver {
        PackSolver::with_pool(Arc::new(DpBufferPool::default()))
    }

    #[test]
    fn lenient_entry_point_normalizes_input() {
        let result = solver().calculate_optimal_packs(&[500, -1, 250, 0, 500], 251);
        assert_eq!(result.allocation().count_of(500), 1);
        assert_eq!(result.surplus(), 249);
    }

    #[test]
    fn solver_returns_buffers_to_its_pool() {
        let solver = solver();
        solver.calculate_optimal_packs(&[250, 500], 750);
        solver.calculate_optimal_packs(&[250, 500], 750);
        let stats = solver.pool().stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.released, 2);
    }

    #[test]
    fn trivial_inputs_do_not_touch_the_pool() {
        let solver = solver();
        solver.calculate_optimal_packs(&[250], 0);
        solver.calculate_optimal_packs(&[], 10);
        assert_eq!(solver.pool().stats(), Default::default());
    }

    #[test]
    fn usable_as_trait_object() {
        let calc: Arc<dyn PackCalculator> = Arc::new(solver());
        let result = calc.calculate(&PackSizeSet::normalize(&[10, 20]), OrderQuantity::from(30));
        assert!(result.is_exact_match());
        assert_eq!(result.allocation().total_packs(), 2);
    }

    #[test]
    fn free_function_matches_solver() {
        let (map, surplus) = calculate_optimal_packs(&[250, 500, 1000], 500);
        assert_eq!(map, BTreeMap::from([(500, 1)]));
        assert_eq!(surplus, 0);
    }
}
