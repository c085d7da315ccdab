//! # Unbounded-Knapsack Solver
//!
//! Finds the allocation that ships at least the ordered quantity with the
//! smallest surplus, breaking surplus ties by the smallest pack count.
//!
//! ## Phases
//!
//! 1. **Fill.** `dp[q]` is the minimum number of packs summing to exactly
//!    `q`, for every `q` in `0..=order + largest`. Sizes are processed in
//!    ascending order and `dp[q]` is overwritten only on strict improvement;
//!    `last[q]` records the size that produced the winning value.
//! 2. **Select.** Scan `order..=upper` for the reachable quantity with the
//!    smallest surplus, then the fewest packs. Stop at surplus 0 with one pack.
//! 3. **Reconstruct.** Walk `q -= last[q]` from the winner down to zero.
//!
//! The upper bound `order + largest` always contains a reachable quantity:
//! `ceil(order / largest) * largest` lies in `[order, order + largest)`.

use std::collections::BTreeMap;

use crate::allocation::{CalculationResult, PackAllocation};
use crate::pack_sizes::{OrderQuantity, PackSizeSet};
use crate::pool::{DpBufferPool, UNREACHABLE};

/// Solve using buffers borrowed from `pool`.
pub(crate) fn solve_with_pool(
    pool: &DpBufferPool,
    sizes: &PackSizeSet,
    order: OrderQuantity,
) -> CalculationResult {
    let order = order.get();
    if order == 0 {
        return CalculationResult::empty(0);
    }
    let Some(largest) = sizes.largest() else {
        return CalculationResult::empty(order);
    };

    let Some(upper) = order
        .checked_add(largest)
        .and_then(|u| usize::try_from(u).ok())
    else {
        tracing::warn!(order, largest, "DP upper bound does not fit in memory");
        return CalculationResult::empty(order);
    };
    // `order <= upper` as usize, so this cannot truncate.
    let order_idx = order as usize;

    let mut buffers = pool.acquire(upper);
    let result = {
        let (dp, last) = buffers.tables_mut();
        fill(dp, last, sizes.as_slice());
        match select_best_quantity(dp, order_idx, upper) {
            Some(best) => {
                let allocation = reconstruct(last, best);
                CalculationResult::new(allocation, (best - order_idx) as u64)
            }
            None => CalculationResult::empty(order),
        }
    };
    pool.release(buffers);
    result
}

/// Unbounded-knapsack fill over freshly initialized tables.
pub(crate) fn fill(dp: &mut [u64], last: &mut [u64], sizes: &[u64]) {
    let upper = dp.len().saturating_sub(1);
    for &size in sizes {
        let Ok(p) = usize::try_from(size) else {
            continue;
        };
        if p == 0 || p > upper {
            continue;
        }
        for q in p..=upper {
            let prev = dp[q - p];
            if prev != UNREACHABLE && prev + 1 < dp[q] {
                dp[q] = prev + 1;
                last[q] = size;
            }
        }
    }
}

/// Reachable quantity in `order..=upper` with minimal surplus, then minimal
/// pack count. `None` when nothing in range is reachable.
pub(crate) fn select_best_quantity(dp: &[u64], order: usize, upper: usize) -> Option<usize> {
    let upper = upper.min(dp.len().saturating_sub(1));
    let mut best: Option<(usize, usize, u64)> = None;
    for q in order..=upper {
        let packs = dp[q];
        if packs == UNREACHABLE {
            continue;
        }
        let surplus = q - order;
        let better = match best {
            None => true,
            Some((_, best_surplus, best_packs)) => {
                surplus < best_surplus || (surplus == best_surplus && packs < best_packs)
            }
        };
        if better {
            best = Some((q, surplus, packs));
            if surplus == 0 && packs == 1 {
                break;
            }
        }
    }
    best.map(|(q, _, _)| q)
}

/// Walk the `last` table back from `best` to zero.
pub(crate) fn reconstruct(last: &[u64], best: usize) -> PackAllocation {
    let mut allocation = PackAllocation::new();
    let mut q = best;
    while q > 0 {
        let size = last[q];
        let Ok(step) = usize::try_from(size) else {
            break;
        };
        if step == 0 || step > q {
            break;
        }
        allocation.add_pack(size, 1);
        q -= step;
    }
    allocation
}

/// Solve against a slice of already-positive sizes, returning the raw
/// `(size → count, surplus)` pair. Uses the process-wide buffer pool.
pub fn solve(pack_sizes: &[u64], order_quantity: u64) -> (BTreeMap<u64, u64>, u64) {
    let sizes = PackSizeSet::from_unsigned(pack_sizes);
    let result = solve_with_pool(
        &DpBufferPool::global(),
        &sizes,
        OrderQuantity::from(order_quantity),
    );
    let (allocation, surplus) = result.into_parts();
    (allocation.to_map(), surplus)
}
