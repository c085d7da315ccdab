//! # DP Scratch Buffer Pool
//!
//! Reusable `dp`/`last` table pairs for the solver, so steady-state traffic
//! does not allocate a fresh table per calculation.
//!
//! ## Layout
//!
//! Free buffers are kept in power-of-two capacity tiers: tier `k` holds pairs
//! whose capacity lies in `[baseline << k, baseline << (k + 1))`. Each tier is
//! its own `parking_lot::Mutex`, so concurrent calculations only contend
//! when they need the same tier, and the lock is held just long enough to
//! push or pop one pair.
//!
//! ## Invariants
//!
//! - [`DpBufferPool::acquire`] always hands out freshly initialized tables
//!   (`dp[0] = 0`, every other `dp` entry [`UNREACHABLE`], `last` zeroed).
//!   No state from a previous calculation is ever visible.
//! - Pairs with capacity above `baseline * retain_multiplier` are dropped on
//!   release, which bounds retained memory.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::Serialize;

/// Sentinel for quantities no pack combination reaches.
///
/// Far below `u64::MAX` so `dp[q - p] + 1` can never overflow.
pub const UNREACHABLE: u64 = u64::MAX / 2;

/// Tuning knobs for [`DpBufferPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Capacity of the smallest tier, sized for common order magnitudes.
    pub baseline_capacity: usize,
    /// Pairs larger than `baseline_capacity * retain_multiplier` are not retained.
    pub retain_multiplier: usize,
    /// Maximum idle pairs kept per tier.
    pub max_pairs_per_tier: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            baseline_capacity: 1024,
            retain_multiplier: 10,
            max_pairs_per_tier: 32,
        }
    }
}

impl PoolConfig {
    /// Largest capacity the pool will keep.
    pub fn retain_ceiling(&self) -> usize {
        self.baseline().saturating_mul(self.retain_multiplier.max(1))
    }

    fn baseline(&self) -> usize {
        self.baseline_capacity.max(1)
    }
}

/// A `dp`/`last` table pair, both of the same length.
#[derive(Debug)]
pub struct DpBuffers {
    dp: Vec<u64>,
    last: Vec<u64>,
}

impl DpBuffers {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            dp: Vec::with_capacity(capacity),
            last: Vec::with_capacity(capacity),
        }
    }

    /// Resize to `len` entries and apply the DP base state.
    fn reset(&mut self, len: usize) {
        self.dp.clear();
        self.dp.resize(len, UNREACHABLE);
        if let Some(first) = self.dp.first_mut() {
            *first = 0;
        }
        self.last.clear();
        self.last.resize(len, 0);
    }

    /// Minimum pack count per quantity.
    pub fn dp(&self) -> &[u64] {
        &self.dp
    }

    /// Pack size chosen last on an optimal path to each quantity.
    pub fn last(&self) -> &[u64] {
        &self.last
    }

    /// Both tables, mutably.
    pub fn tables_mut(&mut self) -> (&mut [u64], &mut [u64]) {
        (&mut self.dp, &mut self.last)
    }

    /// Number of entries (`upper_bound + 1`).
    pub fn len(&self) -> usize {
        self.dp.len()
    }

    /// Never true for buffers handed out by the pool.
    pub fn is_empty(&self) -> bool {
        self.dp.is_empty()
    }

    /// Usable capacity of the pair.
    pub fn capacity(&self) -> usize {
        self.dp.capacity().min(self.last.capacity())
    }
}

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Acquisitions served from an idle pair.
    pub hits: u64,
    /// Acquisitions that allocated.
    pub misses: u64,
    /// Pairs returned and retained.
    pub released: u64,
    /// Pairs returned and dropped (oversized or tier full).
    pub discarded: u64,
}

/// Thread-safe free list of DP table pairs, keyed by capacity tier.
#[derive(Debug)]
pub struct DpBufferPool {
    config: PoolConfig,
    tiers: Vec<Mutex<Vec<DpBuffers>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    released: AtomicU64,
    discarded: AtomicU64,
}

impl Default for DpBufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl DpBufferPool {
    /// Create an empty pool.
    pub fn new(config: PoolConfig) -> Self {
        let tier_count = floor_tier(config.retain_ceiling(), config.baseline()) + 1;
        Self {
            config,
            tiers: (0..tier_count).map(|_| Mutex::new(Vec::new())).collect(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            released: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// The process-wide pool shared by [`PackSolver::new`](crate::PackSolver::new).
    pub fn global() -> Arc<DpBufferPool> {
        static GLOBAL: OnceLock<Arc<DpBufferPool>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(DpBufferPool::default())))
    }

    /// The pool's configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Borrow a table pair with exactly `upper_bound + 1` initialized entries.
    pub fn acquire(&self, upper_bound: usize) -> DpBuffers {
        let len = upper_bound.saturating_add(1);
        let mut buffers = match self.take_idle(len) {
            Some(buffers) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                buffers
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                DpBuffers::with_capacity(self.fresh_capacity(len))
            }
        };
        buffers.reset(len);
        buffers
    }

    /// Return a pair. Oversized pairs and pairs for a full tier are dropped.
    pub fn release(&self, buffers: DpBuffers) {
        let capacity = buffers.capacity();
        if capacity > self.config.retain_ceiling() {
            tracing::trace!(capacity, "discarding oversized DP buffers");
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let tier = floor_tier(capacity, self.config.baseline());
        let Some(slot) = self.tiers.get(tier) else {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        };
        let mut idle = slot.lock();
        if idle.len() >= self.config.max_pairs_per_tier {
            drop(idle);
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        idle.push(buffers);
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    /// Total idle pairs across all tiers.
    pub fn idle_pairs(&self) -> usize {
        self.tiers.iter().map(|tier| tier.lock().len()).sum()
    }

    fn take_idle(&self, len: usize) -> Option<DpBuffers> {
        let start = floor_tier(len, self.config.baseline());
        for slot in self.tiers.iter().skip(start) {
            let mut idle = slot.lock();
            if let Some(pos) = idle.iter().position(|b| b.capacity() >= len) {
                return Some(idle.swap_remove(pos));
            }
        }
        None
    }

    /// Round up to a tier boundary while that stays retainable.
    fn fresh_capacity(&self, len: usize) -> usize {
        let baseline = self.config.baseline();
        let mut rounded = baseline;
        while rounded < len {
            match rounded.checked_mul(2) {
                Some(next) => rounded = next,
                None => return len,
            }
        }
        if rounded <= self.config.retain_ceiling() {
            rounded
        } else {
            len
        }
    }
}

/// Tier whose lower bound is the largest `baseline << k` not above `capacity`.
fn floor_tier(capacity: usize, baseline: usize) -> usize {
    if capacity < baseline {
        0
    } else {
        (capacity / baseline).ilog2() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_initialized(buffers: &DpBuffers, len: usize) {
        assert_eq!(buffers.len(), len);
        assert_eq!(buffers.last().len(), len);
        assert_eq!(buffers.dp()[0], 0);
        assert!(buffers.dp()[1..].iter().all(|&v| v == UNREACHABLE));
        assert!(buffers.last().iter().all(|&v| v == 0));
    }

    #[test]
    fn acquire_returns_initialized_tables_of_requested_length() {
        let pool = DpBufferPool::default();
        for upper in [0usize, 100, 1000, 10_000] {
            let buffers = pool.acquire(upper);
            assert_initialized(&buffers, upper + 1);
            pool.release(buffers);
        }
    }

    #[test]
    fn released_buffers_are_reset_before_reuse() {
        let pool = DpBufferPool::default();
        let mut buffers = pool.acquire(100);
        {
            let (dp, last) = buffers.tables_mut();
            dp[1] = 5;
            dp[2] = 10;
            last[1] = 25;
            last[2] = 50;
        }
        pool.release(buffers);

        let reused = pool.acquire(100);
        assert_initialized(&reused, 101);
        assert_eq!(pool.stats().hits, 1);
    }

    #[test]
    fn small_request_reuses_pooled_capacity() {
        let pool = DpBufferPool::default();
        let buffers = pool.acquire(10);
        assert!(buffers.capacity() >= 1024);
        pool.release(buffers);
        assert_eq!(pool.idle_pairs(), 1);

        let again = pool.acquire(500);
        assert_eq!(pool.stats().hits, 1);
        assert_eq!(pool.stats().misses, 1);
        pool.release(again);
    }

    #[test]
    fn larger_request_than_pooled_capacity_allocates() {
        let pool = DpBufferPool::default();
        pool.release(pool.acquire(10));
        let big = pool.acquire(5000);
        assert!(big.capacity() >= 5001);
        let stats = pool.stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
        pool.release(big);
        assert_eq!(pool.idle_pairs(), 2);
    }

    #[test]
    fn oversized_buffers_are_discarded() {
        let pool = DpBufferPool::default();
        let ceiling = pool.config().retain_ceiling();
        let huge = pool.acquire(ceiling * 2);
        pool.release(huge);
        assert_eq!(pool.idle_pairs(), 0);
        assert_eq!(pool.stats().discarded, 1);
    }

    #[test]
    fn buffers_between_last_tier_and_ceiling_are_retained() {
        let pool = DpBufferPool::default();
        let buffers = pool.acquire(9000);
        assert!(buffers.capacity() <= pool.config().retain_ceiling());
        pool.release(buffers);
        assert_eq!(pool.idle_pairs(), 1);
        let again = pool.acquire(9000);
        assert_eq!(pool.stats().hits, 1);
        pool.release(again);
    }

    #[test]
    fn full_tier_discards_extra_pairs() {
        let pool = DpBufferPool::new(PoolConfig {
            max_pairs_per_tier: 1,
            ..PoolConfig::default()
        });
        let a = pool.acquire(10);
        let b = pool.acquire(10);
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.idle_pairs(), 1);
        assert_eq!(pool.stats().discarded, 1);
    }

    #[test]
    fn floor_tier_boundaries() {
        assert_eq!(floor_tier(0, 1024), 0);
        assert_eq!(floor_tier(1023, 1024), 0);
        assert_eq!(floor_tier(1024, 1024), 0);
        assert_eq!(floor_tier(2047, 1024), 0);
        assert_eq!(floor_tier(2048, 1024), 1);
        assert_eq!(floor_tier(10_240, 1024), 3);
    }

    #[test]
    fn concurrent_acquire_release_never_shares_state() {
        let pool = Arc::new(DpBufferPool::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for i in 0..200usize {
                        let upper = 50 + (i * 7 + t) % 900;
                        let mut buffers = pool.acquire(upper);
                        assert_initialized(&buffers, upper + 1);
                        let (dp, last) = buffers.tables_mut();
                        dp.iter_mut().for_each(|v| *v = t as u64);
                        last.iter_mut().for_each(|v| *v = t as u64);
                        pool.release(buffers);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let stats = pool.stats();
        assert_eq!(stats.hits + stats.misses, 1600);
    }

    #[test]
    fn global_pool_is_shared() {
        let a = DpBufferPool::global();
        let b = DpBufferPool::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
