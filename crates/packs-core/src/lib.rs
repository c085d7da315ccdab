#![deny(missing_docs)]

//! # packs-core — Optimal Pack Allocation
//!
//! Given a set of available pack sizes and an ordered item count, finds the
//! combination of packs that ships at least the order with the smallest
//! surplus, and among those the fewest packs.
//!
//! ## Pipeline
//!
//! 1. **Normalize.** [`PackSizeSet::normalize`] drops non-positive sizes,
//!    deduplicates and sorts ascending.
//! 2. **Solve.** [`PackSolver`] runs an unbounded-knapsack table over
//!    `0..=order + largest`, borrowing its scratch tables from a
//!    [`DpBufferPool`].
//! 3. **Report.** The answer is a [`CalculationResult`]: a read-only
//!    [`PackAllocation`] plus the surplus.
//!
//! ## Crate Policy
//!
//! - No I/O. The only shared mutable state is the buffer pool.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Every calculation is total once inputs are constructed; validation
//!   failures surface as [`ValidationError`] at construction time.

pub mod allocation;
pub mod calculator;
pub mod error;
pub mod limits;
pub mod pack_sizes;
pub mod pool;
pub mod solver;

pub use allocation::{CalculationResult, PackAllocation};
pub use calculator::{calculate_optimal_packs, PackCalculator, PackSolver};
pub use error::ValidationError;
pub use limits::Limits;
pub use pack_sizes::{OrderQuantity, PackSizeSet};
pub use pool::{DpBufferPool, DpBuffers, PoolConfig, PoolStats, UNREACHABLE};
pub use solver::solve;
