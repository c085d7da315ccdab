//! # Error Hierarchy
//!
//! Structured validation errors for the pack allocation core, built with
//! `thiserror`. The solver itself has no error path: once inputs have passed
//! through [`PackSizeSet`](crate::PackSizeSet) and
//! [`OrderQuantity`](crate::OrderQuantity), every calculation is total.
//!
//! These errors describe caller contract violations detected at the
//! boundary, before the solver runs.

use thiserror::Error;

/// Validation errors raised while constructing core inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Order quantities must be zero or positive.
    #[error("order quantity cannot be negative, got {0}")]
    NegativeOrderQuantity(i64),

    /// A strict constructor received a zero or negative pack size.
    #[error("pack size must be positive, got {0}")]
    NonPositivePackSize(i64),

    /// A surface that requires at least one pack size received none.
    #[error("at least one pack size is required")]
    EmptyPackSizes,

    /// The order quantity exceeds the configured ceiling.
    #[error("order quantity {quantity} exceeds the limit of {limit}")]
    OrderQuantityTooLarge {
        /// The rejected quantity.
        quantity: u64,
        /// The configured maximum.
        limit: u64,
    },

    /// A pack size exceeds the configured ceiling.
    #[error("pack size {size} exceeds the limit of {limit}")]
    PackSizeTooLarge {
        /// The rejected pack size.
        size: u64,
        /// The configured maximum.
        limit: u64,
    },
}
