//! Resource ceilings applied at the service and CLI boundary.
//!
//! The solver's table is linear in `order + largest pack`, so surfaces that
//! accept untrusted input bound both before calling it.

use crate::error::ValidationError;
use crate::pack_sizes::{OrderQuantity, PackSizeSet};

/// Default ceiling on accepted order quantities.
pub const DEFAULT_MAX_ORDER_QUANTITY: u64 = 10_000_000;

/// Default ceiling on accepted pack sizes.
pub const DEFAULT_MAX_PACK_SIZE: u64 = 1_000_000;

/// Upper bounds on solver inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest accepted order quantity.
    pub max_order_quantity: u64,
    /// Largest accepted pack size.
    pub max_pack_size: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_order_quantity: DEFAULT_MAX_ORDER_QUANTITY,
            max_pack_size: DEFAULT_MAX_PACK_SIZE,
        }
    }
}

impl Limits {
    /// Reject inputs above either ceiling.
    pub fn check(&self, sizes: &PackSizeSet, order: OrderQuantity) -> Result<(), ValidationError> {
        if order.get() > self.max_order_quantity {
            return Err(ValidationError::OrderQuantityTooLarge {
                quantity: order.get(),
                limit: self.max_order_quantity,
            });
        }
        if let Some(size) = sizes.largest().filter(|&s| s > self.max_pack_size) {
            return Err(ValidationError::PackSizeTooLarge {
                size,
                limit: self.max_pack_size,
            });
        }
        Ok(())
    }
}
