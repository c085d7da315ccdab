//! # API Route Modules
//!
//! - `calculator` — optimal pack allocation for an order.
//! - `pack_configurations` — CRUD over named pack size sets, including the
//!   default used when a calculation carries no sizes.
//! - `metrics` — JSON snapshot of request counters and buffer pool stats.

pub mod calculator;
pub mod metrics;
pub mod pack_configurations;
