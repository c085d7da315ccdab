//! # packs-cli — Pack Allocation Command-Line Interface
//!
//! ## Subcommands
//!
//! - `calculate` — allocate packs for an order from `--sizes` or a profile file
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Results go to stdout, logs to stderr.
//! - Handlers return an exit code: 0 success, 1 error, 2 when
//!   `--require-exact` is set and the allocation has surplus.

pub mod calculate;
pub mod profile;
