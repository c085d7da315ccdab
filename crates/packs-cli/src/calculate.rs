//! # Calculate Subcommand
//!
//! Computes the optimal pack allocation for a single order.
//!
//! Pack sizes come from `--sizes` (comma separated) or from a profile file
//! via `--profile`. Sizes are normalized the same way the service does it:
//! zero and negative values are dropped with a warning, duplicates collapse.
//!
//! ## Exit Codes
//!
//! - 0: allocation printed
//! - 1: invalid input or unreadable profile
//! - 2: `--require-exact` was given and the allocation ships a surplus

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use packs_core::{
    CalculationResult, Limits, OrderQuantity, PackCalculator, PackSizeSet, PackSolver,
    ValidationError,
};
use serde::Serialize;

use crate::profile::load_profile;

/// Output rendering for a calculation.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One `size x count` line per pack size, then totals.
    #[default]
    Text,
    /// A single JSON object.
    Json,
}

/// Arguments for the `packs calculate` subcommand.
#[derive(Args, Debug)]
pub struct CalculateArgs {
    /// Number of items ordered.
    #[arg(long, allow_negative_numbers = true)]
    pub items: i64,

    /// Comma-separated pack sizes, e.g. `250,500,1000`.
    #[arg(
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        conflicts_with = "profile",
        required_unless_present = "profile"
    )]
    pub sizes: Vec<i64>,

    /// YAML or JSON file with `name` and `pack_sizes`.
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Exit with status 2 when the allocation ships more than ordered.
    #[arg(long)]
    pub require_exact: bool,
}

/// JSON shape of a finished calculation.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CalculationSummary {
    pub order_quantity: u64,
    pub pack_sizes: Vec<u64>,
    pub allocation: BTreeMap<u64, u64>,
    pub total_packs: u64,
    pub total_items: u64,
    pub surplus: u64,
    pub is_exact_match: bool,
}

impl CalculationSummary {
    fn new(order: OrderQuantity, sizes: &PackSizeSet, result: &CalculationResult) -> Self {
        let allocation = result.allocation();
        Self {
            order_quantity: order.get(),
            pack_sizes: sizes.as_slice().to_vec(),
            allocation: allocation.to_map(),
            total_packs: allocation.total_packs(),
            total_items: allocation.total_items(),
            surplus: result.surplus(),
            is_exact_match: result.is_exact_match(),
        }
    }
}

/// Execute the calculate subcommand.
pub fn run_calculate(args: &CalculateArgs) -> Result<u8> {
    let raw_sizes = match &args.profile {
        Some(path) => {
            let profile = load_profile(path)?;
            tracing::info!(profile = %profile.name, "using pack profile");
            profile.pack_sizes
        }
        None => args.sizes.clone(),
    };

    let sizes = normalize_sizes(&raw_sizes)?;
    let order = OrderQuantity::new(args.items).context("invalid --items")?;
    Limits::default()
        .check(&sizes, order)
        .context("input exceeds calculation limits")?;

    let result = PackSolver::new().calculate(&sizes, order);
    let summary = CalculationSummary::new(order, &sizes, &result);

    let output = match args.format {
        OutputFormat::Text => render_text(&summary),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&summary).context("failed to serialize result")?
        }
    };
    print!("{output}");
    if args.format == OutputFormat::Json {
        println!();
    }

    if args.require_exact && !summary.is_exact_match {
        tracing::warn!(surplus = summary.surplus, "allocation is not an exact match");
        return Ok(2);
    }
    Ok(0)
}

/// Normalize raw sizes, warning about every value that gets dropped.
fn normalize_sizes(raw: &[i64]) -> Result<PackSizeSet> {
    for &size in raw.iter().filter(|&&s| s <= 0) {
        tracing::warn!(size, "ignoring non-positive pack size");
    }
    let sizes = PackSizeSet::normalize(raw);
    if sizes.is_empty() {
        bail!(ValidationError::EmptyPackSizes);
    }
    Ok(sizes)
}

/// Text rendering: largest pack first.
fn render_text(summary: &CalculationSummary) -> String {
    let mut out = String::new();
    for (size, count) in summary.allocation.iter().rev() {
        let _ = writeln!(out, "{size} x {count}");
    }
    let _ = writeln!(out, "total packs: {}", summary.total_packs);
    let _ = writeln!(out, "total items: {}", summary.total_items);
    let _ = writeln!(out, "surplus: {}", summary.surplus);
    out
}
