//! # Pack Profiles
//!
//! A profile is a named pack size list stored on disk, so common size sets
//! do not have to be retyped on every invocation.
//!
//! ```yaml
//! name: Standard
//! pack_sizes: [250, 500, 1000, 2000, 5000]
//! ```
//!
//! Files ending in `.json` are parsed as JSON, everything else as YAML.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A named pack size list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackProfile {
    pub name: String,
    pub pack_sizes: Vec<i64>,
}

/// Read and parse a profile file.
pub fn load_profile(path: &Path) -> Result<PackProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let profile: PackProfile = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON profile: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML profile: {}", path.display()))?
    };

    tracing::debug!(name = %profile.name, sizes = profile.pack_sizes.len(), "loaded pack profile");
    Ok(profile)
}
