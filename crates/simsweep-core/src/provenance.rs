//! Provenance and schema descriptors attached to generated sweep artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized sweep manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Incremented when a manifest field changes meaning or disappears.
    pub major: u32,
    /// Incremented when fields are added.
    pub minor: u32,
    /// Incremented for fixes that leave the layout untouched.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Schema written by this release of the generator.
    pub const CURRENT: SchemaVersion = SchemaVersion::new(1, 0, 0);
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// Where and from what a batch of run scripts was generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SweepProvenance {
    /// Stable hash of the sweep plan the scripts were rendered from.
    pub plan_hash: String,
    /// Host name the scripts were rendered for; selects the script preamble.
    pub host_name: String,
    /// RFC 3339 timestamp recording when generation ran.
    pub created_at: String,
    /// Version map for the tools involved in generation.
    pub tool_versions: BTreeMap<String, String>,
}
