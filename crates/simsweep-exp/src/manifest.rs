use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use simsweep_core::errors::SweepError;
use simsweep_core::{SchemaVersion, SweepProvenance};

use crate::hash::stable_hash_string;

/// Record of one generation pass, written next to the scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepManifest {
    pub id: String,
    #[serde(default)]
    pub schema_version: SchemaVersion,
    pub provenance: SweepProvenance,
    pub plan_name: String,
    pub combinations: u64,
    pub runs: u64,
    #[serde(default)]
    pub failures: Vec<String>,
    #[serde(default)]
    pub artifacts: Vec<String>,
}

/// Inputs to [`build_manifest`] gathered while writing a sweep.
#[derive(Debug, Clone, Default)]
pub struct ManifestMeta {
    pub plan_name: String,
    pub plan_hash: String,
    pub host_name: String,
    pub created_at: String,
    pub combinations: u64,
    pub runs: u64,
    pub failures: Vec<String>,
    pub artifacts: Vec<String>,
}

/// Current UTC time in RFC 3339 form, as stored in manifests.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Builds a manifest whose id depends only on the plan, host and artifact
/// names, so regenerating the same sweep yields the same id.
pub fn build_manifest(meta: ManifestMeta) -> Result<SweepManifest, SweepError> {
    let id = stable_hash_string(&(&meta.plan_hash, &meta.host_name, &meta.artifacts))?;
    let mut tool_versions = BTreeMap::new();
    tool_versions.insert(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    Ok(SweepManifest {
        id,
        schema_version: SchemaVersion::CURRENT,
        provenance: SweepProvenance {
            plan_hash: meta.plan_hash,
            host_name: meta.host_name,
            created_at: meta.created_at,
            tool_versions,
        },
        plan_name: meta.plan_name,
        combinations: meta.combinations,
        runs: meta.runs,
        failures: meta.failures,
        artifacts: meta.artifacts,
    })
}
