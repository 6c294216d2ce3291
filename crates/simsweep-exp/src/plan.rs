use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use simsweep_core::errors::{ErrorInfo, SweepError};
use simsweep_core::Workload;

use crate::axes::AxisSet;
use crate::derive::{DerivedField, DerivedFieldResolver};
use crate::hash::stable_hash_string;
use crate::serde::from_yaml_slice;
use crate::template::{InvocationTemplate, RESERVED_SLOTS};

/// Script lines specific to one machine, such as batch queue directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HostProfile {
    #[serde(default)]
    pub preamble: Vec<String>,
}

/// Where generated artifacts go and what they are called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(default = "OutputSpec::default_scripts_dir")]
    pub scripts_dir: PathBuf,
    #[serde(default = "OutputSpec::default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "OutputSpec::default_log_name")]
    pub log_name: String,
    #[serde(default = "OutputSpec::default_driver_name")]
    pub driver_name: String,
    #[serde(default = "OutputSpec::default_manifest_name")]
    pub manifest_name: String,
}

impl OutputSpec {
    fn default_scripts_dir() -> PathBuf {
        PathBuf::from("scripts")
    }

    fn default_results_dir() -> PathBuf {
        PathBuf::from("results")
    }

    fn default_log_name() -> String {
        "configurations.tsv".to_string()
    }

    fn default_driver_name() -> String {
        "executeall.sh".to_string()
    }

    fn default_manifest_name() -> String {
        "sweep_manifest.json".to_string()
    }
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            scripts_dir: Self::default_scripts_dir(),
            results_dir: Self::default_results_dir(),
            log_name: Self::default_log_name(),
            driver_name: Self::default_driver_name(),
            manifest_name: Self::default_manifest_name(),
        }
    }
}

/// Complete description of one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub name: String,
    pub axes: AxisSet,
    #[serde(default)]
    pub derived: Vec<DerivedField>,
    #[serde(default)]
    pub workloads: Vec<Workload>,
    pub template: InvocationTemplate,
    #[serde(default)]
    pub hosts: BTreeMap<String, HostProfile>,
    /// Fields written to the configuration log; every axis when empty.
    #[serde(default)]
    pub log_columns: Vec<String>,
    #[serde(default)]
    pub output: OutputSpec,
    /// Directory containing the plan on disk (ignored when serializing).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl SweepPlan {
    /// Deterministic hash of the plan contents.
    pub fn plan_hash(&self) -> Result<String, SweepError> {
        stable_hash_string(self)
    }

    pub fn resolver(&self) -> Result<DerivedFieldResolver, SweepError> {
        DerivedFieldResolver::new(&self.axes, self.derived.clone())
    }

    pub fn log_columns(&self) -> Vec<String> {
        if self.log_columns.is_empty() {
            self.axes.names().map(str::to_string).collect()
        } else {
            self.log_columns.clone()
        }
    }

    pub fn preamble_for(&self, host_name: &str) -> Option<&[String]> {
        self.hosts
            .get(host_name)
            .map(|profile| profile.preamble.as_slice())
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.resolve(&self.output.scripts_dir)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.resolve(&self.output.results_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Checks cross-field consistency that serde alone cannot express.
    pub fn validate(&self) -> Result<(), SweepError> {
        let resolver = self.resolver()?;
        let derived_names: BTreeSet<&str> =
            resolver.fields().iter().map(|field| field.name.as_str()).collect();

        for name in self.axes.names().chain(derived_names.iter().copied()) {
            if RESERVED_SLOTS.contains(&name) {
                return Err(plan_error(
                    "plan.reserved_field",
                    "field name collides with a reserved template slot",
                    "field",
                    name,
                ));
            }
        }

        let mut seen = BTreeSet::new();
        for workload in &self.workloads {
            let id = workload.as_str();
            if id.trim().is_empty() || id.contains('/') || id.chars().any(char::is_whitespace) {
                return Err(plan_error(
                    "plan.bad_workload",
                    "workload identifiers must be non-empty file-name safe words",
                    "workload",
                    id,
                ));
            }
            if !seen.insert(id) {
                return Err(plan_error(
                    "plan.duplicate_workload",
                    "workload listed twice",
                    "workload",
                    id,
                ));
            }
        }

        for column in &self.log_columns {
            if !self.axes.contains(column) && !derived_names.contains(column.as_str()) {
                return Err(plan_error(
                    "plan.unknown_log_column",
                    "log column names neither an axis nor a derived field",
                    "column",
                    column,
                ));
            }
        }
        Ok(())
    }
}

fn plan_error(code: &str, message: &str, key: &str, value: &str) -> SweepError {
    SweepError::Configuration(ErrorInfo::new(code, message).with_context(key, value))
}

/// Loads and validates a YAML sweep plan. Relative output directories are
/// resolved against the plan's own directory.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<SweepPlan, SweepError> {
    let plan_path = path.as_ref();
    let bytes =
        fs::read(plan_path).map_err(|err| SweepError::io("plan.read", plan_path.display(), err))?;
    let mut plan: SweepPlan = from_yaml_slice(&bytes)?;
    plan.base_dir = plan_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    plan.validate()?;
    Ok(plan)
}
