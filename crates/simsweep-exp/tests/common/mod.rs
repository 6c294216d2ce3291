#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use simsweep_core::Workload;
use simsweep_exp::{
    Axis, AxisSet, ConfOverride, DerivedField, InvocationTemplate, OutputSpec, SweepPlan,
};

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .canonicalize()
        .unwrap()
}

/// Minimal template exercising record, reserved and key slots.
pub fn fetch_commit_template() -> InvocationTemplate {
    InvocationTemplate {
        simulator: "/opt/smtsim/smtsim".to_string(),
        conf_flag: "-conffile".to_string(),
        conf_file: "/opt/smtsim/one_core.conf".to_string(),
        working_dir: "/bench/${workload}".to_string(),
        override_flag: "-confexpr".to_string(),
        preset: None,
        overrides: vec![
            ConfOverride::new("Workloads/${workload}/ff_dist", "0"),
            ConfOverride::new("Core/Fetch/total_limit", "${fetch}"),
            ConfOverride::new("Core/Commit/total_limit", "${commit}"),
            ConfOverride::new("AppStatsLog/base_name", r#""${output_path}""#),
        ],
        trailing_args: vec!["-confdump".to_string(), "-".to_string()],
    }
}

pub fn fetch_commit_axes() -> AxisSet {
    AxisSet::new(vec![
        Axis::new("fetch", [1, 2, 4]),
        Axis::new("commit", [16, 32]),
    ])
    .unwrap()
}

pub fn plan_with(axes: AxisSet, derived: Vec<DerivedField>, workloads: &[&str]) -> SweepPlan {
    SweepPlan {
        name: "fetch_commit".to_string(),
        axes,
        derived,
        workloads: workloads.iter().copied().map(Workload::from).collect(),
        template: fetch_commit_template(),
        hosts: BTreeMap::new(),
        log_columns: Vec::new(),
        output: OutputSpec {
            results_dir: PathBuf::from("/results"),
            ..OutputSpec::default()
        },
        base_dir: PathBuf::from("/sweeps"),
    }
}

pub fn fetch_commit_plan() -> SweepPlan {
    plan_with(fetch_commit_axes(), Vec::new(), &["w1"])
}
