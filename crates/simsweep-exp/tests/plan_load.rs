mod common;

use std::fs;

use simsweep_core::Scalar;
use simsweep_exp::{
    from_yaml_slice, load_plan, write_sweep, MemoryStore, OverridePreset, SweepGenerator,
    SweepPlan,
};

#[test]
fn bundled_plan_loads_and_generates() {
    let path = common::workspace_root().join("plans/smtsim_one_core.yaml");
    let plan = load_plan(&path).unwrap();
    assert_eq!(plan.template.preset, Some(OverridePreset::SmtsimSingleCore));
    assert_eq!(plan.base_dir, common::workspace_root().join("plans"));
    assert!(plan.scripts_dir().starts_with(&plan.base_dir));

    let generator = SweepGenerator::new(&plan, "localhost").unwrap();
    let summary = write_sweep(&generator, &mut MemoryStore::new()).unwrap();
    assert!(summary.failures.is_empty(), "{:?}", summary.failures);
    assert_eq!(
        summary.scripts as u64,
        summary.combinations * plan.workloads.len() as u64
    );

    let first = generator.runs().next().unwrap().unwrap();
    let rob = first.configuration.get("rob").and_then(Scalar::as_int).unwrap();
    let active = first
        .configuration
        .get("active_list")
        .and_then(Scalar::as_int)
        .unwrap();
    assert!(active >= rob * 8 && active.count_ones() == 1);
    assert!(!first.script_text.contains("${"));
    assert!(first
        .script_text
        .contains(r#""Global/thread_length = 1.000000e+06;""#));
    assert!(first
        .script_text
        .contains(r#""Workloads/applu/ff_dist = 1.000000e+06;""#));
}

#[test]
fn plan_hash_ignores_location() {
    let path = common::workspace_root().join("plans/smtsim_one_core.yaml");
    let loaded = load_plan(&path).unwrap();
    let mut moved = loaded.clone();
    moved.base_dir = "/elsewhere".into();
    assert_eq!(loaded.plan_hash().unwrap(), moved.plan_hash().unwrap());
}

#[test]
fn defaults_fill_optional_sections() {
    let yaml = r#"
name: tiny
axes:
  - name: fetch
    values: [1, 2]
workloads: [w1]
template:
  simulator: smtsim
  conf_file: one_core.conf
  working_dir: "/bench/${workload}"
  overrides:
    - key: Core/Fetch/total_limit
      value: "${fetch}"
"#;
    let plan: SweepPlan = from_yaml_slice(yaml.as_bytes()).unwrap();
    plan.validate().unwrap();
    assert_eq!(plan.template.conf_flag, "-conffile");
    assert_eq!(plan.template.override_flag, "-confexpr");
    assert_eq!(plan.template.trailing_args, vec!["-confdump", "-"]);
    assert_eq!(plan.output.log_name, "configurations.tsv");
    assert_eq!(plan.output.driver_name, "executeall.sh");
    assert_eq!(plan.log_columns(), vec!["fetch"]);
}

fn tiny_plan() -> SweepPlan {
    common::fetch_commit_plan()
}

#[test]
fn validation_rejects_inconsistent_plans() {
    let mut plan = tiny_plan();
    plan.workloads.push("w1".into());
    assert_eq!(
        plan.validate().unwrap_err().info().code,
        "plan.duplicate_workload"
    );

    let mut plan = tiny_plan();
    plan.workloads.push("bad name".into());
    assert_eq!(plan.validate().unwrap_err().info().code, "plan.bad_workload");

    let mut plan = tiny_plan();
    plan.log_columns = vec!["fetch".to_string(), "rob".to_string()];
    assert_eq!(
        plan.validate().unwrap_err().info().code,
        "plan.unknown_log_column"
    );

    let mut plan = tiny_plan();
    plan.axes = simsweep_exp::AxisSet::new(vec![simsweep_exp::Axis::new("workload", ["x"])])
        .unwrap();
    assert_eq!(plan.validate().unwrap_err().info().code, "plan.reserved_field");
}

#[test]
fn load_reports_missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_plan(dir.path().join("absent.yaml")).unwrap_err();
    assert_eq!(err.family(), "io");
    assert_eq!(err.info().code, "plan.read");

    let path = dir.path().join("broken.yaml");
    fs::write(&path, "name: [unterminated").unwrap();
    let err = load_plan(&path).unwrap_err();
    assert_eq!(err.family(), "serde");
}
