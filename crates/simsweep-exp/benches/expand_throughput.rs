use criterion::{black_box, criterion_group, criterion_main, Criterion};
use simsweep_exp::{
    expand, write_sweep, Axis, AxisSet, DerivedField, DerivedRule, InvocationTemplate,
    MemoryStore, OutputSpec, SweepGenerator, SweepPlan,
};

fn make_axes() -> AxisSet {
    AxisSet::new(vec![
        Axis::new("fb", [1, 2, 4, 8]),
        Axis::new("mci", [1, 2, 4, 8]),
        Axis::new("iqs", [16, 32, 48, 64]),
        Axis::new("rob", [64, 128, 256]),
        Axis::new("ipr", [32, 64, 96]),
    ])
    .expect("axes")
}

fn make_plan() -> SweepPlan {
    SweepPlan {
        name: "bench".to_string(),
        axes: make_axes(),
        derived: vec![DerivedField::new(
            "active_list",
            DerivedRule::CeilPow2 {
                source: "rob".to_string(),
                multiplier: 8,
            },
        )],
        workloads: vec!["applu".into(), "crafty".into()],
        template: InvocationTemplate::smtsim_single_core("smtsim", "one_core.conf", "/bench"),
        hosts: Default::default(),
        log_columns: Vec::new(),
        output: OutputSpec::default(),
        base_dir: Default::default(),
    }
}

fn bench_expand(c: &mut Criterion) {
    let axes = make_axes();
    c.bench_function("expand_throughput", |b| {
        b.iter(|| black_box(expand(&axes).count()));
    });
}

fn bench_generate(c: &mut Criterion) {
    let mut plan = make_plan();
    for (name, value) in [
        ("ff_dist", 0),
        ("thread_length", 1_000_000),
        ("ics", 64),
        ("ica", 2),
        ("dcs", 64),
        ("dca", 2),
        ("lsq", 32),
        ("fqs", 32),
        ("mii", 4),
        ("mfi", 2),
        ("mli", 2),
        ("fpr", 64),
        ("dec", 4),
    ] {
        let mut axes: Vec<Axis> = plan.axes.iter().cloned().collect();
        axes.push(Axis::new(name, [value]));
        plan.axes = AxisSet::new(axes).expect("axes");
    }
    let generator = SweepGenerator::new(&plan, "localhost").expect("generator");
    c.bench_function("generate_memory_store", |b| {
        b.iter(|| {
            let summary = write_sweep(&generator, &mut MemoryStore::new()).expect("sweep");
            black_box(summary.scripts)
        });
    });
}

criterion_group!(benches, bench_expand, bench_generate);
criterion_main!(benches);
