mod common;

use simsweep_core::{ConfigurationRecord, Scalar};
use simsweep_exp::{
    ceil_pow2, expand, Axis, AxisSet, DerivedField, DerivedFieldResolver, DerivedRule,
};

fn rob_axes() -> AxisSet {
    AxisSet::new(vec![Axis::new("rob", [48, 64]), Axis::new("assoc", [2, 4])]).unwrap()
}

fn active_list(multiplier: i64) -> DerivedField {
    DerivedField::new(
        "active_list",
        DerivedRule::CeilPow2 {
            source: "rob".to_string(),
            multiplier,
        },
    )
}

#[test]
fn ceil_pow2_small_inputs() {
    assert_eq!(ceil_pow2(0).unwrap(), 1);
    assert_eq!(ceil_pow2(1).unwrap(), 1);
    assert_eq!(ceil_pow2(2).unwrap(), 2);
    assert_eq!(ceil_pow2(3).unwrap(), 4);
    assert_eq!(ceil_pow2(384).unwrap(), 512);
}

#[test]
fn ceil_pow2_rejects_negative_and_overflow() {
    let err = ceil_pow2(-1).unwrap_err();
    assert_eq!(err.family(), "configuration");
    assert_eq!(err.info().code, "derive.negative_input");

    assert_eq!(ceil_pow2(1 << 62).unwrap(), 1 << 62);
    let err = ceil_pow2((1 << 62) + 1).unwrap_err();
    assert_eq!(err.family(), "configuration");
    assert_eq!(err.info().code, "derive.overflow");
    assert_eq!(ceil_pow2(i64::MAX).unwrap_err().info().code, "derive.overflow");
}

#[test]
fn multiplied_source_overflow_is_reported() {
    let axes = AxisSet::new(vec![Axis::new("rob", [i64::MAX / 2])]).unwrap();
    let resolver = DerivedFieldResolver::new(&axes, vec![active_list(8)]).unwrap();
    let (_, record) = expand(&axes).next().unwrap();
    let err = resolver.resolve(record).unwrap_err();
    assert_eq!(err.info().code, "derive.overflow");
}

#[test]
fn ceil_pow2_rule_scales_source() {
    let axes = rob_axes();
    let resolver = DerivedFieldResolver::new(&axes, vec![active_list(8)]).unwrap();
    let values: Vec<i64> = expand(&axes)
        .map(|(_, record)| {
            let resolved = resolver.resolve(record).unwrap();
            resolved.get("active_list").and_then(Scalar::as_int).unwrap()
        })
        .collect();
    assert_eq!(values, vec![512, 512, 512, 512]);
}

#[test]
fn alias_copies_axis_value_verbatim() {
    let axes = AxisSet::new(vec![
        Axis::new("assoc", [2, 4]),
        Axis::new("policy", ["lru"]),
    ])
    .unwrap();
    let fields = vec![
        DerivedField::new("dca", DerivedRule::Alias { source: "assoc".to_string() }),
        DerivedField::new("repl", DerivedRule::Alias { source: "policy".to_string() }),
    ];
    let resolver = DerivedFieldResolver::new(&axes, fields).unwrap();
    let resolved: Vec<ConfigurationRecord> = expand(&axes)
        .map(|(_, record)| resolver.resolve(record).unwrap())
        .collect();
    assert_eq!(resolved[0].get("dca"), Some(&Scalar::Int(2)));
    assert_eq!(resolved[1].get("dca"), Some(&Scalar::Int(4)));
    assert_eq!(resolved[1].get("repl"), Some(&Scalar::Text("lru".into())));
    assert_eq!(resolved[1].get("assoc"), Some(&Scalar::Int(4)));
}

#[test]
fn derived_sources_must_be_axes() {
    let axes = rob_axes();
    let chained = vec![
        active_list(8),
        DerivedField::new(
            "active_list_copy",
            DerivedRule::Alias {
                source: "active_list".to_string(),
            },
        ),
    ];
    let err = DerivedFieldResolver::new(&axes, chained.clone()).unwrap_err();
    assert_eq!(err.family(), "configuration");
    assert_eq!(err.info().code, "derive.chained_source");

    let mut plan = common::plan_with(axes.clone(), chained, &["w1"]);
    assert_eq!(plan.validate().unwrap_err().info().code, "derive.chained_source");

    plan.derived = vec![DerivedField::new(
        "ghost",
        DerivedRule::Alias {
            source: "missing".to_string(),
        },
    )];
    assert_eq!(plan.validate().unwrap_err().info().code, "derive.unknown_source");
}

#[test]
fn declaration_order_of_rules_does_not_matter() {
    let axes = rob_axes();
    let forward = vec![
        active_list(4),
        DerivedField::new("l2a", DerivedRule::Alias { source: "assoc".to_string() }),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();
    let a = DerivedFieldResolver::new(&axes, forward).unwrap();
    let b = DerivedFieldResolver::new(&axes, reversed).unwrap();
    for (_, record) in expand(&axes) {
        assert_eq!(a.resolve(record.clone()).unwrap(), b.resolve(record).unwrap());
    }
}

#[test]
fn duplicate_derived_names_are_rejected() {
    let err = DerivedFieldResolver::new(&rob_axes(), vec![active_list(1), active_list(2)])
        .unwrap_err();
    assert_eq!(err.info().code, "derive.duplicate_name");
}
