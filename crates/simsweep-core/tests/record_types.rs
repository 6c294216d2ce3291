use simsweep_core::{ConfigurationRecord, Scalar, SequenceIndex, Workload};

#[test]
fn scalars_parse_untagged_from_yaml() {
    let values: Vec<Scalar> = serde_yaml::from_str("[16, 0.5, true, t, bzip2_source]").expect("yaml");
    assert_eq!(
        values,
        vec![
            Scalar::Int(16),
            Scalar::Float(0.5),
            Scalar::Bool(true),
            Scalar::Text("t".into()),
            Scalar::Text("bzip2_source".into()),
        ]
    );
}

#[test]
fn scalar_display_is_verbatim() {
    assert_eq!(Scalar::Int(96).to_string(), "96");
    assert_eq!(Scalar::Float(0.25).to_string(), "0.25");
    assert_eq!(Scalar::Text("1.000000e+06".into()).to_string(), "1.000000e+06");
    assert_eq!(Scalar::Int(-4).as_int(), Some(-4));
    assert_eq!(Scalar::Float(4.0).as_int(), None);
}

#[test]
fn record_builder_and_lookup() {
    let record = ConfigurationRecord::new()
        .with_field("fetch", 2)
        .with_field("commit", 32);
    assert_eq!(record.len(), 2);
    assert_eq!(record.get("fetch"), Some(&Scalar::Int(2)));
    assert!(!record.contains("rob"));
    let names: Vec<_> = record.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["commit", "fetch"]);
}

#[test]
fn record_serializes_as_plain_map() {
    let record = ConfigurationRecord::new().with_field("iqs", 16);
    let json = serde_json::to_string(&record).expect("json");
    assert_eq!(json, r#"{"iqs":16}"#);
}

#[test]
fn sequence_index_counts_from_one() {
    let first = SequenceIndex::FIRST;
    assert_eq!(first.as_raw(), 1);
    assert_eq!(first.next().as_raw(), 2);
    assert!(first < first.next());
}

#[test]
fn workload_is_transparent() {
    let workload = Workload::new("applu");
    assert_eq!(workload.to_string(), "applu");
    assert_eq!(serde_json::to_string(&workload).expect("json"), "\"applu\"");
}
