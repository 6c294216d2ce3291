use simsweep_core::errors::{ErrorInfo, SweepError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("field", "rob")
        .with_context("sequence", "7")
}

#[test]
fn configuration_error_surface() {
    let err = SweepError::Configuration(sample_info("axes.duplicate_name", "duplicate axis"));
    assert_eq!(err.info().code, "axes.duplicate_name");
    assert_eq!(err.family(), "configuration");
    assert!(err.info().context.contains_key("field"));
}

#[test]
fn run_spec_error_surface() {
    let err = SweepError::RunSpec(sample_info("runspec.missing_field", "missing field"));
    assert_eq!(err.info().code, "runspec.missing_field");
    assert_eq!(err.family(), "run_spec");
}

#[test]
fn naming_error_surface() {
    let err = SweepError::Naming(sample_info("naming.index_out_of_range", "index too large"));
    assert_eq!(err.family(), "naming");
    assert_eq!(err.info().context.get("sequence").map(String::as_str), Some("7"));
}

#[test]
fn extraction_error_surface() {
    let err = SweepError::Extraction(sample_info("extract.unreadable", "cannot read"));
    assert_eq!(err.family(), "extraction");
}

#[test]
fn display_includes_context_and_hint() {
    let err = SweepError::Configuration(
        ErrorInfo::new("derive.negative_input", "ceil_pow2 input is negative")
            .with_context("value", "-3")
            .with_hint("check the source axis"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("configuration error: ceil_pow2 input is negative"));
    assert!(rendered.contains("value=-3"));
    assert!(rendered.contains("hint: check the source axis"));
}

#[test]
fn io_helper_records_path() {
    let err = SweepError::io(
        "store.write",
        "/tmp/out/w1_001.sh",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    assert_eq!(err.family(), "io");
    assert_eq!(
        err.info().context.get("path").map(String::as_str),
        Some("/tmp/out/w1_001.sh")
    );
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = SweepError::Naming(ErrorInfo::new("naming.index_out_of_range", "index 0"));
    let json = serde_json::to_value(&err).expect("json");
    assert_eq!(json["family"], "Naming");
    assert_eq!(json["detail"]["code"], "naming.index_out_of_range");
}
