use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use simsweep_core::errors::{ErrorInfo, SweepError};
use simsweep_core::{ConfigurationRecord, Scalar};

use crate::axes::AxisSet;

/// Computation producing one derived field from a single axis field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DerivedRule {
    /// Smallest power of two not below `source * multiplier`.
    CeilPow2 {
        source: String,
        #[serde(default = "DerivedRule::default_multiplier")]
        multiplier: i64,
    },
    /// Copy of the source axis value under another name.
    Alias { source: String },
}

impl DerivedRule {
    const fn default_multiplier() -> i64 {
        1
    }

    pub fn source(&self) -> &str {
        match self {
            DerivedRule::CeilPow2 { source, .. } | DerivedRule::Alias { source } => source,
        }
    }
}

/// A named field whose value is computed rather than swept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedField {
    pub name: String,
    #[serde(flatten)]
    pub rule: DerivedRule,
}

impl DerivedField {
    pub fn new(name: impl Into<String>, rule: DerivedRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

/// Smallest power of two greater than or equal to `n`.
///
/// `ceil_pow2(0)` and `ceil_pow2(1)` are both 1. Negative inputs and inputs
/// above 2^62 are rejected.
pub fn ceil_pow2(n: i64) -> Result<i64, SweepError> {
    if n < 0 {
        return Err(SweepError::Configuration(
            ErrorInfo::new("derive.negative_input", "ceil_pow2 input is negative")
                .with_context("value", n.to_string()),
        ));
    }
    (n.max(1) as u64)
        .checked_next_power_of_two()
        .and_then(|pow| i64::try_from(pow).ok())
        .ok_or_else(|| {
            SweepError::Configuration(
                ErrorInfo::new("derive.overflow", "ceil_pow2 result does not fit in i64")
                    .with_context("value", n.to_string()),
            )
        })
}

/// Fills derived fields into configuration records.
///
/// Every rule reads only axis fields, so the order in which rules are
/// evaluated cannot change the result.
#[derive(Debug, Clone, Default)]
pub struct DerivedFieldResolver {
    fields: Vec<DerivedField>,
}

impl DerivedFieldResolver {
    /// Validates that each rule is sourced from an axis and that derived
    /// names are unique.
    pub fn new(axes: &AxisSet, fields: Vec<DerivedField>) -> Result<Self, SweepError> {
        let mut names = BTreeSet::new();
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(SweepError::Configuration(
                    ErrorInfo::new("derive.duplicate_name", "derived field declared twice")
                        .with_context("field", field.name.clone()),
                ));
            }
        }
        for field in &fields {
            let source = field.rule.source();
            if !axes.contains(source) {
                let code = if names.contains(source) {
                    "derive.chained_source"
                } else {
                    "derive.unknown_source"
                };
                return Err(SweepError::Configuration(
                    ErrorInfo::new(code, "derived field must be computed from an axis field")
                        .with_context("field", field.name.clone())
                        .with_context("source", source.to_string()),
                ));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[DerivedField] {
        &self.fields
    }

    /// Returns `record` with every derived field added or overwritten.
    pub fn resolve(&self, record: ConfigurationRecord) -> Result<ConfigurationRecord, SweepError> {
        let mut computed = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            computed.push((field.name.clone(), evaluate(field, &record)?));
        }
        let mut resolved = record;
        for (name, value) in computed {
            resolved.insert(name, value);
        }
        Ok(resolved)
    }
}

fn evaluate(field: &DerivedField, record: &ConfigurationRecord) -> Result<Scalar, SweepError> {
    let source = field.rule.source();
    let value = record.get(source).ok_or_else(|| {
        SweepError::Configuration(
            ErrorInfo::new("derive.missing_source", "record lacks the derived field's source")
                .with_context("field", field.name.clone())
                .with_context("source", source.to_string()),
        )
    })?;
    match &field.rule {
        DerivedRule::Alias { .. } => Ok(value.clone()),
        DerivedRule::CeilPow2 { multiplier, .. } => {
            let base = value.as_int().ok_or_else(|| {
                SweepError::Configuration(
                    ErrorInfo::new("derive.not_integer", "ceil_pow2 needs an integer source")
                        .with_context("field", field.name.clone())
                        .with_context("kind", value.kind()),
                )
            })?;
            let scaled = base.checked_mul(*multiplier).ok_or_else(|| {
                SweepError::Configuration(
                    ErrorInfo::new("derive.overflow", "source times multiplier overflows i64")
                        .with_context("field", field.name.clone()),
                )
            })?;
            ceil_pow2(scaled).map(Scalar::Int)
        }
    }
}
