use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use simsweep_core::errors::{ErrorInfo, SweepError};
use simsweep_core::Scalar;

/// One sweepable dimension. Values are enumerated in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub values: Vec<Scalar>,
}

impl Axis {
    pub fn new<V: Into<Scalar>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered, name-unique collection of axes.
///
/// The last axis varies fastest during expansion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Axis>", into = "Vec<Axis>")]
pub struct AxisSet {
    axes: Vec<Axis>,
}

impl AxisSet {
    /// Builds an axis set, rejecting empty or repeated axis names.
    pub fn new(axes: Vec<Axis>) -> Result<Self, SweepError> {
        let mut seen = BTreeSet::new();
        for (position, axis) in axes.iter().enumerate() {
            if axis.name.trim().is_empty() {
                return Err(SweepError::Configuration(
                    ErrorInfo::new("axes.empty_name", "axis name must not be empty")
                        .with_context("position", position.to_string()),
                ));
            }
            if !seen.insert(axis.name.as_str()) {
                return Err(SweepError::Configuration(
                    ErrorInfo::new("axes.duplicate_name", "two axes share a field name")
                        .with_context("axis", axis.name.clone())
                        .with_hint("rename one axis or merge their value lists"),
                ));
            }
        }
        Ok(Self { axes })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Axis> {
        self.axes.iter()
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Axis names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.axes.iter().map(|axis| axis.name.as_str())
    }

    /// Number of combinations in the full cartesian product.
    pub fn combination_count(&self) -> Result<u64, SweepError> {
        self.axes.iter().try_fold(1u64, |total, axis| {
            total.checked_mul(axis.values.len() as u64).ok_or_else(|| {
                SweepError::Configuration(
                    ErrorInfo::new("axes.too_many_combinations", "combination count overflows u64")
                        .with_context("axis", axis.name.clone()),
                )
            })
        })
    }
}

impl TryFrom<Vec<Axis>> for AxisSet {
    type Error = SweepError;

    fn try_from(axes: Vec<Axis>) -> Result<Self, Self::Error> {
        AxisSet::new(axes)
    }
}

impl From<AxisSet> for Vec<Axis> {
    fn from(set: AxisSet) -> Self {
        set.axes
    }
}

impl<'a> IntoIterator for &'a AxisSet {
    type Item = &'a Axis;
    type IntoIter = std::slice::Iter<'a, Axis>;

    fn into_iter(self) -> Self::IntoIter {
        self.axes.iter()
    }
}
