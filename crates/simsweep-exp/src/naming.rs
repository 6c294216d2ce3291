use simsweep_core::errors::{ErrorInfo, SweepError};
use simsweep_core::{SequenceIndex, Workload};

/// Produces `<workload>_<zero padded index>` run names.
///
/// The pad width covers the largest index of the sweep, so names for one
/// workload sort lexicographically in sequence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunNamer {
    width: usize,
    max_index: u64,
}

impl RunNamer {
    /// Narrowest padding ever used.
    pub const MIN_WIDTH: usize = 3;

    /// Namer able to name indices `1..=max_index`.
    pub fn for_capacity(max_index: u64) -> Self {
        Self {
            width: decimal_digits(max_index).max(Self::MIN_WIDTH),
            max_index,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn max_index(&self) -> u64 {
        self.max_index
    }

    pub fn name_for(&self, workload: &Workload, index: SequenceIndex) -> Result<String, SweepError> {
        let raw = index.as_raw();
        if raw == 0 || raw > self.max_index {
            return Err(SweepError::Naming(
                ErrorInfo::new(
                    "naming.index_out_of_range",
                    "sequence index outside the namer's uniqueness range",
                )
                .with_context("index", raw.to_string())
                .with_context("max_index", self.max_index.to_string())
                .with_context("width", self.width.to_string()),
            ));
        }
        Ok(format!("{}_{:0width$}", workload, raw, width = self.width))
    }
}

fn decimal_digits(mut value: u64) -> usize {
    let mut digits = 0;
    while value > 0 {
        digits += 1;
        value /= 10;
    }
    digits
}
