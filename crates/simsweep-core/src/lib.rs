#![deny(missing_docs)]
#![doc = "Shared vocabulary for simulator configuration sweeps: scalar values, configuration records, sequence indices, workloads, and the structured error type."]

pub mod errors;
pub mod provenance;
mod types;

pub use errors::{ErrorInfo, SweepError};
pub use provenance::{SchemaVersion, SweepProvenance};
pub use types::{ConfigurationRecord, Scalar, SequenceIndex, Workload};
