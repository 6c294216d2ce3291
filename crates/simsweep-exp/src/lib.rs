//! Configuration-space expansion, run-script generation and metric
//! extraction for batch simulator sweeps.

mod axes;
mod derive;
mod expand;
mod extract;
mod generate;
mod hash;
mod manifest;
mod naming;
mod plan;
mod registry;
mod runspec;
mod serde;
mod store;
mod template;

pub use axes::{Axis, AxisSet};
pub use derive::{ceil_pow2, DerivedField, DerivedFieldResolver, DerivedRule};
pub use expand::{expand, Expansion};
pub use extract::{collect_output_files, Extraction, MetricExtractor, MetricRecord, DEFAULT_MARKER};
pub use generate::{write_sweep, GenerationFailure, GenerationSummary, Runs, SweepGenerator};
pub use hash::stable_hash_string;
pub use manifest::{build_manifest, timestamp_now, ManifestMeta, SweepManifest};
pub use naming::RunNamer;
pub use plan::{load_plan, HostProfile, OutputSpec, SweepPlan};
pub use registry::{
    metric_table_tsv, read_table, ConfigurationLog, Table, METRIC_VALUE_COLUMN, RUN_NAME_COLUMN,
};
pub use runspec::{shell_quote, RunSpec, RunSpecBuilder, EXIT_CHECK};
pub use store::{ArtifactStore, DirectoryStore, MemoryStore, StoredArtifact};
pub use template::{
    CompiledTemplate, ConfOverride, InvocationTemplate, OverridePreset, SlotContext, SlotText,
    RESERVED_SLOTS,
};

pub use crate::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes};
