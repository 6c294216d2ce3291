use std::fmt;

use simsweep_core::errors::SweepError;
use simsweep_core::{ConfigurationRecord, SequenceIndex, Workload};
use tracing::{debug, info, warn};

use crate::derive::DerivedFieldResolver;
use crate::expand::{expand, Expansion};
use crate::manifest::{build_manifest, timestamp_now, ManifestMeta, SweepManifest};
use crate::naming::RunNamer;
use crate::plan::SweepPlan;
use crate::registry::ConfigurationLog;
use crate::runspec::{shell_quote, RunSpec, RunSpecBuilder};
use crate::serde::to_canonical_json_bytes;
use crate::store::ArtifactStore;

/// A combination (or one workload of it) that could not be turned into a
/// run script. Generation carries on past it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationFailure {
    pub sequence: SequenceIndex,
    /// `None` when the configuration itself failed, before any workload.
    pub workload: Option<Workload>,
    pub error: SweepError,
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.workload {
            Some(workload) => write!(f, "configuration {} / {}: {}", self.sequence, workload, self.error),
            None => write!(f, "configuration {}: {}", self.sequence, self.error),
        }
    }
}

/// Counts and manifest returned by [`write_sweep`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub combinations: u64,
    pub scripts: usize,
    pub failures: Vec<GenerationFailure>,
    pub manifest: SweepManifest,
}

/// Validated, compiled sweep ready to produce run specs for one host.
#[derive(Debug, Clone)]
pub struct SweepGenerator<'p> {
    plan: &'p SweepPlan,
    host_name: String,
    resolver: DerivedFieldResolver,
    builder: RunSpecBuilder,
    combinations: u64,
    created_at: String,
}

impl<'p> SweepGenerator<'p> {
    pub fn new(plan: &'p SweepPlan, host_name: impl Into<String>) -> Result<Self, SweepError> {
        let host_name = host_name.into();
        plan.validate()?;
        let resolver = plan.resolver()?;
        let combinations = plan.axes.combination_count()?;
        let namer = RunNamer::for_capacity(combinations);
        let mut builder = RunSpecBuilder::new(&plan.template, namer, plan.results_dir())?;
        match plan.preamble_for(&host_name) {
            Some(preamble) => builder = builder.with_preamble(preamble.to_vec()),
            None if !plan.hosts.is_empty() => {
                warn!(host = %host_name, "no host profile for this host; scripts get no preamble")
            }
            None => {}
        }
        Ok(Self {
            plan,
            host_name,
            resolver,
            builder,
            combinations,
            created_at: timestamp_now(),
        })
    }

    /// Fixes the manifest timestamp, for reproducible output.
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    pub fn plan(&self) -> &'p SweepPlan {
        self.plan
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn combinations(&self) -> u64 {
        self.combinations
    }

    pub fn namer(&self) -> &RunNamer {
        self.builder.namer()
    }

    /// Lazily yields every run, configurations outermost and workloads
    /// innermost, in sequence order.
    pub fn runs(&self) -> Runs<'_> {
        Runs {
            generator: self,
            expansion: expand(&self.plan.axes),
            current: None,
            next_workload: 0,
        }
    }
}

/// Iterator returned by [`SweepGenerator::runs`].
#[derive(Debug, Clone)]
pub struct Runs<'g> {
    generator: &'g SweepGenerator<'g>,
    expansion: Expansion<'g>,
    current: Option<(SequenceIndex, ConfigurationRecord)>,
    next_workload: usize,
}

impl Iterator for Runs<'_> {
    type Item = Result<RunSpec, GenerationFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        let generator = self.generator;
        let workloads = &generator.plan.workloads;
        loop {
            if let Some((sequence, record)) = &self.current {
                if let Some(workload) = workloads.get(self.next_workload) {
                    self.next_workload += 1;
                    let sequence = *sequence;
                    let built = generator
                        .builder
                        .build(sequence, record.clone(), workload)
                        .map_err(|error| GenerationFailure {
                            sequence,
                            workload: Some(workload.clone()),
                            error,
                        });
                    return Some(built);
                }
            }
            self.current = None;
            let (sequence, record) = self.expansion.next()?;
            match generator.resolver.resolve(record) {
                Ok(resolved) => {
                    self.current = Some((sequence, resolved));
                    self.next_workload = 0;
                }
                Err(error) => {
                    return Some(Err(GenerationFailure {
                        sequence,
                        workload: None,
                        error,
                    }))
                }
            }
        }
    }
}

/// Shell script running every generated script in order.
fn driver_script(script_names: &[String]) -> String {
    let mut text = String::from("#!/bin/bash\n\ncd \"$(dirname \"$0\")\"\n");
    for name in script_names {
        text.push_str("./");
        text.push_str(&shell_quote(name));
        text.push('\n');
    }
    text
}

/// Writes every run script plus the configuration log, driver script and
/// manifest. Per-run failures are collected; storage errors abort.
pub fn write_sweep(
    generator: &SweepGenerator<'_>,
    store: &mut dyn ArtifactStore,
) -> Result<GenerationSummary, SweepError> {
    let plan = generator.plan();
    let output = &plan.output;
    info!(
        plan = %plan.name,
        host = %generator.host_name(),
        combinations = generator.combinations(),
        workloads = plan.workloads.len(),
        "generating sweep"
    );

    let mut log = ConfigurationLog::new(plan.log_columns());
    let mut script_names = Vec::new();
    let mut failures = Vec::new();

    for run in generator.runs() {
        let spec = match run {
            Ok(spec) => spec,
            Err(failure) => {
                warn!(%failure, "run skipped");
                failures.push(failure);
                continue;
            }
        };
        if let Err(error) = log.append(&spec) {
            let failure = GenerationFailure {
                sequence: spec.sequence,
                workload: Some(spec.workload.clone()),
                error,
            };
            warn!(%failure, "run skipped");
            failures.push(failure);
            continue;
        }
        let file_name = spec.script_file_name();
        let path = store.write_artifact(&file_name, spec.script_text.as_bytes(), true)?;
        debug!(run = %spec.name, path = %path.display(), "wrote run script");
        script_names.push(file_name);
    }

    store.write_artifact(&output.log_name, &log.to_tsv()?, false)?;
    store.write_artifact(&output.driver_name, driver_script(&script_names).as_bytes(), true)?;

    let mut artifacts = script_names.clone();
    artifacts.push(output.log_name.clone());
    artifacts.push(output.driver_name.clone());

    let manifest = build_manifest(ManifestMeta {
        plan_name: plan.name.clone(),
        plan_hash: plan.plan_hash()?,
        host_name: generator.host_name().to_string(),
        created_at: generator.created_at.clone(),
        combinations: generator.combinations(),
        runs: script_names.len() as u64,
        failures: failures.iter().map(ToString::to_string).collect(),
        artifacts,
    })?;
    store.write_artifact(&output.manifest_name, &to_canonical_json_bytes(&manifest)?, false)?;

    if failures.is_empty() {
        info!(scripts = script_names.len(), "sweep written");
    } else {
        warn!(
            scripts = script_names.len(),
            failures = failures.len(),
            "sweep written with failures"
        );
    }

    Ok(GenerationSummary {
        combinations: generator.combinations(),
        scripts: script_names.len(),
        failures,
        manifest,
    })
}
