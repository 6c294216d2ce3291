use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use simsweep_core::errors::{ErrorInfo, SweepError};
use tracing::{debug, warn};

/// Marker the SMTSIM summary prints in front of the aggregate IPC.
pub const DEFAULT_MARKER: &str = "total IPC";

/// One row of the metric summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub run_name: String,
    pub metric_value: String,
}

/// Pulls a single scalar out of each simulator output file.
///
/// The first line containing `marker` is split on `delimiter`; the text
/// between the first and second delimiter, trimmed, is the value. Files
/// without such a line yield nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricExtractor {
    marker: String,
    delimiter: char,
    results_root: Option<String>,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl MetricExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            delimiter: '=',
            results_root: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Run names become the part of the path after `root` (for example
    /// `Results/`) instead of the bare file name.
    pub fn with_results_root(mut self, root: impl Into<String>) -> Self {
        self.results_root = Some(root.into());
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn matches(&self, line: &str) -> bool {
        line.contains(&self.marker)
    }

    pub fn run_name_for(&self, path: &Path) -> String {
        let full = path.to_string_lossy();
        if let Some(root) = &self.results_root {
            if let Some((_, tail)) = full.split_once(root.as_str()) {
                return tail.to_string();
            }
        }
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| full.into_owned())
    }

    /// Scans already-read lines; used for files and in-memory logs alike.
    pub fn extract_lines<I, S>(&self, run_name: &str, lines: I) -> Option<MetricRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let line = lines.into_iter().find(|line| self.matches(line.as_ref()))?;
        let value = line.as_ref().split(self.delimiter).nth(1)?.trim();
        Some(MetricRecord {
            run_name: run_name.to_string(),
            metric_value: value.to_string(),
        })
    }

    /// Reads one output file, stopping at the first marker line.
    pub fn extract_file(&self, path: &Path) -> Result<Option<MetricRecord>, SweepError> {
        let file = File::open(path).map_err(|err| unreadable(path, err))?;
        let mut reader = BufReader::new(file);
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|err| unreadable(path, err))?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf).into_owned();
            if self.matches(&line) {
                lines.push(line);
                break;
            }
        }
        Ok(self.extract_lines(&self.run_name_for(path), lines))
    }

    /// Lazily extracts records from `files`, visited in sorted path order.
    /// Unreadable files are logged and skipped.
    pub fn extract<I>(&self, files: I) -> Extraction<'_>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut files: Vec<PathBuf> = files.into_iter().collect();
        files.sort();
        Extraction {
            extractor: self,
            files: files.into_iter(),
        }
    }
}

fn unreadable(path: &Path, err: std::io::Error) -> SweepError {
    SweepError::Extraction(
        ErrorInfo::new("extract.unreadable", "cannot read simulator output")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

/// Iterator returned by [`MetricExtractor::extract`].
#[derive(Debug)]
pub struct Extraction<'a> {
    extractor: &'a MetricExtractor,
    files: std::vec::IntoIter<PathBuf>,
}

impl Iterator for Extraction<'_> {
    type Item = MetricRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for path in self.files.by_ref() {
            match self.extractor.extract_file(&path) {
                Ok(Some(record)) => return Some(record),
                Ok(None) => debug!(path = %path.display(), "no metric line"),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping output file"),
            }
        }
        None
    }
}

/// Regular files in `dir` matching the glob `pattern`, sorted by path.
pub fn collect_output_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, SweepError> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let joined = Path::new(&escaped_dir).join(pattern);
    let pattern_text = joined.to_string_lossy();
    let entries = glob::glob(&pattern_text).map_err(|err| {
        SweepError::Configuration(
            ErrorInfo::new("extract.bad_pattern", "invalid glob pattern")
                .with_context("pattern", pattern_text.to_string())
                .with_hint(err.to_string()),
        )
    })?;
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "skipping unreadable directory entry"),
        }
    }
    files.sort();
    Ok(files)
}
