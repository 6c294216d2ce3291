use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use simsweep_core::errors::{ErrorInfo, SweepError};

use crate::extract::MetricRecord;
use crate::runspec::RunSpec;

/// Column appended to every configuration log row.
pub const RUN_NAME_COLUMN: &str = "run_name";
/// Second column of the metric summary table.
pub const METRIC_VALUE_COLUMN: &str = "metric_value";

/// In-memory tab separated table, as read back from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Configuration-to-run-name mapping, one row per generated run in
/// generation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationLog {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ConfigurationLog {
    /// `columns` are configuration field names; `run_name` is added last.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = self.columns.clone();
        header.push(RUN_NAME_COLUMN.to_string());
        header
    }

    pub fn append(&mut self, spec: &RunSpec) -> Result<(), SweepError> {
        let mut row = Vec::with_capacity(self.columns.len() + 1);
        for column in &self.columns {
            let value = spec.configuration.get(column).ok_or_else(|| {
                SweepError::RunSpec(
                    ErrorInfo::new("registry.missing_column", "run lacks a logged field")
                        .with_context("column", column.clone())
                        .with_context("run", spec.name.clone()),
                )
            })?;
            row.push(value.to_string());
        }
        row.push(spec.name.clone());
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn to_tsv(&self) -> Result<Vec<u8>, SweepError> {
        tsv_bytes(&self.header(), &self.rows)
    }
}

/// Renders the two-column metric summary table.
pub fn metric_table_tsv(records: &[MetricRecord]) -> Result<Vec<u8>, SweepError> {
    let header = [RUN_NAME_COLUMN.to_string(), METRIC_VALUE_COLUMN.to_string()];
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| vec![record.run_name.clone(), record.metric_value.clone()])
        .collect();
    tsv_bytes(&header, &rows)
}

fn tsv_bytes(header: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>, SweepError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(header)
        .map_err(|err| wrap_csv("registry.write_header", err))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|err| wrap_csv("registry.write_row", err))?;
    }
    writer.into_inner().map_err(|err| {
        SweepError::Io(
            ErrorInfo::new("registry.flush", "failed to flush table buffer")
                .with_hint(err.to_string()),
        )
    })
}

/// Reads a tab separated table with a header row.
pub fn read_table(path: &Path) -> Result<Table, SweepError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)
        .map_err(|err| wrap_csv("registry.read", err))?;
    let columns = reader
        .headers()
        .map_err(|err| wrap_csv("registry.header", err))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| wrap_csv("registry.record", err))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table { columns, rows })
}

fn wrap_csv(code: &str, err: csv::Error) -> SweepError {
    SweepError::Serde(ErrorInfo::new(code, "tab separated table failure").with_hint(err.to_string()))
}
