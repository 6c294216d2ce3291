//! Structured error types shared across simsweep crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SweepError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable dotted error code, e.g. `runspec.missing_field`.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (field names, indices, paths).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for sweep generation and metric extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SweepError {
    /// Malformed or ambiguous axis set, plan, or derived-field input.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// Template and configuration record disagree.
    #[error("run spec error: {0}")]
    RunSpec(ErrorInfo),
    /// A sequence index falls outside the namer's uniqueness range.
    #[error("naming error: {0}")]
    Naming(ErrorInfo),
    /// A result file could not be read.
    #[error("extraction error: {0}")]
    Extraction(ErrorInfo),
    /// Filesystem failures while persisting artifacts.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl SweepError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SweepError::Configuration(info)
            | SweepError::RunSpec(info)
            | SweepError::Naming(info)
            | SweepError::Extraction(info)
            | SweepError::Io(info)
            | SweepError::Serde(info) => info,
        }
    }

    /// Short lowercase family label, matching the serialized tag.
    pub fn family(&self) -> &'static str {
        match self {
            SweepError::Configuration(_) => "configuration",
            SweepError::RunSpec(_) => "run_spec",
            SweepError::Naming(_) => "naming",
            SweepError::Extraction(_) => "extraction",
            SweepError::Io(_) => "io",
            SweepError::Serde(_) => "serde",
        }
    }

    /// Wraps an [`std::io::Error`] with the path it concerns.
    pub fn io(code: &str, path: impl Display, err: std::io::Error) -> Self {
        SweepError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.to_string()),
        )
    }
}
