//! # Error Types — Records and Faults
//!
//! Two kinds of failure exist and they never mix:
//!
//! - Data that does not match a schema is *expected*. It is described by
//!   [`ErrorRecords`] and travels inside `AssertResult::Failure`. It only
//!   becomes an error value ([`ValidationError`]) when the caller escalates.
//! - A schema that cannot be compiled is a programmer fault. It surfaces as
//!   [`SchemaCompileError`] from the factory or the first lazy call and is
//!   never folded into a result.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed message carried by every [`ValidationError`].
pub const VALIDATION_ERROR_MESSAGE: &str = "Validation Error";

/// One validation mismatch reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// JSON Pointer to the offending location in the data.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that rejected the data.
    pub schema_path: String,
    /// The rejecting keyword, e.g. `type` or `required`.
    pub keyword: String,
    /// Human-readable description.
    pub message: String,
}

impl ErrorRecord {
    /// Build a record, deriving `keyword` from the last non-index segment
    /// of `schema_path`.
    pub fn new(
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let schema_path = schema_path.into();
        let keyword = keyword_of(&schema_path).to_string();
        Self {
            instance_path: instance_path.into(),
            schema_path,
            keyword,
            message: message.into(),
        }
    }

    /// Override the derived keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }
}

fn keyword_of(schema_path: &str) -> &str {
    schema_path
        .rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or("")
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {} [{}]", self.message, self.keyword)
        } else {
            write!(f, "  {}: {} [{}]", self.instance_path, self.message, self.keyword)
        }
    }
}

/// Non-empty list of [`ErrorRecord`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ErrorRecord>", into = "Vec<ErrorRecord>")]
pub struct ErrorRecords {
    records: Vec<ErrorRecord>,
}

impl ErrorRecords {
    /// Wrap a list of records. Returns `None` when `records` is empty.
    pub fn new(records: Vec<ErrorRecord>) -> Option<Self> {
        if records.is_empty() {
            None
        } else {
            Some(Self { records })
        }
    }

    /// A list holding exactly one record.
    pub fn single(record: ErrorRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    /// Number of records. Always at least one.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first record reported.
    pub fn first(&self) -> &ErrorRecord {
        &self.records[0]
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorRecord> {
        self.records.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ErrorRecord> {
        self.records
    }
}

impl TryFrom<Vec<ErrorRecord>> for ErrorRecords {
    type Error = &'static str;

    fn try_from(records: Vec<ErrorRecord>) -> Result<Self, Self::Error> {
        Self::new(records).ok_or("error record list must not be empty")
    }
}

impl From<ErrorRecords> for Vec<ErrorRecord> {
    fn from(records: ErrorRecords) -> Self {
        records.records
    }
}

impl<'a> IntoIterator for &'a ErrorRecords {
    type Item = &'a ErrorRecord;
    type IntoIter = std::slice::Iter<'a, ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for ErrorRecords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{record}")?;
        }
        Ok(())
    }
}

/// A failed validation escalated into an error value.
///
/// Carries the complete record list as structured context, not just a
/// message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Validation Error:\n{errors}")]
pub struct ValidationError {
    errors: ErrorRecords,
}

impl ValidationError {
    pub fn new(errors: ErrorRecords) -> Self {
        Self { errors }
    }

    /// Always [`VALIDATION_ERROR_MESSAGE`].
    pub fn message(&self) -> &'static str {
        VALIDATION_ERROR_MESSAGE
    }

    pub fn errors(&self) -> &ErrorRecords {
        &self.errors
    }

    pub fn into_errors(self) -> ErrorRecords {
        self.errors
    }
}

/// A schema (or engine option) the engine refused to compile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaCompileError {
    /// The schema document is not a valid schema.
    #[error("invalid schema: {reason}")]
    InvalidSchema {
        /// Engine diagnostic.
        reason: String,
    },

    /// A `patternProperties` key is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Regex compiler diagnostic.
        reason: String,
    },

    /// A passthrough option carries a value the engine cannot use.
    #[error("invalid option '{option}': {reason}")]
    InvalidOption {
        /// Option key as written in the configuration.
        option: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Top-level error type for callers that load documents from disk.
#[derive(Error, Debug)]
pub enum TypeAssertError {
    /// Schema compilation fault.
    #[error("schema compile error: {0}")]
    Compile(#[from] SchemaCompileError),

    /// Escalated validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A schema, data, or configuration document could not be parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path of the document.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// IO error reading a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
