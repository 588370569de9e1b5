//! Checking catalog files against the entry schema.
//!
//! Each element of the catalog array is validated on its own; a failing
//! element is reported and the rest are still checked.
use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

/// Schema used when no schema file is configured.
pub const BUNDLED_SCHEMA: &str = include_str!("../schema/echoboot_schema.json");

/// Verdict for one catalog element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Carries the entry's label.
    Ok(String),
    /// Carries the first validation error.
    Fail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// 1-based position in the catalog.
    pub index: usize,
    pub outcome: Outcome,
}

impl EntryReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok(_))
    }
}

impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Ok(label) => write!(f, "[OK] Entry {}: {label}", self.index),
            Outcome::Fail(message) => write!(f, "[FAIL] Entry {}: {message}", self.index),
        }
    }
}

/// Validates every element of the JSON array at `target`.
///
/// `schema` names a schema file; `None` selects [`BUNDLED_SCHEMA`].
///
/// # Errors
///
/// - [`Error::NotFound`] if `target` or `schema` does not exist.
/// - [`Error::Parse`] if either file is not JSON, or `target` is not an array.
/// - [`Error::Schema`] if the schema document is not a valid schema.
pub fn validate_file(target: &Path, schema: Option<&Path>) -> Result<Vec<EntryReport>> {
    let schema = match schema {
        Some(path) => read_json(path)?,
        None => serde_json::from_str(BUNDLED_SCHEMA).map_err(|e| Error::Schema(e.to_string()))?,
    };
    let document = read_json(target)?;
    let Value::Array(entries) = document else {
        return Err(Error::Parse {
            path: target.to_path_buf(),
            reason: "expected a JSON array of entries".to_string(),
        });
    };
    validate_entries(&schema, &entries)
}

/// Validates already-parsed entries against an already-parsed schema.
pub fn validate_entries(schema: &Value, entries: &[Value]) -> Result<Vec<EntryReport>> {
    let validator = jsonschema::validator_for(schema).map_err(|e| Error::Schema(e.to_string()))?;

    let reports = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let outcome = match validator.iter_errors(entry).next() {
                Some(error) => Outcome::Fail(error.to_string()),
                None => Outcome::Ok(
                    entry
                        .get("label")
                        .and_then(Value::as_str)
                        .unwrap_or("<unlabeled>")
                        .to_string(),
                ),
            };
            EntryReport {
                index: i + 1,
                outcome,
            }
        })
        .collect();
    Ok(reports)
}

fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
