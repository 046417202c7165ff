//! Data loading error types.
//!
//! These errors classify failures when reading catalog and requirement data
//! so callers can tell absent data from broken data without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading program data.
#[derive(Debug, Error)]
pub enum DataError {
    /// No data file exists for the requested program.
    #[error("no data found for program '{program}' under {dir}")]
    ProgramNotFound { program: String, dir: PathBuf },

    /// A data file contained a record that could not be interpreted.
    #[error("malformed record in {path} (line {line}): {message}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A catalog file was found but held no usable records.
    #[error("catalog for '{0}' is empty")]
    EmptyCatalog(String),
}

impl DataError {
    /// Returns `true` if the data is absent rather than broken.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            DataError::ProgramNotFound { .. } | DataError::EmptyCatalog(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_missing_data() {
        let err = DataError::ProgramNotFound {
            program: "CS".into(),
            dir: PathBuf::from("data/courses"),
        };
        assert!(err.is_missing());
        assert!(err.to_string().contains("'CS'"));

        let err = DataError::MalformedRecord {
            path: PathBuf::from("minors.jsonl"),
            line: 3,
            message: "expected value".into(),
        };
        assert!(!err.is_missing());
        assert_eq!(
            err.to_string(),
            "malformed record in minors.jsonl (line 3): expected value"
        );
    }
}
