//! Source location tracking for configuration errors.

use serde::{Deserialize, Serialize};

/// Location in Rust source of the call that triggered a configuration error.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        SourceLocation {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location of the caller, following `#[track_caller]` frames.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        SourceLocation {
            file: location.file().to_string(),
            line: location.line() as usize,
            column: location.column() as usize,
        }
    }

    pub fn unknown() -> Self {
        SourceLocation {
            file: "<unknown>".to_string(),
            line: 0,
            column: 0,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
