//! Error types for engine construction, rule loading and evaluation.

use thiserror::Error;

use crate::metadata::SourceLocation;

#[derive(Error, Debug)]
pub enum FuzzyError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
    #[error("[syntax error] {message} (loaded at {location})")]
    Syntax {
        message: String,
        location: SourceLocation,
    },
    #[error("variable '{name}' is not registered in the engine (loaded at {location})")]
    UnknownVariable {
        name: String,
        location: SourceLocation,
    },
    #[error("term '{term}' is not registered in variable '{variable}' (loaded at {location})")]
    UnknownTerm {
        variable: String,
        term: String,
        location: SourceLocation,
    },
    #[error("{kind} '{name}' already exists")]
    Duplicate { kind: &'static str, name: String },
    #[error("{operator} operator is required to evaluate '{keyword}' but none is configured")]
    MissingOperator {
        operator: &'static str,
        keyword: &'static str,
    },
    #[error("rule '{rule}' is not loaded")]
    RuleNotLoaded { rule: String },
    #[error("rule block '{block}' failed to load rules:\n{failures}")]
    RuleLoading { block: String, failures: String },
    #[error("invalid parameters for {class}: {reason}")]
    InvalidParameters { class: String, reason: String },
    #[error("formula '{formula}': {reason}")]
    Formula { formula: String, reason: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FuzzyError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        FuzzyError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, location: &SourceLocation) -> Self {
        FuzzyError::Syntax {
            message: message.into(),
            location: location.clone(),
        }
    }

    pub(crate) fn invalid_parameters(class: impl Into<String>, reason: impl Into<String>) -> Self {
        FuzzyError::InvalidParameters {
            class: class.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised by `Engine::process` rather than while
    /// building or loading the engine.
    pub fn is_evaluation_error(&self) -> bool {
        matches!(
            self,
            FuzzyError::MissingOperator { .. } | FuzzyError::RuleNotLoaded { .. }
        )
    }
}

/// Result type for engine operations.
pub type FuzzyResult<T> = Result<T, FuzzyError>;
