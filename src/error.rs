//! # Criteria Error Types
//!
//! Structured error handling for specification building and compilation.
//! Every failure is detected synchronously and is fatal to the current build;
//! callers decide whether to abort or adjust the specification and rebuild.

use crate::config::ConfigurationError;
use thiserror::Error;

/// Errors raised while building, compiling or executing a query specification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriteriaError {
    #[error("Unknown entity type: {entity}")]
    UnknownEntity { entity: String },

    #[error("Unable to find property '{property}' on entity type '{entity}'")]
    UnknownProperty { entity: String, property: String },

    #[error("Property '{property}' on '{entity}' is not a relationship and cannot be navigated through")]
    NonNavigableSegment { entity: String, property: String },

    #[error("Unsupported path expression: {reason}")]
    UnsupportedExpression { reason: String },

    #[error("Invalid condition sequence: {reason}")]
    InvalidSequence { reason: String },

    #[error("{argument} value cannot be negative (got {value})")]
    NegativeArgument { argument: String, value: i64 },

    #[error("Unsupported projection shape for '{path}': {reason}")]
    UnsupportedProjectionShape { path: String, reason: String },

    #[error("Condition kind '{kind}' is not yet implemented for '{path}'")]
    UnimplementedPredicateKind { kind: String, path: String },

    #[error("Cannot convert operand {found} to {expected} for '{path}'")]
    OperandConversion {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Condition kind '{kind}' expects {expected}")]
    OperandShape { kind: String, expected: String },

    #[error("Execution engine error during {operation}: {message}")]
    Engine { operation: String, message: String },

    #[error("Failed to map result row into {target}: {message}")]
    ResultMapping { target: String, message: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl CriteriaError {
    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        Self::UnknownEntity {
            entity: entity.into(),
        }
    }

    pub fn unknown_property(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            entity: entity.into(),
            property: property.into(),
        }
    }

    pub fn invalid_sequence(reason: impl Into<String>) -> Self {
        Self::InvalidSequence {
            reason: reason.into(),
        }
    }

    pub fn negative_argument(argument: impl Into<String>, value: i64) -> Self {
        Self::NegativeArgument {
            argument: argument.into(),
            value,
        }
    }

    pub fn unsupported_projection(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedProjectionShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an execution-engine failure with the operation that produced it
    pub fn engine<E: std::fmt::Display>(operation: impl Into<String>, error: E) -> Self {
        Self::Engine {
            operation: operation.into(),
            message: error.to_string(),
        }
    }

    /// True for the failures raised while the caller is still inserting conditions
    pub fn is_insertion_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSequence { .. }
                | Self::NegativeArgument { .. }
                | Self::UnknownProperty { .. }
                | Self::NonNavigableSegment { .. }
                | Self::UnsupportedExpression { .. }
                | Self::UnsupportedProjectionShape { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CriteriaError>;
