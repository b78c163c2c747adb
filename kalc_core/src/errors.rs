//! # Error Types
//!
//! Structured error types for kalc_core. Evaluators use these internally and
//! the engine folds every one of them into an invalid [`CalculatorResults`],
//! so a caller evaluating a calculator never sees an `Err`. Catalog loading,
//! registry generation and export do surface them.
//!
//! ## Example
//!
//! ```rust
//! use kalc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_weight(weight_kg: f64) -> CalcResult<()> {
//!     if weight_kg <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "weight".to_string(),
//!             value: weight_kg.to_string(),
//!             reason: "Weight must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`CalculatorResults`]: crate::results::CalculatorResults

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for kalc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculator operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, wrong type, unknown option)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required input has not been entered
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Evaluating would divide by zero
    #[error("Division by zero: {field} is zero")]
    DivisionByZero { field: String },

    /// No calculator with this id exists in the catalog
    #[error("Unknown calculator: {id}")]
    UnknownCalculator { id: String },

    /// Locale code is not supported
    #[error("Unknown locale: {code}")]
    UnknownLocale { code: String },

    /// A calculator config breaks a schema invariant
    #[error("Invalid config for '{calculator}': {reason}")]
    InvalidConfig { calculator: String, reason: String },

    /// Registry and calculator sources disagree
    #[error("Registry mismatch for '{id}': {reason}")]
    RegistryMismatch { id: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a DivisionByZero error
    pub fn division_by_zero(field: impl Into<String>) -> Self {
        CalcError::DivisionByZero {
            field: field.into(),
        }
    }

    /// Create an UnknownCalculator error
    pub fn unknown_calculator(id: impl Into<String>) -> Self {
        CalcError::UnknownCalculator { id: id.into() }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(calculator: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidConfig {
            calculator: calculator.into(),
            reason: reason.into(),
        }
    }

    /// Create a RegistryMismatch error
    pub fn registry_mismatch(id: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::RegistryMismatch {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the user's input rather than the catalog
    /// or the filesystem.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. } | CalcError::MissingField { .. } | CalcError::DivisionByZero { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            CalcError::UnknownCalculator { .. } => "UNKNOWN_CALCULATOR",
            CalcError::UnknownLocale { .. } => "UNKNOWN_LOCALE",
            CalcError::InvalidConfig { .. } => "INVALID_CONFIG",
            CalcError::RegistryMismatch { .. } => "REGISTRY_MISMATCH",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
