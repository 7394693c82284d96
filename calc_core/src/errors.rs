//! # Error Types
//!
//! Structured error types for calcolo_core.
//!
//! Only programming errors and environment failures are represented here.
//! Malformed numbers fall back to defaults during parsing, physically invalid
//! inputs make an evaluator return `None`, and design concerns travel as
//! warning strings on an otherwise valid result. None of those paths produce
//! a `CalcError`.
//!
//! ## Example
//!
//! ```rust
//! use calcolo_core::errors::{CalcError, CalcResult};
//! use calcolo_core::units::tables::PRESSURE;
//!
//! fn pascal_per(unit: &str) -> CalcResult<f64> {
//!     Ok(PRESSURE.get(unit)?.factor_to_canonical)
//! }
//!
//! assert_eq!(pascal_per("bar").unwrap(), 100_000.0);
//! assert!(matches!(pascal_per("furlong"), Err(CalcError::UnknownUnit { .. })));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calcolo_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A unit id is not part of the table it was looked up in
    #[error("Unknown unit '{unit}' in table '{table}'")]
    UnknownUnit { table: String, unit: String },

    /// An enumerated option (soil class, installation method, ...) is not recognised
    #[error("Unknown option '{value}' for '{field}' (allowed: {allowed})")]
    UnknownOption {
        field: String,
        value: String,
        allowed: String,
    },

    /// A unit table violates its construction invariants
    #[error("Invalid unit table '{table}': {reason}")]
    InvalidUnitTable { table: String, reason: String },

    /// Domain name not known to the dispatcher
    #[error("Unknown calculation domain: {name}")]
    UnknownDomain { name: String },

    /// Settings file could not be read or parsed
    #[error("Configuration error in '{path}': {reason}")]
    ConfigError { path: String, reason: String },

    /// JSON serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an UnknownUnit error
    pub fn unknown_unit(table: impl Into<String>, unit: impl Into<String>) -> Self {
        CalcError::UnknownUnit {
            table: table.into(),
            unit: unit.into(),
        }
    }

    /// Create an UnknownOption error from the list of accepted keys
    pub fn unknown_option(field: impl Into<String>, value: impl Into<String>, allowed: &[&str]) -> Self {
        CalcError::UnknownOption {
            field: field.into(),
            value: value.into(),
            allowed: allowed.join(", "),
        }
    }

    /// Create an InvalidUnitTable error
    pub fn invalid_unit_table(table: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidUnitTable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownDomain error
    pub fn unknown_domain(name: impl Into<String>) -> Self {
        CalcError::UnknownDomain { name: name.into() }
    }

    /// Create a ConfigError
    pub fn config_error(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for defects in the caller or in static data, as opposed to
    /// failures of the environment (files, encoding).
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            CalcError::UnknownUnit { .. }
                | CalcError::UnknownOption { .. }
                | CalcError::InvalidUnitTable { .. }
                | CalcError::UnknownDomain { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            CalcError::UnknownOption { .. } => "UNKNOWN_OPTION",
            CalcError::InvalidUnitTable { .. } => "INVALID_UNIT_TABLE",
            CalcError::UnknownDomain { .. } => "UNKNOWN_DOMAIN",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::unknown_unit("pressure", "furlong");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"UnknownUnit\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::unknown_domain("x").error_code(), "UNKNOWN_DOMAIN");
        assert_eq!(
            CalcError::invalid_unit_table("power", "no canonical unit").error_code(),
            "INVALID_UNIT_TABLE"
        );
    }

    #[test]
    fn test_unknown_option_lists_allowed_keys() {
        let error = CalcError::unknown_option("soil", "z", &["a", "b", "c"]);
        assert_eq!(
            error.to_string(),
            "Unknown option 'z' for 'soil' (allowed: a, b, c)"
        );
    }

    #[test]
    fn test_programming_error_classification() {
        assert!(CalcError::unknown_unit("power", "x").is_programming_error());
        assert!(!CalcError::config_error("calcolo.toml", "missing").is_programming_error());
    }
}
