//! Error handling for tree register processing.
//!
//! Provides error types with context for input reading, field validation,
//! carbon table lookups, configuration and console selection failures.

use crate::models::Field;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("No tree records could be read from: {path}")]
    EmptyDataset { path: PathBuf },

    #[error("Invalid value for field {field} (column {}): '{value}'", .field.index())]
    FieldInvalid { field: Field, value: String },

    #[error("Carbon lookup unavailable: {reason}")]
    LookupUnavailable { reason: LookupMiss },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Following input not allowed: '{input}'. Please enter a number from 0 up to 13.")]
    InvalidSelection { input: String },
}

/// Why a carbon lookup produced no value
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMiss {
    #[error("tree has no height or girth")]
    MissingMeasurement,

    #[error("tree has not been classified")]
    Unclassified,

    #[error("tree is below the smallest table height or diameter")]
    BelowTable,

    #[error("diameter is outside the table row for this height")]
    OutsideTable,

    #[error("table holds no carbon value for this cell")]
    NoData,
}

impl TreeError {
    /// Create a field validation error
    pub fn field_invalid(field: Field, value: impl Into<String>) -> Self {
        Self::FieldInvalid {
            field,
            value: value.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a lookup error
    pub fn lookup(reason: LookupMiss) -> Self {
        Self::LookupUnavailable { reason }
    }

    /// Create an invalid selection error
    pub fn invalid_selection(input: impl Into<String>) -> Self {
        Self::InvalidSelection {
            input: input.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
