//! Error types for model construction.

use std::fmt;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building model types.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// A grid or parent extent was zero or negative.
    NonPositiveExtent {
        /// Which extent (`"x"`, `"y"`, `"parent_x"`, ...).
        name: &'static str,
        /// The offending raw value.
        value: i64,
    },

    /// A grid extent is not a multiple of its parent extent.
    ExtentNotDivisible {
        /// Which axis (`"x"`, `"y"`, `"z"`).
        name: &'static str,
        /// The grid extent.
        extent: u32,
        /// The parent extent.
        parent: u32,
    },

    /// The label table already holds 256 distinct tags.
    TooManyLabels,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveExtent { name, value } => {
                write!(f, "extent {name} must be positive, got {value}")
            }
            Self::ExtentNotDivisible {
                name,
                extent,
                parent,
            } => {
                write!(
                    f,
                    "extent {name}={extent} is not divisible by parent extent {parent}"
                )
            }
            Self::TooManyLabels => {
                write!(f, "label table is full (256 distinct tags)")
            }
        }
    }
}

impl std::error::Error for ModelError {}
