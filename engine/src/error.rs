//! Error types for the grouping engine.

use std::fmt;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by grouping strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// A streamed row contains a byte absent from the label table.
    UnknownTag {
        /// The unknown tag byte.
        tag: u8,
        /// Cell coordinates of the occurrence.
        x: u32,
        y: u32,
        z: u32,
    },

    /// A strategy produced a cuboid violating a cover invariant.
    InvariantViolation {
        /// Name of the offending strategy.
        strategy: &'static str,
        /// Human-readable description of the violation.
        detail: String,
    },

    /// A strategy name did not match any known strategy.
    UnknownStrategy {
        /// The unrecognized name.
        name: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag { tag, x, y, z } => {
                write!(
                    f,
                    "unknown tag {:?} at x={x}, y={y}, z={z}",
                    char::from(*tag)
                )
            }
            Self::InvariantViolation { strategy, detail } => {
                write!(f, "strategy {strategy} violated a cover invariant: {detail}")
            }
            Self::UnknownStrategy { name } => {
                write!(f, "unknown strategy {name:?}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_tag() {
        let err = EngineError::UnknownTag {
            tag: b'#',
            x: 1,
            y: 2,
            z: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("'#'"));
        assert!(msg.contains("z=3"));
    }

    #[test]
    fn display_invariant_violation() {
        let err = EngineError::InvariantViolation {
            strategy: "maxrect",
            detail: "overlap at (1, 2, 3)".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("maxrect"));
        assert!(msg.contains("overlap"));
    }

    #[test]
    fn display_unknown_strategy() {
        let err = EngineError::UnknownStrategy {
            name: "octree".to_owned(),
        };
        assert!(err.to_string().contains("octree"));
    }

    #[test]
    fn is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<EngineError>();
    }
}
