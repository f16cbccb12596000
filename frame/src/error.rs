//! Error types for input framing.

use std::fmt;

use model::ModelError;

/// Result type for framing operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors raised while reading the model stream.
#[derive(Debug)]
#[non_exhaustive]
pub enum FrameError {
    /// Underlying I/O failure.
    Io(std::io::Error),

    /// The header line is not six comma-separated integers.
    HeaderFormat {
        /// The offending line, trimmed.
        line: String,
    },

    /// The header parsed but the dimensions are invalid.
    HeaderInvalid(ModelError),

    /// The label table terminated empty.
    NoLabels,

    /// A label line is missing its comma or has an empty tag.
    LabelFormat {
        /// The offending line, trimmed.
        line: String,
    },

    /// A row contains a byte absent from the label table.
    UnknownTag {
        /// The unknown tag byte.
        tag: u8,
        /// Cell coordinates of the first occurrence.
        x: u32,
        y: u32,
        z: u32,
    },

    /// A row has fewer visible bytes than the grid width.
    RowLength {
        /// Expected width.
        expected: u32,
        /// Bytes actually present (CR excluded).
        got: usize,
        /// Row coordinates.
        y: u32,
        z: u32,
    },

    /// EOF arrived inside an expected slice of a finite-depth model.
    TruncatedStream {
        /// Coordinates of the first missing row.
        y: u32,
        z: u32,
    },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::HeaderFormat { line } => {
                write!(f, "malformed header (expected 6 integers): {line:?}")
            }
            Self::HeaderInvalid(e) => write!(f, "invalid header: {e}"),
            Self::NoLabels => write!(f, "label table is empty"),
            Self::LabelFormat { line } => write!(f, "malformed label line: {line:?}"),
            Self::UnknownTag { tag, x, y, z } => {
                write!(
                    f,
                    "unknown tag {:?} at x={x}, y={y}, z={z}",
                    char::from(*tag)
                )
            }
            Self::RowLength {
                expected,
                got,
                y,
                z,
            } => {
                write!(f, "row too short at y={y}, z={z}: got {got}, expected {expected}")
            }
            Self::TruncatedStream { y, z } => {
                write!(f, "unexpected end of stream at y={y}, z={z}")
            }
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::HeaderInvalid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ModelError> for FrameError {
    fn from(err: ModelError) -> Self {
        Self::HeaderInvalid(err)
    }
}
