//! Error types and context management for generation operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all generation operations
#[derive(Debug)]
pub enum WfcError {
    /// Sample is empty, ragged, or smaller than the pattern size
    InvalidSample {
        /// Description of what's wrong with the sample
        reason: String,
    },

    /// A cell's domain became empty during propagation
    ///
    /// Terminal: the run stops and nothing is retried internally.
    Contradiction {
        /// Column of the emptied cell
        x: usize,
        /// Row of the emptied cell
        y: usize,
    },

    /// Run loop budget exhausted before every cell collapsed
    MaxIterationsExceeded {
        /// Iteration budget that was reached
        limit: usize,
    },

    /// Tick invoked on a state that is already fully collapsed
    NoUncollapsedCells,

    /// Run stopped at a tick boundary by a cancellation flag or deadline
    Cancelled {
        /// Number of ticks completed before stopping
        iteration: usize,
    },

    /// A caller-supplied value is out of range or malformed
    InvalidParameter {
        /// Parameter or flag name
        parameter: &'static str,
        /// Offending value, rendered as text
        value: String,
        /// What the value should have been
        reason: String,
    },

    /// A PNG sample could not be opened or decoded
    ImageLoad {
        /// Sample image path
        path: PathBuf,
        /// Decoder error
        source: image::ImageError,
    },

    /// A PNG or GIF could not be encoded or written
    ImageExport {
        /// Destination path
        path: PathBuf,
        /// Encoder error
        source: image::ImageError,
    },

    /// Reading, writing or creating a path failed
    FileSystem {
        /// Path being accessed
        path: PathBuf,
        /// Short name of the failing operation
        operation: &'static str,
        /// I/O error from the OS
        source: std::io::Error,
    },

    /// State or sample JSON could not be encoded or decoded
    Serialization {
        /// Path involved, if any
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

impl fmt::Display for WfcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSample { reason } => write!(f, "Invalid sample: {reason}"),
            Self::Contradiction { x, y } => {
                write!(f, "Contradiction: cell ({x}, {y}) has no remaining patterns")
            }
            Self::MaxIterationsExceeded { limit } => {
                write!(f, "Iteration budget of {limit} exhausted before completion")
            }
            Self::NoUncollapsedCells => {
                write!(f, "Tick called on a state with no uncollapsed cells")
            }
            Self::Cancelled { iteration } => {
                write!(f, "Generation cancelled after {iteration} iterations")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid {parameter} value '{value}': {reason}")
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Cannot read sample image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Cannot write image '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "Cannot {operation} '{}': {source}",
                    path.display()
                )
            }
            Self::Serialization { path, source } => {
                write!(f, "Serialization error for '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for WfcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl WfcError {
    /// True for failures produced by the generation itself rather than by bad input or I/O
    pub const fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::Contradiction { .. } | Self::MaxIterationsExceeded { .. } | Self::Cancelled { .. }
        )
    }
}

/// Convenience type alias for generation results
pub type Result<T> = std::result::Result<T, WfcError>;

/// Attaches the path an operation was working on to its error
pub trait WithContext<T> {
    /// Replace the placeholder path of a file, image or JSON error
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<WfcError>,
{
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            if let WfcError::FileSystem { path: target, .. }
            | WfcError::ImageLoad { path: target, .. }
            | WfcError::ImageExport { path: target, .. }
            | WfcError::Serialization { path: target, .. } = &mut error
            {
                *target = path.into();
            }
            error
        })
    }
}

impl From<std::io::Error> for WfcError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "access",
            source: err,
        }
    }
}

impl From<serde_json::Error> for WfcError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            path: PathBuf::from("<memory>"),
            source: err,
        }
    }
}

/// Shorthand for [`WfcError::InvalidParameter`]
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> WfcError {
    WfcError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid sample error
pub fn invalid_sample(reason: &impl ToString) -> WfcError {
    WfcError::InvalidSample {
        reason: reason.to_string(),
    }
}
