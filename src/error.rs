use thiserror::Error;

/// Convenience result type for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Error type returned by frame operations.
///
/// A single enum shared by every pipeline stage. All variants are recoverable; no operation
/// aborts the process.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A caller-supplied argument is out of range (bad slice bounds, zero page size, ...).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A value could not be coerced into the type an operation requires.
    #[error("type conversion failed: {message}")]
    TypeConversion { message: String },

    /// The operation needs at least one row to produce a defined result.
    #[error("{operation} requires a non-empty frame")]
    EmptySource { operation: &'static str },

    /// An average was requested over zero values and no empty-average default is configured.
    #[error("{operation} divided by zero (no values to average)")]
    DivideByZero { operation: &'static str },

    /// Decimal accumulation exceeded the representable range.
    #[error("{operation} overflowed the decimal range")]
    NumericOverflow { operation: &'static str },

    /// JSON text handed to an explode operation could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A split delimiter is not a valid pattern.
    #[error("invalid delimiter pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Writing a rendered table to its sink failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker pool for parallel execution could not be built.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl FrameError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }
}
