//! Error types for core value structures.

use thiserror::Error;

/// Errors raised by the core value structures.
///
/// There is no read-only violation variant: [`crate::enumdef::EnumDef`]
/// and the constant tables expose no mutating methods, so mutation
/// attempts are rejected by the compiler instead of at run time.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A constructor or operation precondition was violated by the caller.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violated precondition.
        message: String,
    },

    /// An index points past the end of a container.
    #[error("index {index} out of range for length {len}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The container length.
        len: usize,
    },

    /// A lookup key has no entry.
    #[error("no entry for key: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an out of range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    /// Create a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::out_of_range(12, 8);
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("8"));

        let err = CoreError::not_found("JUMP_HEIGHT");
        assert!(err.to_string().contains("JUMP_HEIGHT"));
    }
}
